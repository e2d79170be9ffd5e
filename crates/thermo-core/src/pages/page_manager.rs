// src/pages/page_manager.rs
//! Page navigation, per-page refresh timers and the update indicator.

use core::fmt::Debug;

use embassy_time::{Duration, Instant};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::Vec;
use log::{debug, info};

use super::page::{PAGE_COUNT, Page, PageId, PageWrapper, RefreshContext};
use crate::app_state::AppError;
use crate::board::{Board, Hardware};
use crate::config::INDICATOR_ON_TIME;
use crate::ui::widgets::draw_update_indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Redraw whenever `interval` has elapsed since the last redraw
    Every(Duration),
    /// Draw once each time the page is entered
    OncePerEntry,
}

impl RefreshPolicy {
    /// Only timed refreshes flash the update indicator.
    pub const fn shows_indicator(self) -> bool {
        matches!(self, RefreshPolicy::Every(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefreshTimer {
    policy: RefreshPolicy,
    next_due: Option<Instant>,
}

impl RefreshTimer {
    pub const fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            next_due: None,
        }
    }

    /// Make the timer due at `now`.
    pub fn trigger(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    /// Returns `true` exactly once per due period and schedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = match self.policy {
                    RefreshPolicy::Every(interval) => Some(now + interval),
                    RefreshPolicy::OncePerEntry => None,
                };
                true
            }
            _ => false,
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }
}

/// Grey dot in the top right corner, lit for a short while after each
/// timed refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateIndicator {
    off_at: Option<Instant>,
}

impl UpdateIndicator {
    pub fn show(&mut self, now: Instant) {
        self.off_at = Some(now + INDICATOR_ON_TIME);
    }

    /// Returns `true` once when the on-time has run out.
    pub fn poll_expired(&mut self, now: Instant) -> bool {
        match self.off_at {
            Some(off_at) if now > off_at => {
                self.off_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.off_at.is_some()
    }
}

pub struct PageManager {
    pages: Vec<PageWrapper, PAGE_COUNT>,
    timers: [RefreshTimer; PAGE_COUNT],
    current_page: PageId,
    indicator: UpdateIndicator,
}

impl PageManager {
    pub fn new(initial_page: PageId) -> Self {
        let mut pages = Vec::new();
        for id in PageId::ALL {
            // Capacity equals the number of pages
            let _ = pages.push(PageWrapper::for_id(id));
        }

        Self {
            pages,
            timers: PageId::ALL.map(|id| RefreshTimer::new(id.refresh_policy())),
            current_page: initial_page,
            indicator: UpdateIndicator::default(),
        }
    }

    pub fn current_page_id(&self) -> PageId {
        self.current_page
    }

    pub fn timer(&self, id: PageId) -> &RefreshTimer {
        &self.timers[id.index()]
    }

    pub fn indicator(&self) -> &UpdateIndicator {
        &self.indicator
    }

    fn get_current_page_mut(&mut self) -> Option<&mut PageWrapper> {
        self.pages.iter_mut().find(|p| p.id() == self.current_page)
    }

    /// Make `page_id` the active page with its refresh due immediately.
    pub fn enter(&mut self, page_id: PageId, now: Instant) {
        if page_id != self.current_page {
            info!("Page {} -> {}", self.current_page.title(), page_id.title());
        }
        self.current_page = page_id;
        self.timers[page_id.index()].trigger(now);
    }

    /// Move to the next page in the cycle.
    pub fn advance(&mut self, now: Instant) -> PageId {
        let next = self.current_page.next();
        self.enter(next, now);
        next
    }

    /// Draw the active page's static content onto a cleared display.
    pub fn activate<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match self.get_current_page_mut() {
            Some(page) => page.on_activate(display),
            None => Ok(()),
        }
    }

    /// Turn the indicator off if its on-time has elapsed.
    pub fn expire_indicator<D>(&mut self, display: &mut D, now: Instant) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if self.indicator.poll_expired(now) {
            draw_update_indicator(display, false)?;
        }
        Ok(())
    }

    /// Refresh the active page if its timer is due.
    ///
    /// Returns whether a refresh ran.
    pub async fn refresh_due<D, H>(
        &mut self,
        display: &mut D,
        board: &mut Board<H>,
        ctx: &RefreshContext,
    ) -> Result<bool, AppError>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
        H: Hardware,
    {
        let timer = &mut self.timers[self.current_page.index()];
        if !timer.poll(ctx.now) {
            return Ok(false);
        }
        let shows_indicator = timer.policy().shows_indicator();

        // Lit before the page draws
        if shows_indicator {
            self.indicator.show(ctx.now);
            draw_update_indicator(display, true).map_err(AppError::display)?;
        }

        debug!("Refreshing {} page", self.current_page.title());
        if let Some(page) = self.get_current_page_mut() {
            page.refresh(display, board, ctx).await?;
        }
        Ok(true)
    }
}
