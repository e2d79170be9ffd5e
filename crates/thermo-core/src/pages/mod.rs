pub mod battery;
pub mod calibration;
pub mod clock;
pub mod constants;
pub mod page;
pub mod page_manager;
pub mod splash;
pub mod thermometer;
pub mod time_sync;

pub use page::{Page, PageId, PageWrapper, RefreshContext};
pub use page_manager::{PageManager, RefreshPolicy, RefreshTimer, UpdateIndicator};
