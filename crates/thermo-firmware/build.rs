//! Export WiFi credentials from `.env` (or the environment) to the crate.

fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-changed=../../.env");

    // Either location works; the nearest one wins
    let _ = dotenvy::from_filename(".env").or_else(|_| dotenvy::from_filename("../../.env"));

    for key in ["WIFI_SSID", "WIFI_PASSWORD"] {
        println!("cargo:rerun-if-env-changed={key}");
        let value = std::env::var(key).unwrap_or_else(|_| {
            println!("cargo:warning={key} is not set; clock sync will not be able to connect");
            String::new()
        });
        println!("cargo:rustc-env={key}={value}");
    }
}
