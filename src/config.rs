use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medtrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How far ahead concrete reminder instants are materialized for
/// unbounded ("Ongoing") schedules, in days. A tunable, not a contract:
/// repeating daily triggers cover the ongoing case, this bound only
/// caps full enumeration.
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
/// ~/Medtrack/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Get the directory holding the medication database
pub fn data_dir() -> PathBuf {
    app_data_dir().join("data")
}
