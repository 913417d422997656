use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "ArchiField";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// IRIS extraction server reachable from the survey site network.
pub const DEFAULT_SERVER_URL: &str = "http://192.168.1.100:5000";

/// Hard bound on a single nameplate upload. One attempt, no retry loop.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
/// ~/ArchiField/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Get the durable photo directory (nameplate captures land here)
pub fn photos_dir() -> PathBuf {
    app_data_dir().join("photos")
}

/// IRIS server base URL, overridable via ARCHIFIELD_SERVER_URL.
pub fn server_url() -> String {
    std::env::var("ARCHIFIELD_SERVER_URL")
        .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Upload timeout, overridable via ARCHIFIELD_UPLOAD_TIMEOUT_SECS.
pub fn upload_timeout() -> Duration {
    let secs = std::env::var("ARCHIFIELD_UPLOAD_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("ArchiField"));
    }

    #[test]
    fn photos_dir_under_app_data() {
        let photos = photos_dir();
        let app = app_data_dir();
        assert!(photos.starts_with(app));
        assert!(photos.ends_with("photos"));
    }

    #[test]
    fn app_name_is_archifield() {
        assert_eq!(APP_NAME, "ArchiField");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(DEFAULT_UPLOAD_TIMEOUT_SECS, 30);
    }

    #[test]
    fn log_filter_names_the_crate() {
        assert!(default_log_filter().contains("archifield"));
    }
}
