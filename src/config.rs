use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::PollStore;

/// Runtime settings. Environment variables override the built-in defaults
/// for embedders.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL embedded in share links.
    pub app_url: String,
    /// Where the poll blob lives on disk. `None` keeps polls in memory only,
    /// the equivalent of running without a storage medium.
    pub data_path: Option<PathBuf>,
    /// Delay between host-availability checks during startup.
    pub sdk_poll_interval: Duration,
    /// How long to keep checking before giving up and entering guest mode.
    pub sdk_timeout: Duration,
    /// Pause before the single retry of the ready signal.
    pub ready_retry_delay: Duration,
    /// Artificial pause during poll creation so the pending indicator
    /// registers.
    pub create_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            app_url: "https://castpoll.app".to_string(),
            data_path: None,
            sdk_poll_interval: Duration::from_millis(100),
            sdk_timeout: Duration::from_secs(5),
            ready_retry_delay: Duration::from_secs(1),
            create_delay: Duration::from_millis(500),
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then applies `CASTPOLL_*` overrides on top of
    /// the defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(url) = env::var("CASTPOLL_APP_URL") {
            config.app_url = url;
        }
        if let Ok(path) = env::var("CASTPOLL_DATA_PATH") {
            config.data_path = Some(path.into());
        } else {
            info!("CASTPOLL_DATA_PATH not set, polls will not survive restarts");
        }
        config
    }

    /// The store this configuration describes: file-backed when a data path
    /// is set, in-memory otherwise.
    pub fn store(&self) -> PollStore {
        match &self.data_path {
            Some(path) => PollStore::open(path.clone()),
            None => PollStore::in_memory(),
        }
    }

    /// Same settings with every delay shrunk so tests do not sleep.
    #[cfg(test)]
    pub(crate) fn fast() -> Self {
        AppConfig {
            sdk_poll_interval: Duration::from_millis(1),
            sdk_timeout: Duration::from_millis(10),
            ready_retry_delay: Duration::from_millis(1),
            create_delay: Duration::from_millis(0),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timings() {
        let config = AppConfig::default();
        assert_eq!(config.sdk_poll_interval, Duration::from_millis(100));
        assert_eq!(config.sdk_timeout, Duration::from_secs(5));
        assert_eq!(config.ready_retry_delay, Duration::from_secs(1));
        assert_eq!(config.create_delay, Duration::from_millis(500));
        assert!(config.data_path.is_none());
    }

    #[test]
    fn default_store_is_in_memory_and_empty() {
        let store = AppConfig::default().store();
        assert!(store.get_all().is_empty());
    }
}
