//! Sync configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote source and polling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the remote, `/update` is appended
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Refresh period in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for skipping ticks after consecutive failures, 0 disables backoff
    #[serde(default)]
    pub backoff_max_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            backoff_max_secs: 0,
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Most ticks skipped in a row while backing off.
    pub fn max_backoff_ticks(&self) -> u32 {
        let ticks = self.backoff_max_secs / self.poll_interval_secs.max(1);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_poll_interval() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    30
}
