// ABOUTME: Health gate configuration.
// ABOUTME: HTTP endpoint plus polling interval and overall timeout with sensible defaults.

use hyper::Uri;
use serde::Deserialize;
use std::time::Duration;

use super::deserialize::{deserialize_duration, deserialize_health_url};

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(deserialize_with = "deserialize_health_url")]
    pub url: Uri,

    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,

    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_timeout() -> Duration {
    Duration::from_secs(45)
}

impl HealthConfig {
    /// Health config for `url` with default interval and timeout.
    pub fn for_url(url: Uri) -> Self {
        Self {
            url,
            interval: default_interval(),
            timeout: default_timeout(),
        }
    }
}
