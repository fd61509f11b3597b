use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";

/// Series are cached for one day; the provider updates a few times a year.
pub const DEFAULT_TTL_SECS: u64 = 86_400;

/// Fetcher settings. Everything has a sensible default, so most callers use
/// `FetcherConfig::default()` and override one field at most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub base_url: String,
    /// Records requested per page.
    pub per_page: u32,
    /// Total request timeout, seconds.
    pub timeout_secs: u64,
    /// Connect timeout, seconds.
    pub connect_timeout_secs: u64,
    /// Cache time-to-live, seconds.
    pub ttl_secs: u64,
    /// Upper bound on pages followed for one series.
    pub max_pages: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            per_page: 100,
            timeout_secs: 10,
            connect_timeout_secs: 5,
            ttl_secs: DEFAULT_TTL_SECS,
            max_pages: 50,
        }
    }
}

impl FetcherConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn ttl(&self) -> TimeDelta {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FetcherConfig = serde_json::from_str(r#"{"ttl_secs": 60}"#).unwrap();
        assert_eq!(cfg.ttl_secs, 60);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.per_page, 100);
        assert_eq!(cfg.ttl(), TimeDelta::seconds(60));
    }
}
