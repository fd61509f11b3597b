//! Synchronous fetcher for one **World Bank Indicators API (v2)** series at a time.
//!
//! This module covers the `country/{code}/indicator/{code}` endpoint and returns a
//! [`Series`] sorted by year. Pagination is followed via the `pages` field of the
//! response metadata.
//!
//! ### Notes
//! - The API sometimes serializes the page counters as **strings**; we accept both
//!   string/number. A response whose metadata cannot be read is malformed: without
//!   it there is no way to tell whether more pages follow.
//! - The number of records received is checked against `total` from the first page,
//!   so a truncated series is reported instead of cached.
//! - An unknown indicator or country comes back as `[{"message": [...]}]`, which is
//!   reported as [`FetchError::Provider`].
//! - [`IndicatorFetcher::fetch`] never fails. Every failure is logged with its
//!   [`FailureKind`] and turned into an empty series, the uniform "no data" signal.
//!
//! Typical usage:
//! ```no_run
//! # use wbi_dash::IndicatorFetcher;
//! let fetcher = IndicatorFetcher::default();
//! let credit = fetcher.fetch("IN", "FS.AST.PRVT.GD.ZS");
//! if credit.is_empty() {
//!     println!("Data not available.");
//! }
//! ```

use crate::cache::{SeriesCache, TtlCache};
use crate::config::FetcherConfig;
use crate::error::{FailureKind, FetchError, Result};
use crate::models::{DataPoint, Entry, Meta, Series, SeriesKey};
use crate::transport::{ReqwestTransport, Transport};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(code: &str) -> String {
    percent_encoding::utf8_percent_encode(code.trim(), SAFE).to_string()
}

/// One decoded response page.
#[derive(Debug, Clone)]
pub struct Page {
    pub meta: Meta,
    pub entries: Vec<Entry>,
}

/// Decode one response body of shape `[Meta, [Entry, ...]]`.
///
/// A `null` record list (the provider's answer for a series without observations)
/// decodes to zero entries.
pub fn parse_page(v: &Value) -> Result<Page> {
    let arr = v
        .as_array()
        .ok_or_else(|| FetchError::Malformed("not a top-level array".into()))?;

    // If first element has "message", surface API error.
    if let Some(first) = arr.first()
        && first.get("message").is_some()
    {
        return Err(FetchError::Provider(first.to_string()));
    }
    if arr.len() < 2 {
        return Err(FetchError::Malformed(format!(
            "expected [meta, records], got {} element(s)",
            arr.len()
        )));
    }

    let meta = serde_json::from_value::<Meta>(arr[0].clone())
        .map_err(|e| FetchError::Malformed(format!("parse meta: {e}")))?;
    let entries: Vec<Entry> = if arr[1].is_null() {
        vec![]
    } else {
        serde_json::from_value(arr[1].clone())?
    };
    Ok(Page { meta, entries })
}

/// Fetches, caches and normalizes indicator series.
///
/// `Send + Sync`: share one instance across threads. Concurrent requests for the same
/// key wait for the first one and are then served from the cache.
pub struct IndicatorFetcher {
    config: FetcherConfig,
    transport: Box<dyn Transport>,
    cache: Arc<dyn SeriesCache>,
    inflight: Mutex<HashMap<SeriesKey, Arc<Mutex<()>>>>,
}

impl Default for IndicatorFetcher {
    fn default() -> Self {
        Self::new(FetcherConfig::default()).expect("reqwest client build")
    }
}

impl std::fmt::Debug for IndicatorFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IndicatorFetcher {
    /// Fetcher over HTTP with a [`TtlCache`] using `config.ttl()`.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        let cache = Arc::new(TtlCache::new(config.ttl()));
        Ok(Self::with_parts(config, transport, cache))
    }

    /// Assemble a fetcher from explicit parts (fake transports, shared or disabled caches).
    pub fn with_parts(
        config: FetcherConfig,
        transport: impl Transport + 'static,
        cache: Arc<dyn SeriesCache>,
    ) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            cache,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub const fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// URL of the first page, without the `page` parameter.
    pub fn series_url(&self, key: &SeriesKey) -> String {
        format!(
            "{}/country/{}/indicator/{}?format=json&per_page={}",
            self.config.base_url.trim_end_matches('/'),
            enc(&key.country),
            enc(&key.indicator),
            self.config.per_page
        )
    }

    /// Fetch a series, collapsing every failure into an empty series.
    ///
    /// Failures are logged at `warn` with their kind: `Transient` means the provider
    /// could not be reached or refused the request, `Malformed` means it answered
    /// with something other than the expected payload.
    pub fn fetch(&self, country: &str, indicator: &str) -> Series {
        match self.try_fetch(country, indicator) {
            Ok(series) => series,
            Err(e) => {
                let key = SeriesKey::new(country.trim(), indicator.trim());
                match e.kind() {
                    FailureKind::Transient => log::warn!("provider unavailable for {key}: {e}"),
                    FailureKind::Malformed => log::warn!("unexpected payload for {key}: {e}"),
                    FailureKind::Invalid => log::warn!("rejected request for {key}: {e}"),
                }
                Series::empty(key)
            }
        }
    }

    /// Fetch a series, reporting why it could not be produced.
    ///
    /// Successful results (including a successful empty series) are cached;
    /// failures are not, so the next call tries again.
    pub fn try_fetch(&self, country: &str, indicator: &str) -> Result<Series> {
        let (country, indicator) = (country.trim(), indicator.trim());
        if country.is_empty() {
            return Err(FetchError::InvalidRequest("country code is empty".into()));
        }
        if indicator.is_empty() {
            return Err(FetchError::InvalidRequest("indicator code is empty".into()));
        }
        let key = SeriesKey::new(country, indicator);

        if let Some(hit) = self.cache.get(&key) {
            log::debug!("cache hit for {key}");
            return Ok(hit);
        }

        let gate = self.gate(&key);
        let result = {
            let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
            // Someone else may have filled the cache while we waited.
            if let Some(hit) = self.cache.get(&key) {
                log::debug!("cache hit for {key} after wait");
                Ok(hit)
            } else {
                self.fetch_uncached(&key).inspect(|series| {
                    self.cache.put(key.clone(), series.clone());
                })
            }
        };
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        result
    }

    fn gate(&self, key: &SeriesKey) -> Arc<Mutex<()>> {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn fetch_uncached(&self, key: &SeriesKey) -> Result<Series> {
        let url = self.series_url(key);
        let mut page = 1u32;
        let mut points: Vec<DataPoint> = Vec::new();
        let mut received = 0usize;
        let mut expected = None;
        loop {
            if page > self.config.max_pages {
                return Err(FetchError::Malformed(format!(
                    "page limit exceeded ({})",
                    self.config.max_pages
                )));
            }
            let page_url = format!("{url}&page={page}");
            log::debug!("GET {page_url}");
            let resp = self.transport.get(&page_url)?;
            if !resp.is_success() {
                return Err(FetchError::Status(resp.status));
            }
            let v: Value = serde_json::from_str(&resp.body)?;
            let decoded = parse_page(&v)?;

            received += decoded.entries.len();
            points.extend(decoded.entries.iter().filter_map(DataPoint::from_entry));

            let total = *expected.get_or_insert(decoded.meta.total as usize);
            if page < decoded.meta.pages {
                page += 1;
            } else {
                if received < total {
                    return Err(FetchError::Malformed(format!(
                        "received {received} of {total} record(s)"
                    )));
                }
                break;
            }
        }
        log::debug!("fetched {} observation(s) for {key} over {page} page(s)", points.len());
        Ok(Series::new(key.clone(), points))
    }
}
