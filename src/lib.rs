//! wbi-dash
//!
//! Data layer for small World Bank dashboards (financial inclusion in India and the UK).
//! Fetches indicator time series, caches them for a day, and aligns them by year into
//! tables the presentation side can chart directly.
//!
//! ### Features
//! - Fetch one (country, indicator) series with pagination, caching and a uniform
//!   "empty series" signal on failure
//! - Inner-join series on year, with difference/ratio columns and value pairs
//! - Summary statistics, latest value + delta, OLS trendline
//! - Export series and tables as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use wbi_dash::{IndicatorFetcher, align};
//!
//! let fetcher = IndicatorFetcher::default();
//! let total = fetcher.fetch("IN", "FX.OWN.TOTL.ZS");
//! let female = fetcher.fetch("IN", "FX.OWN.TOTL.FE.ZS");
//! let gap = align::align_difference(&total, &female, "Gender Gap");
//! wbi_dash::storage::save_table_csv(&gap, "gender_gap.csv")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod align;
pub mod api;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod stats;
pub mod storage;
pub mod transport;

pub use align::{AlignedRow, AlignedTable, Derived};
pub use api::IndicatorFetcher;
pub use config::FetcherConfig;
pub use error::{AlignError, FailureKind, FetchError};
pub use models::{DataPoint, Series, SeriesKey};
