use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of one fetched series: a country code plus an indicator code.
///
/// Both codes are opaque to this crate; the provider decides what is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub country: String,
    pub indicator: String,
}

impl SeriesKey {
    pub fn new(country: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            indicator: indicator.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.indicator)
    }
}

/// Metadata section returned by the API (position 0).
///
/// Some responses encode the counters as strings, others as numbers (`per_page`
/// most often). Accept both and normalize to `u32`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub pages: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// Raw record from the API (position 1 array).
///
/// Only `date` and `value` are read; the other fields the provider sends
/// (indicator, country, unit, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub date: String,
    pub value: Option<f64>,
}

/// One observation: a calendar year and its value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    pub year: u32,
    pub value: f64,
}

impl DataPoint {
    pub const fn new(year: u32, value: f64) -> Self {
        Self { year, value }
    }

    /// Convert a raw record. Records with a null value or a non-year `date`
    /// (e.g. `"2020Q1"`) yield `None`.
    pub fn from_entry(e: &Entry) -> Option<Self> {
        let year = e.date.trim().parse::<u32>().ok()?;
        let value = e.value?;
        Some(Self { year, value })
    }
}

/// Ordered per-year values for one (country, indicator) pair.
///
/// Years are strictly ascending and unique. The points live behind an `Arc`, so
/// clones (e.g. handed out by the cache) share one immutable allocation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    key: SeriesKey,
    points: Arc<[DataPoint]>,
}

impl Series {
    /// Build a series from points in any order. When a year occurs more than once
    /// the first point seen wins.
    pub fn new(key: SeriesKey, points: impl IntoIterator<Item = DataPoint>) -> Self {
        let mut pts: Vec<DataPoint> = points.into_iter().collect();
        // stable sort keeps first-seen order within a year
        pts.sort_by_key(|p| p.year);
        pts.dedup_by_key(|p| p.year);
        Self {
            key,
            points: pts.into(),
        }
    }

    /// The "no data" series.
    pub fn empty(key: SeriesKey) -> Self {
        Self {
            key,
            points: Arc::from(Vec::new()),
        }
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    /// Indicator code; also the column name used when aligning.
    pub fn indicator(&self) -> &str {
        &self.key.indicator
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.points.iter().map(|p| p.year)
    }

    /// Value for `year`, if observed.
    pub fn get(&self, year: u32) -> Option<f64> {
        self.points
            .binary_search_by_key(&year, |p| p.year)
            .ok()
            .map(|i| self.points[i].value)
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    /// True when both handles point at the same allocation.
    pub fn shares_storage(&self, other: &Series) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }
}
