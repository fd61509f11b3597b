//! Per-country dashboard datasets.
//!
//! Each dashboard tab renders one [`Panel`]. A panel is either the data the tab
//! needs, or a notice that it is not available; tabs never see fetch errors.

use crate::align::{AlignedTable, align_difference, value_pairs};
use crate::api::IndicatorFetcher;
use crate::models::Series;
use crate::stats::{LatestChange, LinearFit, latest_change, linear_fit};
use serde::Serialize;

/// Indicator codes used by the dashboards.
pub mod indicators {
    /// Domestic credit to private sector (% of GDP).
    pub const CREDIT_TO_PRIVATE_SECTOR: &str = "FS.AST.PRVT.GD.ZS";
    /// Account ownership, total (% of population ages 15+).
    pub const ACCOUNT_OWNERSHIP: &str = "FX.OWN.TOTL.ZS";
    pub const ACCOUNT_OWNERSHIP_FEMALE: &str = "FX.OWN.TOTL.FE.ZS";
    pub const ACCOUNT_OWNERSHIP_MALE: &str = "FX.OWN.TOTL.MA.ZS";
    /// Interest rate spread (lending rate minus deposit rate, %).
    pub const INTEREST_RATE_SPREAD: &str = "FR.INR.LNDP";
}

/// Name of the derived column in the gender gap table.
pub const GAP_COLUMN: &str = "Gender Gap";

/// One dashboard deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryProfile {
    /// Two-letter code sent to the provider.
    pub code: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    /// Series the female share is compared against in the gender gap panel.
    pub gender_baseline: &'static str,
}

impl CountryProfile {
    pub const INDIA: Self = Self {
        code: "IN",
        name: "India",
        title: "Credit Access and Financial Inclusion in India",
        gender_baseline: indicators::ACCOUNT_OWNERSHIP,
    };

    pub const UNITED_KINGDOM: Self = Self {
        code: "GB",
        name: "United Kingdom",
        title: "Credit Access and Financial Inclusion in the United Kingdom",
        gender_baseline: indicators::ACCOUNT_OWNERSHIP_MALE,
    };

    pub const ALL: [Self; 2] = [Self::INDIA, Self::UNITED_KINGDOM];

    /// Look up a profile by name or code, case-insensitively (`india`, `in`, `uk`, `gb`).
    pub fn lookup(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "india" | "in" | "ind" => Some(Self::INDIA),
            "uk" | "gb" | "gbr" | "united-kingdom" | "united kingdom" => {
                Some(Self::UNITED_KINGDOM)
            }
            _ => None,
        }
    }
}

/// Data for one tab, or the notice to show instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Panel<T> {
    Available(T),
    Unavailable(&'static str),
}

impl<T> Panel<T> {
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub const fn available(&self) -> Option<&T> {
        match self {
            Self::Available(t) => Some(t),
            Self::Unavailable(_) => None,
        }
    }
}

/// A single indicator over time plus its headline metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPanel {
    pub series: Series,
    pub latest: Option<LatestChange>,
}

/// Joined `(x, y)` pairs and their trendline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPanel {
    pub x_indicator: &'static str,
    pub y_indicator: &'static str,
    pub pairs: Vec<(f64, f64)>,
    pub fit: Option<LinearFit>,
}

/// Builds the panels of one country's dashboard.
#[derive(Debug, Clone, Copy)]
pub struct Dashboard<'a> {
    profile: CountryProfile,
    fetcher: &'a IndicatorFetcher,
}

impl<'a> Dashboard<'a> {
    pub const fn new(profile: CountryProfile, fetcher: &'a IndicatorFetcher) -> Self {
        Self { profile, fetcher }
    }

    pub const fn profile(&self) -> CountryProfile {
        self.profile
    }

    fn series(&self, indicator: &str) -> Series {
        self.fetcher.fetch(self.profile.code, indicator)
    }

    fn trend(&self, indicator: &str) -> Panel<TrendPanel> {
        let series = self.series(indicator);
        if series.is_empty() {
            return Panel::Unavailable("Data not available.");
        }
        let latest = latest_change(&series);
        Panel::Available(TrendPanel { series, latest })
    }

    pub fn credit_to_gdp(&self) -> Panel<TrendPanel> {
        self.trend(indicators::CREDIT_TO_PRIVATE_SECTOR)
    }

    pub fn account_ownership(&self) -> Panel<TrendPanel> {
        self.trend(indicators::ACCOUNT_OWNERSHIP)
    }

    pub fn interest_rate_spread(&self) -> Panel<TrendPanel> {
        self.trend(indicators::INTEREST_RATE_SPREAD)
    }

    /// Baseline vs female account ownership with a `Gender Gap` column (baseline - female).
    pub fn gender_gap(&self) -> Panel<AlignedTable> {
        let baseline = self.series(self.profile.gender_baseline);
        let female = self.series(indicators::ACCOUNT_OWNERSHIP_FEMALE);
        let table = align_difference(&baseline, &female, GAP_COLUMN);
        if table.is_empty() {
            return Panel::Unavailable("Gender data not available.");
        }
        Panel::Available(table)
    }

    /// Account ownership (x) against credit to the private sector (y).
    pub fn credit_vs_inclusion(&self) -> Panel<CorrelationPanel> {
        let accounts = self.series(indicators::ACCOUNT_OWNERSHIP);
        let credit = self.series(indicators::CREDIT_TO_PRIVATE_SECTOR);
        let pairs = value_pairs(&accounts, &credit);
        if pairs.is_empty() {
            return Panel::Unavailable("Insufficient data to show correlation.");
        }
        let fit = linear_fit(&pairs);
        Panel::Available(CorrelationPanel {
            x_indicator: indicators::ACCOUNT_OWNERSHIP,
            y_indicator: indicators::CREDIT_TO_PRIVATE_SECTOR,
            pairs,
            fit,
        })
    }
}
