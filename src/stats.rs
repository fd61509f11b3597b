use crate::models::{Series, SeriesKey};
use serde::{Deserialize, Serialize};

/// Summary statistics for one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub key: SeriesKey,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute count, min, max, mean and median of a series' values.
pub fn summarize(series: &Series) -> Summary {
    let mut vals: Vec<f64> = series.points().iter().map(|p| p.value).collect();
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().copied();
    let max = vals.last().copied();
    let mean = if count > 0 {
        Some(vals.iter().copied().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary {
        key: series.key().clone(),
        count,
        min,
        max,
        mean,
        median,
    }
}

/// Most recent observation and its change from the one before.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatestChange {
    pub year: u32,
    pub value: f64,
    /// `None` when the series has a single observation.
    pub delta: Option<f64>,
}

pub fn latest_change(series: &Series) -> Option<LatestChange> {
    let pts = series.points();
    let last = pts.last()?;
    let delta = pts
        .len()
        .checked_sub(2)
        .map(|i| last.value - pts[i].value);
    Some(LatestChange {
        year: last.year,
        value: last.value,
        delta,
    })
}

/// Ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; 1.0 when all `y` are equal (a flat perfect fit).
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a trendline through `(x, y)` pairs, e.g. from [`crate::align::value_pairs`].
///
/// Returns `None` for fewer than two pairs or when every `x` is the same.
pub fn linear_fit(pairs: &[(f64, f64)]) -> Option<LinearFit> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        n,
    })
}
