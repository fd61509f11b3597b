//! Year alignment of several series.
//!
//! Inner join semantics: a row exists only for a year observed in **every** input.
//! A year missing from one input is not an error; it just has no row.

use crate::error::AlignError;
use crate::models::Series;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column computed per row after the join. `left`/`right` index the input series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derived {
    /// `left - right`
    Difference {
        left: usize,
        right: usize,
        name: String,
    },
    /// `left / right`. A zero denominator gives a non-finite value; the row is kept.
    Ratio {
        left: usize,
        right: usize,
        name: String,
    },
}

impl Derived {
    fn name(&self) -> &str {
        match self {
            Self::Difference { name, .. } | Self::Ratio { name, .. } => name,
        }
    }

    const fn operands(&self) -> (usize, usize) {
        match *self {
            Self::Difference { left, right, .. } | Self::Ratio { left, right, .. } => {
                (left, right)
            }
        }
    }

    fn apply(&self, values: &[f64]) -> f64 {
        let (l, r) = self.operands();
        match self {
            Self::Difference { .. } => values[l] - values[r],
            Self::Ratio { .. } => values[l] / values[r],
        }
    }
}

/// One joined year: input values first, derived values after, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub year: u32,
    pub values: Vec<f64>,
}

/// Result of aligning series on year. Rows ascend by year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    /// Indicator codes of the inputs (country-qualified if an indicator repeats),
    /// then the names of derived columns.
    pub columns: Vec<String>,
    pub rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn years(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let i = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[i]).collect())
    }
}

fn column_names(series: &[&Series]) -> Vec<String> {
    let mut seen = HashSet::new();
    let repeated: HashSet<&str> = series
        .iter()
        .map(|s| s.indicator())
        .filter(|ind| !seen.insert(*ind))
        .collect();
    series
        .iter()
        .map(|s| {
            if repeated.contains(s.indicator()) {
                s.key().to_string()
            } else {
                s.indicator().to_string()
            }
        })
        .collect()
}

fn join(series: &[&Series]) -> Vec<AlignedRow> {
    let Some((first, rest)) = series.split_first() else {
        return vec![];
    };
    if series.iter().any(|s| s.is_empty()) {
        return vec![];
    }
    first
        .points()
        .iter()
        .filter_map(|p| {
            let mut values = Vec::with_capacity(series.len());
            values.push(p.value);
            for s in rest {
                values.push(s.get(p.year)?);
            }
            Some(AlignedRow {
                year: p.year,
                values,
            })
        })
        .collect()
}

fn build(series: &[&Series], derived: &[Derived]) -> AlignedTable {
    let mut columns = column_names(series);
    columns.extend(derived.iter().map(|d| d.name().to_string()));
    let mut rows = join(series);
    for row in &mut rows {
        let extra: Vec<f64> = derived.iter().map(|d| d.apply(&row.values)).collect();
        row.values.extend(extra);
    }
    AlignedTable { columns, rows }
}

/// Inner-join `series` on year.
///
/// An empty input, no inputs, or no year common to all inputs gives a table without
/// rows (the column names are still filled in).
pub fn align(series: &[&Series]) -> AlignedTable {
    build(series, &[])
}

/// Inner-join `series` on year and append `derived` columns.
///
/// ### Errors
/// [`AlignError::UnknownColumn`] when a derived column references an input index
/// that does not exist.
pub fn align_with(series: &[&Series], derived: &[Derived]) -> Result<AlignedTable, AlignError> {
    for d in derived {
        let (l, r) = d.operands();
        for idx in [l, r] {
            if idx >= series.len() {
                return Err(AlignError::UnknownColumn {
                    index: idx,
                    inputs: series.len(),
                });
            }
        }
    }
    Ok(build(series, derived))
}

/// Join two series and add `name = a - b`. Columns: `[a, b, name]`.
pub fn align_difference(a: &Series, b: &Series, name: &str) -> AlignedTable {
    build(
        &[a, b],
        &[Derived::Difference {
            left: 0,
            right: 1,
            name: name.into(),
        }],
    )
}

/// Joined `(a, b)` value pairs without years, for scatter plots and regressions.
pub fn value_pairs(a: &Series, b: &Series) -> Vec<(f64, f64)> {
    join(&[a, b])
        .into_iter()
        .map(|r| (r.values[0], r.values[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataPoint, SeriesKey};

    fn s(country: &str, ind: &str, pts: &[(u32, f64)]) -> Series {
        Series::new(
            SeriesKey::new(country, ind),
            pts.iter().map(|&(y, v)| DataPoint::new(y, v)),
        )
    }

    #[test]
    fn repeated_indicator_columns_are_country_qualified() {
        let a = s("IN", "X", &[(2020, 1.0)]);
        let b = s("GB", "X", &[(2020, 2.0)]);
        let t = align(&[&a, &b]);
        assert_eq!(t.columns, vec!["IN/X", "GB/X"]);
        assert_eq!(t.rows[0].values, vec![1.0, 2.0]);
    }

    #[test]
    fn ratio_with_zero_denominator_keeps_row() {
        let a = s("IN", "A", &[(2020, 1.0), (2021, 4.0)]);
        let b = s("IN", "B", &[(2020, 0.0), (2021, 2.0)]);
        let t = align_with(
            &[&a, &b],
            &[Derived::Ratio {
                left: 0,
                right: 1,
                name: "A/B".into(),
            }],
        )
        .unwrap();
        assert_eq!(t.len(), 2);
        assert!(t.rows[0].values[2].is_infinite());
        assert_eq!(t.column("A/B").unwrap()[1], 2.0);
    }

    #[test]
    fn derived_with_bad_index_is_rejected() {
        let a = s("IN", "A", &[(2020, 1.0)]);
        let err = align_with(
            &[&a],
            &[Derived::Difference {
                left: 0,
                right: 1,
                name: "d".into(),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, AlignError::UnknownColumn { index: 1, inputs: 1 }));
    }
}
