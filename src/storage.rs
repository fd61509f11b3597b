use crate::align::AlignedTable;
use crate::models::Series;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix text cells that a spreadsheet would evaluate as a formula.
fn safe_cell(s: &str) -> Cow<'_, str> {
    if s.starts_with(['=', '+', '-', '@']) {
        Cow::Owned(format!("'{s}"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Save a series as CSV with header `country,indicator,year,value`.
///
/// Numbers are written with `Display`, as in [`save_table_csv`]: `100`, not `100.0`.
pub fn save_series_csv<P: AsRef<Path>>(series: &Series, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.write_record(["country", "indicator", "year", "value"])?;
    let key = series.key();
    let country = safe_cell(&key.country);
    let indicator = safe_cell(&key.indicator);
    for p in series.points() {
        wtr.write_record([
            country.as_ref(),
            indicator.as_ref(),
            &p.year.to_string(),
            &p.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save an aligned table as CSV with header `year,<columns...>`.
pub fn save_table_csv<P: AsRef<Path>>(table: &AlignedTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    let mut header = vec![Cow::Borrowed("year")];
    header.extend(table.columns.iter().map(|c| safe_cell(c)));
    wtr.write_record(header.iter().map(|h| h.as_ref()))?;
    for row in &table.rows {
        let mut rec = vec![row.year.to_string()];
        rec.extend(row.values.iter().map(|v| v.to_string()));
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

fn save_json_value<P: AsRef<Path>, T: serde::Serialize>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save a series as pretty JSON (`{"key": {...}, "points": [...]}`).
pub fn save_series_json<P: AsRef<Path>>(series: &Series, path: P) -> Result<()> {
    save_json_value(series, path)
}

/// Save an aligned table as pretty JSON (`{"columns": [...], "rows": [...]}`).
pub fn save_table_json<P: AsRef<Path>>(table: &AlignedTable, path: P) -> Result<()> {
    save_json_value(table, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::models::{DataPoint, SeriesKey};
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let s = Series::new(
            SeriesKey::new("IN", "FS.AST.PRVT.GD.ZS"),
            vec![DataPoint::new(2000, 1.23), DataPoint::new(2001, -0.5)],
        );
        save_series_csv(&s, &csvp).unwrap();
        save_series_json(&s, &jsonp).unwrap();

        let txt = std::fs::read_to_string(&csvp).unwrap();
        assert!(txt.starts_with("country,indicator,year,value"));
        // numbers are never prefixed, even negative ones
        assert!(txt.contains("IN,FS.AST.PRVT.GD.ZS,2001,-0.5"));

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(v["points"].as_array().unwrap().len(), 2);
        assert_eq!(v["key"]["country"], "IN");

        let t = align(&[&s]);
        let tp = dir.path().join("t.csv");
        save_table_csv(&t, &tp).unwrap();
        assert_eq!(std::fs::read_to_string(&tp).unwrap().lines().count(), 3);
    }

    #[test]
    fn series_and_table_csv_format_numbers_alike() {
        let dir = tempdir().unwrap();
        let s = Series::new(SeriesKey::new("GB", "X"), vec![DataPoint::new(2021, 100.0)]);
        let sp = dir.path().join("s.csv");
        let tp = dir.path().join("t.csv");
        save_series_csv(&s, &sp).unwrap();
        save_table_csv(&align(&[&s]), &tp).unwrap();

        let series_txt = std::fs::read_to_string(&sp).unwrap();
        let table_txt = std::fs::read_to_string(&tp).unwrap();
        assert_eq!(series_txt.lines().nth(1), Some("GB,X,2021,100"));
        assert_eq!(table_txt.lines().nth(1), Some("2021,100"));
    }

    #[test]
    fn formula_like_text_is_prefixed() {
        assert_eq!(safe_cell("=HYPERLINK(1)"), "'=HYPERLINK(1)");
        assert_eq!(safe_cell("@foo"), "'@foo");
        assert_eq!(safe_cell("FX.OWN.TOTL.ZS"), "FX.OWN.TOTL.ZS");
    }
}
