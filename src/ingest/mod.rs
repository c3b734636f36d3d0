use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Deserializer};
use std::{fs::File, path::Path};
use tracing::debug;

/// One resulted-tests observation for a single specimen-collection day.
///
/// `pct` is derived upstream as pos/tests; `neg_pct` is derived in-process
/// by [`crate::table::TestsTable::derive_neg_pct`] and stays `None` until
/// then.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyTests {
    #[serde(deserialize_with = "de_collection_date")]
    pub specimen_collection_date: Option<NaiveDate>,
    pub tests: Option<i64>,
    pub pos: Option<i64>,
    pub pct: Option<f64>,
    pub neg: Option<i64>,
    pub indeterminate: Option<i64>,
    #[serde(skip)]
    pub neg_pct: Option<f64>,
}

/// Parse a specimen-collection date.
///
/// The portal has served both `YYYY-MM-DD` and `YYYY/MM/DD`, sometimes with
/// a trailing time-of-day. Anything else is treated as missing.
pub fn parse_collection_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim().trim_matches('"');
    let date_part = cleaned.split_whitespace().next()?;
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
            return Some(date);
        }
    }
    None
}

fn de_collection_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_collection_date))
}

const EXPECTED_HEADERS: [&str; 6] = [
    "specimen_collection_date",
    "tests",
    "pos",
    "pct",
    "neg",
    "indeterminate",
];

/// Load the daily tests CSV into typed records.
///
/// Headers must carry the six dataset columns by name; extra columns are
/// ignored. Empty numeric cells become `None`, while non-numeric garbage in
/// a numeric cell fails with the offending record number.
pub fn load_tests_csv<P: AsRef<Path>>(path: P) -> Result<Vec<DailyTests>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open tests CSV {}", path.display()))?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    // serde fills a missing Option column with None, so a misnamed header
    // would otherwise load silently as an all-null column.
    let headers = rdr.headers().context("reading CSV headers")?.clone();
    for expected in EXPECTED_HEADERS {
        if !headers.iter().any(|h| h == expected) {
            bail!("missing column `{}` in {}", expected, path.display());
        }
    }

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<DailyTests>().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        records.push(record);
    }

    if records.is_empty() {
        bail!("no rows in {}", path.display());
    }
    debug!(rows = records.len(), "parsed tests CSV");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "specimen_collection_date,tests,pos,pct,neg,indeterminate\n";

    fn write_csv(content: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().expect("temp file");
        tmp.write_all(content.as_bytes()).expect("write csv");
        tmp
    }

    #[test]
    fn loads_both_date_flavours_and_nulls() -> Result<()> {
        let tmp = write_csv(&format!(
            "{HEADER}2020-04-01,100,10,0.1,89,1\n2020/04/02,200,,0.05,,10\n,50,5,0.1,44,1\n"
        ));
        let records = load_tests_csv(tmp.path())?;

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].specimen_collection_date,
            NaiveDate::from_ymd_opt(2020, 4, 1)
        );
        assert_eq!(
            records[1].specimen_collection_date,
            NaiveDate::from_ymd_opt(2020, 4, 2)
        );
        assert_eq!(records[1].pos, None);
        assert_eq!(records[1].neg, None);
        assert_eq!(records[2].specimen_collection_date, None);
        assert_eq!(records[0].neg_pct, None);
        Ok(())
    }

    #[test]
    fn date_with_time_suffix_parses() {
        assert_eq!(
            parse_collection_date("2020/04/01 12:00:00 AM"),
            NaiveDate::from_ymd_opt(2020, 4, 1)
        );
        assert_eq!(parse_collection_date("not a date"), None);
        assert_eq!(parse_collection_date(""), None);
    }

    #[test]
    fn garbage_numeric_cell_is_an_error() {
        let tmp = write_csv(&format!("{HEADER}2020-04-01,lots,10,0.1,89,1\n"));
        assert!(load_tests_csv(tmp.path()).is_err());
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let tmp = write_csv(HEADER);
        assert!(load_tests_csv(tmp.path()).is_err());
    }

    #[test]
    fn misnamed_header_is_an_error() {
        let tmp = write_csv("collection_date,tests,pos,pct,neg,indeterminate\n2020-04-01,100,10,0.1,89,1\n");
        let err = load_tests_csv(tmp.path()).expect_err("misnamed header");
        assert!(err.to_string().contains("specimen_collection_date"));
    }
}
