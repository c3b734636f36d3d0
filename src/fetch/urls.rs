use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// DataSF "COVID-19 Tests" dataset: daily specimen counts and results.
pub const TESTS_DATASET_ID: &str = "nfpa-mg4g";

const PORTAL_BASE: &str = "https://data.sfgov.org";

// Socrata dataset ids are two groups of four lowercase alphanumerics.
static DATASET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]{4}-[a-z0-9]{4}$").expect("dataset id pattern is valid"));

pub fn validate_dataset_id(id: &str) -> Result<()> {
    if !DATASET_ID_RE.is_match(id) {
        bail!("`{}` is not a Socrata 4x4 dataset id", id);
    }
    Ok(())
}

/// Full CSV export URL for a dataset.
pub fn csv_export_url(dataset_id: &str) -> Result<Url> {
    validate_dataset_id(dataset_id)?;
    let url = Url::parse_with_params(
        &format!("{}/api/views/{}/rows.csv", PORTAL_BASE, dataset_id),
        &[("accessType", "DOWNLOAD")],
    )?;
    Ok(url)
}

/// Metadata document URL for a dataset.
pub fn metadata_url(dataset_id: &str) -> Result<Url> {
    validate_dataset_id(dataset_id)?;
    Ok(Url::parse(&format!(
        "{}/api/views/{}.json",
        PORTAL_BASE, dataset_id
    ))?)
}
