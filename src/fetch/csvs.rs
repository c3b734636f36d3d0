use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use super::urls;

/// The slice of the portal metadata document worth logging.
#[derive(Debug, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    #[serde(rename = "rowsUpdatedAt")]
    pub rows_updated_at: Option<i64>,
}

/// Fetch the dataset metadata document.
pub async fn fetch_dataset_info(client: &Client, dataset_id: &str) -> Result<DatasetInfo> {
    let url = urls::metadata_url(dataset_id)?;
    let body = client
        .get(url.as_str())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let info: DatasetInfo =
        serde_json::from_str(&body).context("decoding dataset metadata document")?;
    Ok(info)
}

/// Download the CSV export for `dataset_id` and save it under `dest_dir`
/// as `file_name`, streaming the body to disk. Returns the saved path.
pub async fn download_csv(
    client: &Client,
    dataset_id: &str,
    dest_dir: impl AsRef<Path>,
    file_name: &str,
) -> Result<PathBuf> {
    let url = urls::csv_export_url(dataset_id)?;
    let dest_path = dest_dir.as_ref().join(file_name);

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let resp = client.get(url.as_str()).send().await?.error_for_status()?;
    let mut stream = resp.bytes_stream();
    let mut out = fs::File::create(&dest_path)
        .await
        .with_context(|| format!("creating {}", dest_path.display()))?;

    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("reading CSV export stream")?;
        written += chunk.len() as u64;
        out.write_all(&chunk).await?;
    }
    out.flush().await?;
    debug!(bytes = written, path = %dest_path.display(), "downloaded CSV export");

    Ok(dest_path)
}
