use anyhow::Result;
use covtally::fetch::{csvs, urls};
use reqwest::Client;
use std::env;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Download the daily tests CSV export from the open-data portal.
///
/// Usage: fetch_data [DATASET_ID] [OUT_FILE]
#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let dataset_id = env::args()
        .nth(1)
        .unwrap_or_else(|| urls::TESTS_DATASET_ID.to_string());
    let out_file = env::args()
        .nth(2)
        .unwrap_or_else(|| "Covid-19_Tests.csv".to_string());

    let client = Client::new();

    let meta = csvs::fetch_dataset_info(&client, &dataset_id).await?;
    info!(
        dataset = %dataset_id,
        name = %meta.name,
        rows_updated_at = ?meta.rows_updated_at,
        "dataset metadata"
    );

    let start = Instant::now();
    let path = csvs::download_csv(&client, &dataset_id, ".", &out_file).await?;
    info!(path = %path.display(), elapsed = ?start.elapsed(), "downloaded");

    Ok(())
}
