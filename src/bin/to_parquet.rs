use anyhow::Result;
use covtally::{export, ingest};
use std::{env, path::PathBuf, process::exit};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Archive the daily tests CSV as a single Parquet file.
fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <TESTS_CSV> [OUT_PARQUET]", args[0]);
        exit(1);
    }
    let input = PathBuf::from(&args[1]);
    let output = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("parquet"));

    let records = ingest::load_tests_csv(&input)?;
    let bytes = export::write_parquet(&records, false, &output)?;
    info!(
        rows = records.len(),
        bytes,
        path = %output.display(),
        "wrote parquet archive"
    );

    Ok(())
}
