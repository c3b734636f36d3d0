use anyhow::{Context, Result};
use covtally::{
    ingest, report, stats,
    table::{
        self,
        describe::{describe, Summary},
        group, Column, TestsTable,
    },
};
use std::{env, path::PathBuf, time::Instant};
use sysinfo::System;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) load the dataset ─────────────────────────────────────────
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Covid-19_Tests.csv"));
    let start = Instant::now();
    let records = ingest::load_tests_csv(&path)
        .with_context(|| format!("loading tests dataset from {}", path.display()))?;
    let mut tests = TestsTable::from_records(records);
    info!(rows = tests.len(), elapsed = ?start.elapsed(), "loaded tests dataset");
    log_process_memory();

    // ─── 3) the walkthrough ──────────────────────────────────────────
    explore(&tests);
    select_filter_sort(&mut tests);
    clean(&mut tests);
    transform(&mut tests);

    info!("report complete");
    Ok(())
}

fn log_process_memory() {
    let mut sys = System::new_all();
    sys.refresh_all();
    if let Ok(pid) = sysinfo::get_current_pid() {
        if let Some(process) = sys.process(pid) {
            info!(rss_bytes = process.memory(), "resident memory after load");
        }
    }
}

/// Shape, column info, first and last rows, summary statistics.
fn explore(tests: &TestsTable) {
    let (rows, cols) = tests.shape();
    println!("Shape:\n ({}, {})", rows, cols);

    println!("\nColumns:");
    report::info_table(&tests.info()).printstd();

    println!("\nFirst five rows:");
    report::rows_table(&tests.head(5), &tests.columns()).printstd();

    println!("\nLast five rows:");
    report::rows_table(&tests.tail(5), &tests.columns()).printstd();

    println!("\nStats:");
    report::describe_table(&describe(tests)).printstd();
}

/// Filtered and sorted views, finishing with an in-place sort of the
/// whole table by positive percentage.
fn select_filter_sort(tests: &mut TestsTable) {
    // Days with above-average positive percentage. A NaN mean (no pct
    // values at all) compares false and yields an empty frame.
    let mean_pct =
        stats::mean(&stats::sorted_present(&tests.numeric_column(Column::Pct))).unwrap_or(f64::NAN);
    info!(mean_pct, "mean positive percentage");
    let above_avg = tests.filter(|r| r.pct.map_or(false, |p| p > mean_pct));
    println!("\nAbove avg positive percentage days:");
    report::frame_table(
        &above_avg,
        &[Column::SpecimenCollectionDate, Column::Tests, Column::Pos],
    )
    .printstd();

    let above_500 = tests.filter(|r| r.pos.map_or(false, |p| p > 500));
    println!("\nOver 500 positive tests:");
    report::frame_table(
        &above_500,
        &[Column::SpecimenCollectionDate, Column::Tests, Column::Pos],
    )
    .printstd();

    // Thirty days with the most indeterminate results: ascending sort,
    // last thirty.
    let mut by_indeterminate = tests.clone();
    by_indeterminate.sort_by(Column::Indeterminate, true);
    println!("\nRows with highest number of indeterminate tests:");
    report::rows_table(
        &by_indeterminate.tail(30),
        &[
            Column::SpecimenCollectionDate,
            Column::Tests,
            Column::Indeterminate,
        ],
    )
    .printstd();

    let mut above_10000 = tests.filter(|r| r.tests.map_or(false, |t| t > 10_000));
    println!("\nOver 10000 tests taken:");
    report::frame_table(
        &above_10000,
        &[Column::SpecimenCollectionDate, Column::Tests, Column::Pct],
    )
    .printstd();

    above_10000.sort_by(Column::Pct, false);
    println!("\n10000 tests taken, sorted:");
    report::frame_table(
        &above_10000,
        &[
            Column::SpecimenCollectionDate,
            Column::Tests,
            Column::Pos,
            Column::Pct,
        ],
    )
    .printstd();

    tests.sort_by(Column::Pct, false);
    println!("\nAll days by positive percentage:");
    report::frame_table(
        tests,
        &[
            Column::SpecimenCollectionDate,
            Column::Tests,
            Column::Pos,
            Column::Pct,
        ],
    )
    .printstd();
}

/// Null and duplicate checks, the IQR outlier comparison, and the index
/// reset.
fn clean(tests: &mut TestsTable) {
    println!("\nColumns with null values:");
    report::column_nulls_table(&tests.column_has_nulls()).printstd();

    let row_flags = tests.row_null_flags();
    println!("\nRows with null values:");
    report::row_flags_table(&row_flags).printstd();
    let (clean_rows, null_rows) = table::bool_counts(row_flags.into_iter().map(|(_, f)| f));
    report::counts_table(clean_rows, null_rows).printstd();

    println!("\nRows that are duplicates:");
    let (unique_rows, dup_rows) = table::bool_counts(tests.duplicated());
    report::counts_table(unique_rows, dup_rows).printstd();

    // The table is still sorted by pct here; take the series back in
    // ascending-label order before computing the fences.
    let percentages = tests.numeric_column_by_label(Column::Pct);
    if let Some(bounds) = stats::iqr_bounds(&percentages) {
        info!(
            q1 = bounds.q1,
            q3 = bounds.q3,
            low = bounds.low,
            high = bounds.high,
            "pct IQR fences"
        );
        let without_outliers = stats::null_outside(&percentages, bounds.low, bounds.high);
        println!("\nComparing percentages with and without outliers included:");
        report::series_compare_table(&Summary::of(&percentages), &Summary::of(&without_outliers))
            .printstd();
    }

    tests.reset_index();
    println!("\nTable with index reset:");
    report::rows_table(
        &tests.head(10),
        &[
            Column::SpecimenCollectionDate,
            Column::Tests,
            Column::Pos,
            Column::Pct,
        ],
    )
    .printstd();
}

/// The group-by-positive-count describe and the derived negative share.
fn transform(tests: &mut TestsTable) {
    let groups = group::group_by_pos(tests);
    info!(groups = groups.len(), "grouped by positive count");
    let described = group::describe_groups(&groups, tests.has_neg_pct());
    println!("\nGroups based on number of positive tests:");
    for column in Column::numeric_columns(tests.has_neg_pct())
        .into_iter()
        .filter(|c| *c != Column::Pos)
    {
        println!("\n{}:", column.name());
        report::grouped_describe_table(column, &described).printstd();
    }

    tests.derive_neg_pct();
    println!("\nNegative percentage column:");
    report::rows_table(
        &tests.head(10),
        &[
            Column::SpecimenCollectionDate,
            Column::Tests,
            Column::Neg,
            Column::NegPct,
        ],
    )
    .printstd();
}
