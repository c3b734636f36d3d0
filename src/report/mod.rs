//! Console rendering of frames and summaries.

use prettytable::{format, Cell, Row, Table};

use crate::ingest::DailyTests;
use crate::table::describe::Summary;
use crate::table::group::GroupDescribe;
use crate::table::{Column, ColumnInfo, TestsTable};

/// Frames longer than this print only the first and last [`EDGE_ROWS`]
/// around an ellipsis row, the way a dataframe console printer truncates.
const TRUNCATE_AT: usize = 10;
const EDGE_ROWS: usize = 5;

fn base_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table
}

fn header_row(names: &[&str]) -> Row {
    Row::new(names.iter().map(|n| Cell::new(n).style_spec("bFg")).collect())
}

fn add_data_rows<F>(table: &mut Table, len: usize, width: usize, mut row_at: F)
where
    F: FnMut(usize) -> Row,
{
    if len > TRUNCATE_AT {
        for i in 0..EDGE_ROWS {
            table.add_row(row_at(i));
        }
        table.add_row(Row::new(vec![Cell::new("…"); width]));
        for i in len - EDGE_ROWS..len {
            table.add_row(row_at(i));
        }
    } else {
        for i in 0..len {
            table.add_row(row_at(i));
        }
    }
}

/// Format a float with up to six decimals, trailing zeros trimmed but at
/// least one decimal kept.
pub fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".into();
    }
    let mut s = format!("{:.6}", v);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
    s
}

pub fn fmt_opt_float(v: Option<f64>) -> String {
    v.map(fmt_float).unwrap_or_else(|| "NaN".into())
}

fn fmt_opt_int(v: Option<i64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "NaN".into())
}

/// One cell of a frame, as text.
pub fn cell_text(column: Column, rec: &DailyTests) -> String {
    match column {
        Column::SpecimenCollectionDate => rec
            .specimen_collection_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "NaN".into()),
        Column::Tests => fmt_opt_int(rec.tests),
        Column::Pos => fmt_opt_int(rec.pos),
        Column::Neg => fmt_opt_int(rec.neg),
        Column::Indeterminate => fmt_opt_int(rec.indeterminate),
        Column::Pct => fmt_opt_float(rec.pct),
        Column::NegPct => fmt_opt_float(rec.neg_pct),
    }
}

fn value_cell(column: Column, rec: &DailyTests) -> Cell {
    let text = cell_text(column, rec);
    match column {
        Column::SpecimenCollectionDate => Cell::new(&text),
        _ => Cell::new(&text).style_spec("r"),
    }
}

/// Render labelled rows (a head/tail view or a whole frame) over the
/// selected columns.
pub fn rows_table(rows: &[(usize, &DailyTests)], columns: &[Column]) -> Table {
    let mut table = base_table();
    let mut names = vec![""];
    names.extend(columns.iter().map(|c| c.name()));
    table.add_row(header_row(&names));

    add_data_rows(&mut table, rows.len(), names.len(), |i| {
        let (label, rec) = rows[i];
        let mut cells = vec![Cell::new(&label.to_string()).style_spec("r")];
        cells.extend(columns.iter().map(|&c| value_cell(c, rec)));
        Row::new(cells)
    });
    table
}

/// Render a whole table over the selected columns.
pub fn frame_table(frame: &TestsTable, columns: &[Column]) -> Table {
    let rows: Vec<(usize, &DailyTests)> = frame.rows().collect();
    rows_table(&rows, columns)
}

pub fn info_table(infos: &[ColumnInfo]) -> Table {
    let mut table = base_table();
    table.add_row(header_row(&["column", "dtype", "non-null", "approx bytes"]));
    for info in infos {
        table.add_row(Row::new(vec![
            Cell::new(info.column.name()),
            Cell::new(info.dtype),
            Cell::new(&info.non_null.to_string()).style_spec("r"),
            Cell::new(&info.bytes.to_string()).style_spec("r"),
        ]));
    }
    table
}

/// Stats as rows, columns across.
pub fn describe_table(entries: &[(Column, Summary)]) -> Table {
    let mut table = base_table();
    let mut names = vec![""];
    names.extend(entries.iter().map(|(c, _)| c.name()));
    table.add_row(header_row(&names));

    for (i, stat) in Summary::STAT_NAMES.iter().enumerate() {
        let mut cells = vec![Cell::new(stat)];
        for (_, summary) in entries {
            cells.push(Cell::new(&fmt_opt_float(summary.stat_values()[i])).style_spec("r"));
        }
        table.add_row(Row::new(cells));
    }
    table
}

/// Before/after comparison of one series, stats as rows.
pub fn series_compare_table(before: &Summary, after: &Summary) -> Table {
    let mut table = base_table();
    table.add_row(header_row(&["", "before", "after"]));
    let before_values = before.stat_values();
    let after_values = after.stat_values();
    for (i, stat) in Summary::STAT_NAMES.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(stat),
            Cell::new(&fmt_opt_float(before_values[i])).style_spec("r"),
            Cell::new(&fmt_opt_float(after_values[i])).style_spec("r"),
        ]));
    }
    table
}

pub fn column_nulls_table(flags: &[(Column, bool)]) -> Table {
    let mut table = base_table();
    table.add_row(header_row(&["column", "has nulls"]));
    for (column, has_nulls) in flags {
        table.add_row(Row::new(vec![
            Cell::new(column.name()),
            Cell::new(if *has_nulls { "true" } else { "false" }),
        ]));
    }
    table
}

pub fn row_flags_table(flags: &[(usize, bool)]) -> Table {
    let mut table = base_table();
    table.add_row(header_row(&["", "any null"]));
    add_data_rows(&mut table, flags.len(), 2, |i| {
        let (label, flag) = flags[i];
        Row::new(vec![
            Cell::new(&label.to_string()).style_spec("r"),
            Cell::new(if flag { "true" } else { "false" }),
        ])
    });
    table
}

/// Value counts of a boolean series; rows with a zero count are omitted.
pub fn counts_table(false_count: usize, true_count: usize) -> Table {
    let mut table = base_table();
    table.add_row(header_row(&["", "count"]));
    for (name, count) in [("false", false_count), ("true", true_count)] {
        if count > 0 {
            table.add_row(Row::new(vec![
                Cell::new(name),
                Cell::new(&count.to_string()).style_spec("r"),
            ]));
        }
    }
    table
}

/// One described column across all `pos` groups, one row per group.
pub fn grouped_describe_table(column: Column, groups: &[GroupDescribe]) -> Table {
    let mut table = base_table();
    let mut names = vec!["pos"];
    names.extend(Summary::STAT_NAMES);
    table.add_row(header_row(&names));

    add_data_rows(&mut table, groups.len(), names.len(), |i| {
        let group = &groups[i];
        let mut cells = vec![Cell::new(&group.pos.to_string()).style_spec("r")];
        match group.summaries.iter().find(|(c, _)| *c == column) {
            Some((_, summary)) => {
                for value in summary.stat_values() {
                    cells.push(Cell::new(&fmt_opt_float(value)).style_spec("r"));
                }
            }
            None => {
                for _ in 0..Summary::STAT_NAMES.len() {
                    cells.push(Cell::new("NaN").style_spec("r"));
                }
            }
        }
        Row::new(cells)
    });
    table
}
