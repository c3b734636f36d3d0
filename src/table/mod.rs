pub mod describe;
pub mod group;

use chrono::NaiveDate;
use std::{cmp::Ordering, collections::HashSet, mem};

use crate::ingest::DailyTests;

/// The dataset columns, in portal order, plus the in-process `neg_pct`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    SpecimenCollectionDate,
    Tests,
    Pos,
    Pct,
    Neg,
    Indeterminate,
    NegPct,
}

impl Column {
    pub const fn name(self) -> &'static str {
        match self {
            Column::SpecimenCollectionDate => "specimen_collection_date",
            Column::Tests => "tests",
            Column::Pos => "pos",
            Column::Pct => "pct",
            Column::Neg => "neg",
            Column::Indeterminate => "indeterminate",
            Column::NegPct => "neg_pct",
        }
    }

    pub const fn dtype(self) -> &'static str {
        match self {
            Column::SpecimenCollectionDate => "date",
            Column::Tests | Column::Pos | Column::Neg | Column::Indeterminate => "int64",
            Column::Pct | Column::NegPct => "float64",
        }
    }

    /// All columns in dataset order; `neg_pct` only once derived.
    pub fn all(has_neg_pct: bool) -> Vec<Column> {
        let mut columns = vec![
            Column::SpecimenCollectionDate,
            Column::Tests,
            Column::Pos,
            Column::Pct,
            Column::Neg,
            Column::Indeterminate,
        ];
        if has_neg_pct {
            columns.push(Column::NegPct);
        }
        columns
    }

    pub fn numeric_columns(has_neg_pct: bool) -> Vec<Column> {
        Column::all(has_neg_pct)
            .into_iter()
            .filter(|c| *c != Column::SpecimenCollectionDate)
            .collect()
    }

    pub fn is_null(self, rec: &DailyTests) -> bool {
        match self {
            Column::SpecimenCollectionDate => rec.specimen_collection_date.is_none(),
            Column::Tests => rec.tests.is_none(),
            Column::Pos => rec.pos.is_none(),
            Column::Pct => rec.pct.is_none(),
            Column::Neg => rec.neg.is_none(),
            Column::Indeterminate => rec.indeterminate.is_none(),
            Column::NegPct => rec.neg_pct.is_none(),
        }
    }

    /// Numeric view of a cell. The date column has no numeric view.
    pub fn numeric(self, rec: &DailyTests) -> Option<f64> {
        match self {
            Column::SpecimenCollectionDate => None,
            Column::Tests => rec.tests.map(|v| v as f64),
            Column::Pos => rec.pos.map(|v| v as f64),
            Column::Pct => rec.pct,
            Column::Neg => rec.neg.map(|v| v as f64),
            Column::Indeterminate => rec.indeterminate.map(|v| v as f64),
            Column::NegPct => rec.neg_pct,
        }
    }

    fn elem_bytes(self) -> usize {
        match self {
            Column::SpecimenCollectionDate => mem::size_of::<Option<NaiveDate>>(),
            Column::Tests | Column::Pos | Column::Neg | Column::Indeterminate => {
                mem::size_of::<Option<i64>>()
            }
            Column::Pct | Column::NegPct => mem::size_of::<Option<f64>>(),
        }
    }
}

/// Per-column entry of the info section.
#[derive(Debug, Clone, Copy)]
pub struct ColumnInfo {
    pub column: Column,
    pub dtype: &'static str,
    pub non_null: usize,
    pub bytes: usize,
}

/// The in-memory table: records plus dataframe-style row labels.
///
/// Labels start at 0..n, follow their rows through sorts and filters, and
/// are reassigned by [`TestsTable::reset_index`].
#[derive(Debug, Clone)]
pub struct TestsTable {
    labels: Vec<usize>,
    records: Vec<DailyTests>,
    has_neg_pct: bool,
}

impl TestsTable {
    pub fn from_records(records: Vec<DailyTests>) -> Self {
        let labels = (0..records.len()).collect();
        TestsTable {
            labels,
            records,
            has_neg_pct: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_neg_pct(&self) -> bool {
        self.has_neg_pct
    }

    /// (rows, columns). The column count grows by one once `neg_pct` exists.
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), Column::all(self.has_neg_pct).len())
    }

    pub fn columns(&self) -> Vec<Column> {
        Column::all(self.has_neg_pct)
    }

    pub fn records(&self) -> &[DailyTests] {
        &self.records
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, &DailyTests)> {
        self.labels.iter().copied().zip(self.records.iter())
    }

    pub fn head(&self, n: usize) -> Vec<(usize, &DailyTests)> {
        self.rows().take(n).collect()
    }

    pub fn tail(&self, n: usize) -> Vec<(usize, &DailyTests)> {
        let skip = self.records.len().saturating_sub(n);
        self.rows().skip(skip).collect()
    }

    /// New table holding the rows the predicate keeps, labels preserved.
    pub fn filter<F>(&self, pred: F) -> TestsTable
    where
        F: Fn(&DailyTests) -> bool,
    {
        let mut labels = Vec::new();
        let mut records = Vec::new();
        for (label, rec) in self.rows() {
            if pred(rec) {
                labels.push(label);
                records.push(rec.clone());
            }
        }
        TestsTable {
            labels,
            records,
            has_neg_pct: self.has_neg_pct,
        }
    }

    /// Stable sort on a numeric column. Nulls sort last regardless of
    /// direction.
    pub fn sort_by(&mut self, column: Column, ascending: bool) {
        let labels = mem::take(&mut self.labels);
        let records = mem::take(&mut self.records);
        let mut rows: Vec<(usize, DailyTests)> = labels.into_iter().zip(records).collect();

        rows.sort_by(|a, b| match (column.numeric(&a.1), column.numeric(&b.1)) {
            (Some(x), Some(y)) => {
                let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        for (label, rec) in rows {
            self.labels.push(label);
            self.records.push(rec);
        }
    }

    /// Reassign labels 0..n in current row order.
    pub fn reset_index(&mut self) {
        self.labels = (0..self.records.len()).collect();
    }

    pub fn info(&self) -> Vec<ColumnInfo> {
        let rows = self.records.len();
        self.columns()
            .into_iter()
            .map(|column| ColumnInfo {
                column,
                dtype: column.dtype(),
                non_null: self.records.iter().filter(|r| !column.is_null(r)).count(),
                bytes: rows * column.elem_bytes(),
            })
            .collect()
    }

    /// Per-column any-null flags, in column order.
    pub fn column_has_nulls(&self) -> Vec<(Column, bool)> {
        self.columns()
            .into_iter()
            .map(|c| (c, self.records.iter().any(|r| c.is_null(r))))
            .collect()
    }

    /// Per-row any-null flags, labelled, in current row order.
    pub fn row_null_flags(&self) -> Vec<(usize, bool)> {
        let columns = self.columns();
        self.rows()
            .map(|(label, rec)| (label, columns.iter().any(|c| c.is_null(rec))))
            .collect()
    }

    /// Flags marking second and later occurrences of an identical full row.
    pub fn duplicated(&self) -> Vec<bool> {
        let mut seen = HashSet::new();
        self.records.iter().map(|r| !seen.insert(row_key(r))).collect()
    }

    /// The column as nullable floats, in current row order.
    pub fn numeric_column(&self, column: Column) -> Vec<Option<f64>> {
        self.records.iter().map(|r| column.numeric(r)).collect()
    }

    /// The column as nullable floats, in ascending-label order. Used where
    /// a series must ignore whatever sort the table is currently under.
    pub fn numeric_column_by_label(&self, column: Column) -> Vec<Option<f64>> {
        let mut pairs: Vec<(usize, Option<f64>)> = self
            .labels
            .iter()
            .copied()
            .zip(self.records.iter().map(|r| column.numeric(r)))
            .collect();
        pairs.sort_by_key(|(label, _)| *label);
        pairs.into_iter().map(|(_, v)| v).collect()
    }

    /// Add the negative-share column: neg/tests, null when either side is
    /// null or `tests` is zero.
    pub fn derive_neg_pct(&mut self) {
        for rec in &mut self.records {
            rec.neg_pct = match (rec.neg, rec.tests) {
                (Some(neg), Some(tests)) if tests != 0 => Some(neg as f64 / tests as f64),
                _ => None,
            };
        }
        self.has_neg_pct = true;
    }
}

/// Count false/true flags.
pub fn bool_counts<I: IntoIterator<Item = bool>>(flags: I) -> (usize, usize) {
    let mut counts = (0, 0);
    for flag in flags {
        if flag {
            counts.1 += 1;
        } else {
            counts.0 += 1;
        }
    }
    counts
}

type RowKey = (
    Option<NaiveDate>,
    Option<i64>,
    Option<i64>,
    Option<u64>,
    Option<i64>,
    Option<i64>,
    Option<u64>,
);

// Bit-exact float keys so identical rows hash identically.
fn row_key(rec: &DailyTests) -> RowKey {
    (
        rec.specimen_collection_date,
        rec.tests,
        rec.pos,
        rec.pct.map(f64::to_bits),
        rec.neg,
        rec.indeterminate,
        rec.neg_pct.map(f64::to_bits),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2020, 4, d)
    }

    fn rec(d: u32, tests: i64, pos: i64, pct: f64, neg: i64, indeterminate: i64) -> DailyTests {
        DailyTests {
            specimen_collection_date: day(d),
            tests: Some(tests),
            pos: Some(pos),
            pct: Some(pct),
            neg: Some(neg),
            indeterminate: Some(indeterminate),
            neg_pct: None,
        }
    }

    fn sample() -> TestsTable {
        let mut with_null_pct = rec(3, 80, 8, 0.0, 71, 1);
        with_null_pct.pct = None;
        TestsTable::from_records(vec![
            rec(1, 100, 10, 0.10, 89, 1),
            rec(2, 200, 30, 0.15, 168, 2),
            with_null_pct,
            rec(4, 400, 20, 0.05, 376, 4),
        ])
    }

    #[test]
    fn shape_grows_with_derived_column() {
        let mut table = sample();
        assert_eq!(table.shape(), (4, 6));
        table.derive_neg_pct();
        assert_eq!(table.shape(), (4, 7));
        assert_eq!(table.records()[0].neg_pct, Some(0.89));
    }

    #[test]
    fn derive_neg_pct_handles_zero_and_null_tests() {
        let mut zero = rec(1, 0, 0, 0.0, 0, 0);
        zero.tests = Some(0);
        let mut null_tests = rec(2, 1, 1, 1.0, 0, 0);
        null_tests.tests = None;
        let mut table = TestsTable::from_records(vec![zero, null_tests]);
        table.derive_neg_pct();
        assert_eq!(table.records()[0].neg_pct, None);
        assert_eq!(table.records()[1].neg_pct, None);
    }

    #[test]
    fn sort_desc_puts_nulls_last_and_keeps_labels() {
        let mut table = sample();
        table.sort_by(Column::Pct, false);
        let labels: Vec<usize> = table.rows().map(|(label, _)| label).collect();
        assert_eq!(labels, vec![1, 0, 3, 2]);
        assert_eq!(table.records()[3].pct, None);

        table.sort_by(Column::Pct, true);
        let labels: Vec<usize> = table.rows().map(|(label, _)| label).collect();
        assert_eq!(labels, vec![3, 0, 1, 2]);
    }

    #[test]
    fn filter_keeps_labels() {
        let table = sample();
        let filtered = table.filter(|r| r.tests.map_or(false, |t| t > 150));
        let labels: Vec<usize> = filtered.rows().map(|(label, _)| label).collect();
        assert_eq!(labels, vec![1, 3]);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn reset_index_relabels_in_row_order() {
        let mut table = sample();
        table.sort_by(Column::Pct, false);
        table.reset_index();
        let labels: Vec<usize> = table.rows().map(|(label, _)| label).collect();
        assert_eq!(labels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn numeric_column_by_label_ignores_sort() {
        let mut table = sample();
        table.sort_by(Column::Pct, false);
        let by_label = table.numeric_column_by_label(Column::Tests);
        assert_eq!(
            by_label,
            vec![Some(100.0), Some(200.0), Some(80.0), Some(400.0)]
        );
    }

    #[test]
    fn duplicated_marks_second_occurrence() {
        let mut records = vec![rec(1, 100, 10, 0.10, 89, 1), rec(2, 200, 30, 0.15, 168, 2)];
        records.push(records[0].clone());
        let table = TestsTable::from_records(records);
        assert_eq!(table.duplicated(), vec![false, false, true]);

        let (unique, dup) = bool_counts(table.duplicated());
        assert_eq!((unique, dup), (2, 1));
    }

    #[test]
    fn null_flags_per_column_and_row() {
        let table = sample();
        let by_column = table.column_has_nulls();
        assert!(by_column
            .iter()
            .all(|(c, has)| (*c == Column::Pct) == *has));

        let by_row = table.row_null_flags();
        assert_eq!(by_row[2], (2, true));
        let (clean, with_nulls) = bool_counts(by_row.into_iter().map(|(_, f)| f));
        assert_eq!((clean, with_nulls), (3, 1));
    }

    #[test]
    fn info_counts_non_nulls() {
        let table = sample();
        let info = table.info();
        assert_eq!(info.len(), 6);
        let pct = info
            .iter()
            .find(|i| i.column == Column::Pct)
            .expect("pct info");
        assert_eq!(pct.non_null, 3);
        assert_eq!(pct.dtype, "float64");
        assert!(pct.bytes > 0);
    }

    #[test]
    fn head_and_tail_are_labelled_views() {
        let table = sample();
        let head = table.head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head[0].0, 0);
        let tail = table.tail(2);
        assert_eq!(tail[0].0, 2);
        assert_eq!(tail[1].0, 3);
    }
}
