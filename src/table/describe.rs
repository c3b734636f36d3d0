use crate::stats;
use crate::table::{Column, TestsTable};

/// Numeric summary of one nullable series: count of present values, mean,
/// sample std, min, quartiles, max.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl Summary {
    pub const STAT_NAMES: [&'static str; 8] =
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    pub fn of(values: &[Option<f64>]) -> Summary {
        let present = stats::sorted_present(values);
        Summary {
            count: present.len(),
            mean: stats::mean(&present),
            std: stats::sample_std(&present),
            min: present.first().copied(),
            q1: stats::quantile(&present, 0.25),
            median: stats::quantile(&present, 0.5),
            q3: stats::quantile(&present, 0.75),
            max: present.last().copied(),
        }
    }

    /// Values in [`Summary::STAT_NAMES`] order.
    pub fn stat_values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q1,
            self.median,
            self.q3,
            self.max,
        ]
    }
}

/// One summary per numeric column, in column order.
pub fn describe(table: &TestsTable) -> Vec<(Column, Summary)> {
    Column::numeric_columns(table.has_neg_pct())
        .into_iter()
        .map(|column| (column, Summary::of(&table.numeric_column(column))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::DailyTests;
    use chrono::NaiveDate;

    #[test]
    fn summary_matches_hand_computed_values() {
        let values: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)];
        let summary = Summary::of(&values);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, Some(2.5));
        assert!((summary.std.expect("std") - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.q1, Some(1.75));
        assert_eq!(summary.median, Some(2.5));
        assert_eq!(summary.q3, Some(3.25));
        assert_eq!(summary.max, Some(4.0));
    }

    #[test]
    fn summary_of_empty_series_is_all_null() {
        let summary = Summary::of(&[None, None]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.std, None);
        assert_eq!(summary.min, None);
        assert_eq!(summary.max, None);
    }

    #[test]
    fn describe_covers_numeric_columns_only() {
        let record = DailyTests {
            specimen_collection_date: NaiveDate::from_ymd_opt(2020, 4, 1),
            tests: Some(100),
            pos: Some(10),
            pct: Some(0.1),
            neg: Some(89),
            indeterminate: Some(1),
            neg_pct: None,
        };
        let table = TestsTable::from_records(vec![record]);
        let described = describe(&table);
        let columns: Vec<Column> = described.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            columns,
            vec![
                Column::Tests,
                Column::Pos,
                Column::Pct,
                Column::Neg,
                Column::Indeterminate
            ]
        );
        assert!(described.iter().all(|(_, s)| s.count == 1));
    }
}
