use rayon::prelude::*;
use std::collections::BTreeMap;

use super::describe::Summary;
use crate::ingest::DailyTests;
use crate::table::{Column, TestsTable};

/// Rows sharing one `pos` value.
#[derive(Debug, Clone)]
pub struct PosGroup {
    pub pos: i64,
    pub rows: Vec<DailyTests>,
}

/// Group rows by positive count, ascending key order. Rows with a null
/// `pos` are dropped, the way a dataframe groupby drops null keys.
pub fn group_by_pos(table: &TestsTable) -> Vec<PosGroup> {
    let mut buckets: BTreeMap<i64, Vec<DailyTests>> = BTreeMap::new();
    for rec in table.records() {
        if let Some(pos) = rec.pos {
            buckets.entry(pos).or_default().push(rec.clone());
        }
    }
    buckets
        .into_iter()
        .map(|(pos, rows)| PosGroup { pos, rows })
        .collect()
}

/// Per-group numeric summaries of every column other than the group key.
#[derive(Debug, Clone)]
pub struct GroupDescribe {
    pub pos: i64,
    pub summaries: Vec<(Column, Summary)>,
}

pub fn describe_groups(groups: &[PosGroup], has_neg_pct: bool) -> Vec<GroupDescribe> {
    let columns: Vec<Column> = Column::numeric_columns(has_neg_pct)
        .into_iter()
        .filter(|c| *c != Column::Pos)
        .collect();

    groups
        .par_iter()
        .map(|group| {
            let summaries = columns
                .iter()
                .map(|&column| {
                    let values: Vec<Option<f64>> =
                        group.rows.iter().map(|r| column.numeric(r)).collect();
                    (column, Summary::of(&values))
                })
                .collect();
            GroupDescribe {
                pos: group.pos,
                summaries,
            }
        })
        .collect()
}
