use crate::error::{PipelineError, Result};
use crate::types::{Comparison, RankedRow, Table};
use crate::util::mean;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

fn column(table: &Table, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| PipelineError::ColumnNotFound {
            table: table.name.clone(),
            column: name.to_string(),
        })
}

/// Rank rows by a numeric column, 1-based.
///
/// Rows without a number in `value` are left out. Ties keep table order.
pub fn rank_by(table: &Table, key: &str, value: &str, order: Order) -> Result<Vec<RankedRow>> {
    let k = column(table, key)?;
    let v = column(table, value)?;
    let mut rows: Vec<(String, f64)> = table
        .rows
        .iter()
        .filter_map(|r| r[v].as_f64().map(|n| (r[k].to_string(), n)))
        .collect();
    rows.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        match order {
            Order::Ascending => ord,
            Order::Descending => ord.reverse(),
        }
    });
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(idx, (key, value))| RankedRow {
            rank: idx + 1,
            key,
            value,
        })
        .collect())
}

pub fn top_n(ranked: &[RankedRow], n: usize) -> &[RankedRow] {
    &ranked[..n.min(ranked.len())]
}

/// The last `n` rows of a ranking, worst first.
pub fn bottom_n(ranked: &[RankedRow], n: usize) -> Vec<RankedRow> {
    ranked.iter().rev().take(n).cloned().collect()
}

/// Compare each row's `value` with the overall mean and with the mean of its
/// `group` (e.g. development region).
///
/// Rows lacking a number or a group are skipped and do not count towards any
/// mean.
pub fn compare_to_means(
    table: &Table,
    key: &str,
    value: &str,
    group: &str,
) -> Result<Vec<Comparison>> {
    let k = column(table, key)?;
    let v = column(table, value)?;
    let g = column(table, group)?;

    let rows: Vec<(String, String, f64)> = table
        .rows
        .iter()
        .filter_map(|r| {
            let n = r[v].as_f64()?;
            let grp = r[g].to_string();
            if grp.is_empty() {
                return None;
            }
            Some((r[k].to_string(), grp, n))
        })
        .collect();

    let national = match mean(rows.iter().map(|r| Some(r.2))) {
        Some(m) => m,
        None => return Ok(Vec::new()),
    };
    let mut by_group: HashMap<&str, (f64, usize)> = HashMap::new();
    for (_, grp, n) in &rows {
        let e = by_group.entry(grp.as_str()).or_insert((0.0, 0));
        e.0 += n;
        e.1 += 1;
    }

    Ok(rows
        .iter()
        .map(|(key, grp, n)| {
            let (sum, count) = by_group[grp.as_str()];
            let group_mean = sum / count as f64;
            Comparison {
                key: key.clone(),
                group: grp.clone(),
                value: *n,
                national_mean: national,
                group_mean,
                vs_national: n - national,
                vs_group: n - group_mean,
            }
        })
        .collect())
}
