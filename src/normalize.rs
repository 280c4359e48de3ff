use crate::config::{KeyMatch, NonNumericPolicy, NormalizeOptions};
use crate::error::{PipelineError, Result};
use crate::types::{Table, Value};
use crate::util::mean;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Canonical form of a county name.
///
/// Trims, collapses runs of whitespace to one space and folds the legacy
/// cedilla letters to the comma-below letters of official Romanian spelling,
/// so `"Constanţa "` and `"Constanța"` group together. Case is kept.
pub fn canonical_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, word) in raw.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(word.chars().map(|c| match c {
            'ş' => 'ș',
            'ţ' => 'ț',
            'Ş' => 'Ș',
            'Ţ' => 'Ț',
            other => other,
        }));
    }
    out
}

fn match_key(raw: &str, mode: KeyMatch) -> String {
    match mode {
        KeyMatch::Exact => raw.to_string(),
        KeyMatch::Canonical => canonical_key(raw),
    }
}

/// Reduce a table to one row per key, averaging numeric columns.
///
/// The index column is dropped first. Rows with an empty key are skipped.
/// Output rows are ordered by key. A column holding any text cell is either
/// an error or dropped, depending on `opts.non_numeric`.
pub fn normalize(table: &Table, key: &str, opts: &NormalizeOptions) -> Result<Table> {
    let key_idx = table
        .column_index(key)
        .ok_or_else(|| PipelineError::MissingKeyColumn {
            table: table.name.clone(),
            column: key.to_string(),
        })?;

    // Columns that survive, as indices into the input.
    let mut keep: Vec<usize> = Vec::with_capacity(table.columns.len());
    for (idx, name) in table.columns.iter().enumerate() {
        if idx == key_idx {
            keep.push(idx);
            continue;
        }
        if *name == opts.index_column {
            debug!(table = %table.name, column = %name, "dropping index column");
            continue;
        }
        let has_text = table
            .column_values(idx)
            .any(|v| matches!(v, Value::Text(_)));
        if has_text {
            match opts.non_numeric {
                NonNumericPolicy::Error => {
                    return Err(PipelineError::NonNumericAggregation {
                        table: table.name.clone(),
                        column: name.clone(),
                    })
                }
                NonNumericPolicy::Drop => {
                    warn!(table = %table.name, column = %name, "dropping non-numeric column");
                    continue;
                }
            }
        }
        keep.push(idx);
    }

    let mut groups: BTreeMap<String, Vec<&Vec<Value>>> = BTreeMap::new();
    let mut empty_keys = 0usize;
    for row in &table.rows {
        let k = match_key(&row[key_idx].to_string(), opts.key_match);
        if k.trim().is_empty() {
            empty_keys += 1;
            continue;
        }
        groups.entry(k).or_default().push(row);
    }
    if empty_keys > 0 {
        debug!(table = %table.name, rows = empty_keys, "skipped rows without a key");
    }

    let columns = keep.iter().map(|&i| table.columns[i].clone()).collect();
    let mut out = Table::new(table.name.clone(), columns);
    for (k, rows) in &groups {
        let row: Vec<Value> = keep
            .iter()
            .map(|&idx| {
                if idx == key_idx {
                    Value::Text(k.clone())
                } else {
                    mean(rows.iter().map(|r| r[idx].as_f64())).into()
                }
            })
            .collect();
        out.push_row(row);
    }
    debug!(
        table = %table.name,
        rows_in = table.len(),
        rows_out = out.len(),
        "normalized"
    );
    Ok(out)
}

/// Keep the first row seen for each key, without aggregation.
///
/// Meant for lookup tables such as county -> region, where columns are text.
/// The index column is dropped and keys are matched as in `normalize`.
pub fn first_per_key(table: &Table, key: &str, opts: &NormalizeOptions) -> Result<Table> {
    let key_idx = table
        .column_index(key)
        .ok_or_else(|| PipelineError::MissingKeyColumn {
            table: table.name.clone(),
            column: key.to_string(),
        })?;
    let keep: Vec<usize> = (0..table.columns.len())
        .filter(|&i| i == key_idx || table.columns[i] != opts.index_column)
        .collect();

    let columns = keep.iter().map(|&i| table.columns[i].clone()).collect();
    let mut out = Table::new(table.name.clone(), columns);
    let mut seen = HashSet::new();
    for row in &table.rows {
        let k = match_key(&row[key_idx].to_string(), opts.key_match);
        if k.trim().is_empty() || !seen.insert(k.clone()) {
            continue;
        }
        out.push_row(
            keep.iter()
                .map(|&i| if i == key_idx { Value::Text(k.clone()) } else { row[i].clone() })
                .collect(),
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str, cols: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(name, cols, rows)
    }

    #[test]
    fn averages_repeated_keys() {
        let table = t(
            "firme",
            &["Judet", "Firme"],
            vec![
                vec!["Cluj".into(), Value::Number(10.0)],
                vec!["Cluj".into(), Value::Number(20.0)],
                vec!["Cluj".into(), Value::Number(30.0)],
                vec!["Alba".into(), Value::Number(5.0)],
            ],
        );
        let out = normalize(&table, "Judet", &NormalizeOptions::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows[0], vec![Value::from("Alba"), Value::Number(5.0)]);
        assert_eq!(out.rows[1], vec![Value::from("Cluj"), Value::Number(20.0)]);
    }

    #[test]
    fn nulls_are_skipped_in_mean() {
        let table = t(
            "somaj",
            &["Judet", "Rata"],
            vec![
                vec!["Iasi".into(), Value::Number(4.0)],
                vec!["Iasi".into(), Value::Null],
                vec!["Arad".into(), Value::Null],
            ],
        );
        let out = normalize(&table, "Judet", &NormalizeOptions::default()).unwrap();
        assert_eq!(out.get(0, "Rata"), Some(&Value::Null));
        assert_eq!(out.get(1, "Rata"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn drops_index_column() {
        let table = t(
            "p",
            &["Unnamed: 0", "Judet", "Pop"],
            vec![vec![Value::Number(0.0), "Cluj".into(), Value::Number(1.0)]],
        );
        let out = normalize(&table, "Judet", &NormalizeOptions::default()).unwrap();
        assert_eq!(out.columns, vec!["Judet", "Pop"]);
    }

    #[test]
    fn text_column_errors_or_drops() {
        let table = t(
            "p",
            &["Judet", "Note", "Pop"],
            vec![vec!["Cluj".into(), "x".into(), Value::Number(1.0)]],
        );
        let err = normalize(&table, "Judet", &NormalizeOptions::default()).unwrap_err();
        assert!(
            matches!(err, PipelineError::NonNumericAggregation { ref column, .. } if column == "Note")
        );

        let opts = NormalizeOptions {
            non_numeric: NonNumericPolicy::Drop,
            ..NormalizeOptions::default()
        };
        let out = normalize(&table, "Judet", &opts).unwrap();
        assert_eq!(out.columns, vec!["Judet", "Pop"]);
    }

    #[test]
    fn missing_key_column() {
        let table = t("p", &["County"], vec![]);
        let err = normalize(&table, "Judet", &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingKeyColumn { .. }));
    }

    #[test]
    fn canonical_keys_merge_spelling_variants() {
        assert_eq!(canonical_key("  Constanţa "), "Constanța");
        assert_eq!(canonical_key("Satu   Mare"), "Satu Mare");
        assert_eq!(canonical_key("cluj"), "cluj");

        let table = t(
            "p",
            &["Judet", "Pop"],
            vec![
                vec!["Constanţa".into(), Value::Number(1.0)],
                vec!["Constanța ".into(), Value::Number(3.0)],
            ],
        );
        let out = normalize(&table, "Judet", &NormalizeOptions::default()).unwrap();
        assert_eq!(out.len(), 1);

        let exact = NormalizeOptions {
            key_match: KeyMatch::Exact,
            ..NormalizeOptions::default()
        };
        assert_eq!(normalize(&table, "Judet", &exact).unwrap().len(), 2);
    }

    #[test]
    fn empty_keys_are_dropped() {
        let table = t(
            "p",
            &["Judet", "Pop"],
            vec![vec!["".into(), Value::Number(1.0)], vec!["Cluj".into(), Value::Number(2.0)]],
        );
        let out = normalize(&table, "Judet", &NormalizeOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn first_per_key_keeps_text_and_first_row() {
        let table = t(
            "regiuni",
            &["Unnamed: 0", "Judet", "Regiune"],
            vec![
                vec![Value::Number(0.0), "Cluj".into(), "Nord-Vest".into()],
                vec![Value::Number(1.0), "Cluj ".into(), "Centru".into()],
                vec![Value::Number(2.0), "Iasi".into(), "Nord-Est".into()],
            ],
        );
        let out = first_per_key(&table, "Judet", &NormalizeOptions::default()).unwrap();
        assert_eq!(out.columns, vec!["Judet", "Regiune"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out.get(0, "Regiune"), Some(&Value::from("Nord-Vest")));
    }
}
