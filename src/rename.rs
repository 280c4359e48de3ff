use crate::config::DisplayMapping;
use crate::types::Table;
use std::collections::HashMap;
use tracing::warn;

/// Apply display names to a table's columns.
///
/// Every column is looked up once, so `a -> b` and `b -> c` do not chain.
/// Mapping entries for absent columns do nothing. A rename that would give two
/// columns the same name is reverted, so the output always has as many
/// distinct columns as the input, in the same order.
pub fn rename(table: &Table, mapping: &DisplayMapping) -> Table {
    let mut names: Vec<String> = table
        .columns
        .iter()
        .map(|c| mapping.get(c).cloned().unwrap_or_else(|| c.clone()))
        .collect();

    // Reverting only restores original (distinct) names, so this settles.
    loop {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for n in &names {
            *counts.entry(n.as_str()).or_default() += 1;
        }
        let clashing: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(i, n)| counts[n.as_str()] > 1 && **n != table.columns[*i])
            .map(|(i, _)| i)
            .collect();
        if clashing.is_empty() {
            break;
        }
        for i in clashing {
            warn!(
                column = %table.columns[i],
                target = %names[i],
                "display name already taken, keeping original"
            );
            names[i] = table.columns[i].clone();
        }
    }

    Table {
        name: table.name.clone(),
        columns: names,
        rows: table.rows.clone(),
    }
}
