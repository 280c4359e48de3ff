use crate::config::CollisionPolicy;
use crate::error::{PipelineError, Result};
use crate::types::{Table, Value};
use std::collections::HashMap;
use tracing::debug;

fn key_index(table: &Table, key: &str) -> Result<usize> {
    table
        .column_index(key)
        .ok_or_else(|| PipelineError::KeyColumnMissing {
            table: table.name.clone(),
            column: key.to_string(),
        })
}

/// Left-join every table in `others` onto `base`, in the order given.
///
/// The result has exactly the base table's rows, in the base table's order.
/// Keys missing from another table leave that table's columns null; keys
/// only present in another table are dropped.
pub fn join_all(
    base: &Table,
    others: &[Table],
    key: &str,
    collisions: CollisionPolicy,
) -> Result<Table> {
    key_index(base, key)?;
    let mut result = base.clone();
    for other in others {
        result = left_join(&result, other, key, collisions)?;
    }
    Ok(result)
}

/// Left-join one table onto another by equality of the key column.
///
/// `right` must hold each key at most once; a repeated key is an error rather
/// than a row multiplication.
pub fn left_join(
    left: &Table,
    right: &Table,
    key: &str,
    collisions: CollisionPolicy,
) -> Result<Table> {
    let lk = key_index(left, key)?;
    let rk = key_index(right, key)?;

    let mut index: HashMap<String, usize> = HashMap::with_capacity(right.len());
    for (pos, row) in right.rows.iter().enumerate() {
        let k = row[rk].to_string();
        if index.insert(k.clone(), pos).is_some() {
            return Err(PipelineError::DuplicateKey {
                table: right.name.clone(),
                key: k,
            });
        }
    }

    let mut columns = left.columns.clone();
    let mut incoming: Vec<usize> = Vec::with_capacity(right.columns.len());
    for (idx, name) in right.columns.iter().enumerate() {
        if idx == rk {
            continue;
        }
        let resolved = if columns.contains(name) {
            let collision = || PipelineError::ColumnCollision {
                column: name.clone(),
                left: left.name.clone(),
                right: right.name.clone(),
            };
            match collisions {
                CollisionPolicy::Error => return Err(collision()),
                CollisionPolicy::Suffix => {
                    let suffixed = format!("{}_{}", name, right.name);
                    if columns.contains(&suffixed) {
                        return Err(collision());
                    }
                    debug!(column = %name, renamed = %suffixed, "resolved column collision");
                    suffixed
                }
            }
        } else {
            name.clone()
        };
        columns.push(resolved);
        incoming.push(idx);
    }

    let mut out = Table::new(left.name.clone(), columns);
    let mut matched = 0usize;
    for row in &left.rows {
        let hit = index.get(&row[lk].to_string()).map(|&pos| &right.rows[pos]);
        if hit.is_some() {
            matched += 1;
        }
        let mut joined = row.clone();
        joined.extend(
            incoming
                .iter()
                .map(|&idx| hit.map(|r| r[idx].clone()).unwrap_or(Value::Null)),
        );
        out.push_row(joined);
    }
    debug!(
        left = %left.name,
        right = %right.name,
        rows = out.len(),
        matched,
        "joined"
    );
    Ok(out)
}
