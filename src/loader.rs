use crate::config::SourceSpec;
use crate::error::{PipelineError, Result};
use crate::types::{Table, Value};
use crate::util::{clean_cell, is_missing_marker, parse_number};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use tracing::debug;

/// Load one configured source file.
///
/// A file that cannot be opened is reported as `SourceUnavailable`; the
/// caller decides whether that is fatal.
pub fn load(source: &SourceSpec, key: &str) -> Result<Table> {
    let file = File::open(&source.path).map_err(|e| PipelineError::SourceUnavailable {
        source_name: source.name.clone(),
        path: source.path.clone(),
        reason: e.to_string(),
    })?;
    let table = read_table(file, &source.name, key)?;
    debug!(
        source = %source.name,
        rows = table.len(),
        columns = table.columns.len(),
        "loaded source"
    );
    Ok(table)
}

/// Parse delimited text into a `Table`.
///
/// Header cells lose a BOM and surrounding whitespace; an empty header cell at
/// position `i` becomes `Unnamed: i`, and a repeated name gets a `.n` suffix.
/// Key cells are always text. Other cells are `Null` when empty or a
/// missing-value marker such as `NA` or `NaN`, `Number` when they parse as a
/// finite float, `Text` otherwise.
pub fn read_table<R: Read>(reader: R, name: &str, key: &str) -> Result<Table> {
    let csv_err = |source: csv::Error| PipelineError::Csv {
        source_name: name.to_string(),
        source,
    };
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut columns: Vec<String> = Vec::new();
    for (pos, raw) in rdr.headers().map_err(csv_err)?.iter().enumerate() {
        let cleaned = clean_cell(raw);
        let mut header = if cleaned.is_empty() {
            format!("Unnamed: {}", pos)
        } else {
            cleaned.to_string()
        };
        let mut dup = 1;
        while columns.contains(&header) {
            header = format!("{}.{}", cleaned, dup);
            dup += 1;
        }
        columns.push(header);
    }

    let key_idx = columns
        .iter()
        .position(|c| c == key)
        .ok_or_else(|| PipelineError::MissingKeyColumn {
            table: name.to_string(),
            column: key.to_string(),
        })?;

    let mut table = Table::new(name, columns);
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row: Vec<Value> = (0..table.columns.len())
            .map(|idx| {
                let raw = record.get(idx).unwrap_or("");
                if idx == key_idx {
                    Value::Text(raw.trim_start_matches('\u{feff}').to_string())
                } else {
                    let cell = clean_cell(raw);
                    if cell.is_empty() || is_missing_marker(cell) {
                        Value::Null
                    } else {
                        match parse_number(cell) {
                            Some(n) => Value::Number(n),
                            None => Value::Text(cell.to_string()),
                        }
                    }
                }
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}
