use crate::error::{PipelineError, Result};
use crate::loader::read_table;
use crate::types::{Table, Value};
use crate::util::format_number;
use rust_xlsxwriter::{ColNum, RowNum, Workbook, XlsxError};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table as TextTable, Tabled};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Worksheet holding the summary in `.xlsx` exports.
pub const XLSX_SHEET: &str = "Indicatori_Economici";

/// Export encodings for a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated, UTF-8, header row first.
    Csv,
    /// `Csv` with a byte order mark so spreadsheet tools pick UTF-8.
    CsvExcel,
    /// Excel workbook with a single sheet; nulls are blank cells.
    Xlsx,
    /// Array of objects, keys in column order.
    Json,
    /// Markdown table for terminals.
    Markdown,
}

impl Format {
    pub fn from_extension(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(Format::Csv),
            "xlsx" => Some(Format::Xlsx),
            "json" => Some(Format::Json),
            "md" => Some(Format::Markdown),
            _ => None,
        }
    }
}

pub fn serialize(table: &Table, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Csv => to_csv(table),
        Format::CsvExcel => {
            let mut bytes = UTF8_BOM.to_vec();
            bytes.extend(to_csv(table)?);
            Ok(bytes)
        }
        Format::Xlsx => to_xlsx(table),
        Format::Json => to_json(table),
        Format::Markdown => Ok(render_markdown(table, table.len()).into_bytes()),
    }
}

/// Parse bytes produced by `serialize` with `Csv` or `CsvExcel`.
///
/// Cells are typed the way the loader types them, so the result equals the
/// serialized table when its non-key cells are numbers or nulls. A text cell
/// that reads as a number (`"012"`) or as a missing marker (`"NA"`) comes
/// back as `Number` or `Null`.
pub fn parse_csv(bytes: &[u8], name: &str, key: &str) -> Result<Table> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    read_table(body, name, key)
}

pub fn write_to(path: &Path, table: &Table, format: Format) -> Result<()> {
    let bytes = serialize(table, format)?;
    std::fs::write(path, bytes).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let csv_err = |source: csv::Error| PipelineError::Csv {
        source_name: table.name.clone(),
        source,
    };
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&table.columns).map_err(csv_err)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .map_err(csv_err)?;
    }
    wtr.into_inner().map_err(|e| PipelineError::Io {
        path: table.name.clone().into(),
        source: e.into_error(),
    })
}

fn to_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET)?;
    for (c, name) in table.columns.iter().enumerate() {
        let col = ColNum::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string(0, col, name.as_str())?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let row_num = RowNum::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (c, value) in row.iter().enumerate() {
            let col = ColNum::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
            match value {
                Value::Number(n) => {
                    sheet.write_number(row_num, col, *n)?;
                }
                Value::Text(s) => {
                    sheet.write_string(row_num, col, s.as_str())?;
                }
                Value::Null => {}
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn to_json(table: &Table) -> Result<Vec<u8>> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .zip(row)
                .map(|(col, v)| {
                    let json = match v {
                        Value::Number(n) => serde_json::Number::from_f64(*n)
                            .map(serde_json::Value::Number)
                            .unwrap_or(serde_json::Value::Null),
                        Value::Text(s) => serde_json::Value::String(s.clone()),
                        Value::Null => serde_json::Value::Null,
                    };
                    (col.clone(), json)
                })
                .collect()
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&records)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Render up to `max_rows` rows of a table as Markdown.
///
/// Numbers get two decimals and thousands separators; nulls render empty.
pub fn render_markdown(table: &Table, max_rows: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().cloned());
    for row in table.rows.iter().take(max_rows) {
        builder.push_record(row.iter().map(|v| match v {
            Value::Number(n) => format_number(*n, 2),
            other => other.to_string(),
        }));
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_table(table: &Table, max_rows: usize) {
    if table.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_markdown(table, max_rows));
    if table.len() > max_rows {
        println!("({} of {} rows shown)\n", max_rows, table.len());
    }
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = TextTable::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
