use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `f64` Display never uses exponent notation and prints the
            // shortest digits that parse back to the same value.
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Null => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map(Value::Number).unwrap_or(Value::Null)
    }
}

/// A named table with unique column names and rows of equal width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string column names and rows, mostly for fixtures.
    pub fn from_rows<S: AsRef<str>>(name: &str, columns: &[S], rows: Vec<Vec<Value>>) -> Self {
        let mut table = Table::new(name, columns.iter().map(|c| c.as_ref().to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row, padding with nulls or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Cells of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |r| &r[idx])
    }
}

/// A source that was left out of the summary, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceWarning {
    pub source: String,
    pub reason: String,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub summary: Table,
    /// Sources that made it into the join, base first.
    pub joined_sources: Vec<String>,
    pub warnings: Vec<SourceWarning>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RankedRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Judet")]
    #[tabled(rename = "Judet")]
    pub key: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct Comparison {
    #[serde(rename = "Judet")]
    #[tabled(rename = "Judet")]
    pub key: String,
    #[serde(rename = "Regiune")]
    #[tabled(rename = "Regiune")]
    pub group: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: f64,
    #[serde(rename = "NationalMean")]
    #[tabled(rename = "NationalMean")]
    pub national_mean: f64,
    #[serde(rename = "GroupMean")]
    #[tabled(rename = "GroupMean")]
    pub group_mean: f64,
    #[serde(rename = "VsNational")]
    #[tabled(rename = "VsNational")]
    pub vs_national: f64,
    #[serde(rename = "VsGroup")]
    #[tabled(rename = "VsGroup")]
    pub vs_group: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub non_null: usize,
    pub sum: f64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_counties: usize,
    pub columns: Vec<ColumnStats>,
}

/// What gets written to `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub joined_sources: Vec<String>,
    pub dropped_sources: Vec<SourceWarning>,
    pub stats: SummaryStats,
}
