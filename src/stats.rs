use crate::types::{ColumnStats, PipelineOutput, SummaryReport, SummaryStats, Table};
use crate::util::mean;

/// Per-column totals for every numeric column except the key.
///
/// A column counts as numeric when it holds at least one number.
pub fn summarize(table: &Table, key: &str) -> SummaryStats {
    let columns = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_str() != key)
        .filter_map(|(idx, name)| {
            let values: Vec<f64> = table.column_values(idx).filter_map(|v| v.as_f64()).collect();
            if values.is_empty() {
                return None;
            }
            Some(ColumnStats {
                column: name.clone(),
                non_null: values.len(),
                sum: values.iter().sum(),
                mean: mean(values.iter().copied().map(Some)),
                min: values.iter().copied().reduce(f64::min),
                max: values.iter().copied().reduce(f64::max),
            })
        })
        .collect();
    SummaryStats {
        total_counties: table.len(),
        columns,
    }
}

pub fn build_report(output: &PipelineOutput, key: &str) -> SummaryReport {
    SummaryReport {
        generated_at: chrono::Utc::now(),
        joined_sources: output.joined_sources.clone(),
        dropped_sources: output.warnings.clone(),
        stats: summarize(&output.summary, key),
    }
}

impl SummaryStats {
    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.column == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn totals_skip_nulls_and_text() {
        let table = Table::from_rows(
            "s",
            &["Judet", "Pop", "Empty"],
            vec![
                vec!["Cluj".into(), Value::Number(100.0), Value::Null],
                vec!["Iasi".into(), Value::Number(50.0), Value::Null],
                vec!["Arad".into(), Value::Null, Value::Null],
            ],
        );
        let stats = summarize(&table, "Judet");
        assert_eq!(stats.total_counties, 3);
        assert_eq!(stats.columns.len(), 1);
        let pop = stats.column("Pop").unwrap();
        assert_eq!(pop.non_null, 2);
        assert_eq!(pop.sum, 150.0);
        assert_eq!(pop.mean, Some(75.0));
        assert_eq!(pop.min, Some(50.0));
        assert_eq!(pop.max, Some(100.0));
    }
}
