//! Command-line interface argument parsing.

use crate::output::Format;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// County summary report
///
/// Joins the per-county indicator files into one summary table and exports it.
/// Without --export an interactive menu is shown.
///
/// Examples:
///   county_report
///   county_report --config county_report.toml --export rezumat.csv
///   county_report --export rezumat.json --format json
///   county_report --export rezumat.xlsx
///   county_report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, uses county_report.toml in the current directory when present
    #[arg(short, long, value_name = "FILE", env = "COUNTY_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Build the summary once, write it to FILE and exit
    #[arg(short, long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Export format; guessed from the --export extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Also write summary statistics (JSON) in one-shot mode
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write a default county_report.toml and exit
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    /// CSV with a UTF-8 byte order mark, for spreadsheet tools
    ExcelCsv,
    Xlsx,
    Json,
    Md,
}

impl From<ExportFormat> for Format {
    fn from(f: ExportFormat) -> Self {
        match f {
            ExportFormat::Csv => Format::Csv,
            ExportFormat::ExcelCsv => Format::CsvExcel,
            ExportFormat::Xlsx => Format::Xlsx,
            ExportFormat::Json => Format::Json,
            ExportFormat::Md => Format::Markdown,
        }
    }
}

impl Args {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Format for one-shot export: explicit flag, then file extension, then CSV.
    pub fn export_format(&self) -> Format {
        self.format
            .map(Format::from)
            .or_else(|| self.export.as_deref().and_then(Format::from_extension))
            .unwrap_or(Format::Csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels() {
        let args = Args::parse_from(["county_report"]);
        assert_eq!(args.log_level(), tracing::Level::INFO);
        let args = Args::parse_from(["county_report", "-v"]);
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
        let args = Args::parse_from(["county_report", "-q"]);
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn export_format_resolution() {
        let args = Args::parse_from(["county_report", "--export", "out.json"]);
        assert_eq!(args.export_format(), Format::Json);
        let args = Args::parse_from(["county_report", "-e", "out.json", "-f", "excel-csv"]);
        assert_eq!(args.export_format(), Format::CsvExcel);
        let args = Args::parse_from(["county_report", "-e", "rezumat.xlsx"]);
        assert_eq!(args.export_format(), Format::Xlsx);
        let args = Args::parse_from(["county_report", "-e", "out.txt"]);
        assert_eq!(args.export_format(), Format::Csv);
    }
}
