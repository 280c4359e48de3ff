//! Configuration file handling.
//!
//! Sources, key column, display names and the stage policies are read from a
//! TOML file (`county_report.toml` by default). Every field has a default that
//! reproduces the original six-source county table.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "county_report.toml";

/// Raw column name to display name.
pub type DisplayMapping = BTreeMap<String, String>;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Column every source is keyed and joined on.
    #[serde(default = "default_key_column")]
    pub key_column: String,

    /// Source the others are joined onto. Defaults to the first source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSpec>,

    #[serde(default)]
    pub normalize: NormalizeOptions,

    #[serde(default)]
    pub join: JoinOptions,

    #[serde(default = "default_display_names")]
    pub display_names: DisplayMapping,

    #[serde(default)]
    pub score: ScoreConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// One input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub path: PathBuf,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// How key cells are compared when grouping and joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMatch {
    /// Byte-for-byte equality.
    Exact,
    /// Trimmed, whitespace-collapsed, cedilla letters folded to comma-below.
    #[default]
    Canonical,
}

/// What to do with a text column during mean aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonNumericPolicy {
    #[default]
    Error,
    Drop,
}

/// How to resolve two joined tables sharing a non-key column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Rename the incoming column to `<column>_<table>`.
    #[default]
    Suffix,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Auto-generated index column dropped before aggregation.
    #[serde(default = "default_index_column")]
    pub index_column: String,

    #[serde(default)]
    pub key_match: KeyMatch,

    #[serde(default)]
    pub non_numeric: NonNumericPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            index_column: default_index_column(),
            key_match: KeyMatch::default(),
            non_numeric: NonNumericPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinOptions {
    #[serde(default)]
    pub collisions: CollisionPolicy,
}

/// The pre-computed potential score and its regional lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    #[serde(default = "default_score_path")]
    pub path: PathBuf,

    #[serde(default = "default_score_column")]
    pub column: String,

    /// Optional file mapping each county to its region.
    #[serde(
        default = "default_regions_path",
        skip_serializing_if = "Option::is_none"
    )]
    pub regions: Option<PathBuf>,

    #[serde(default = "default_region_column")]
    pub region_column: String,

    /// Rows shown in the top/bottom listings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            path: default_score_path(),
            column: default_score_column(),
            regions: default_regions_path(),
            region_column: default_region_column(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_export_path")]
    pub export: PathBuf,

    #[serde(default = "default_stats_path")]
    pub stats: PathBuf,

    /// Rows printed in terminal previews.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export: default_export_path(),
            stats: default_stats_path(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_key_column() -> String {
    "Judet".to_string()
}

fn default_index_column() -> String {
    "Unnamed: 0".to_string()
}

fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new("populatie", "baze/populatie_2024.csv"),
        SourceSpec::new("pop_activa", "baze/populatia_activa_2023.csv"),
        SourceSpec::new("firme", "baze/numar_firme2023.csv"),
        SourceSpec::new("firme_1000", "baze/trenduri.csv"),
        SourceSpec::new("somaj", "baze/rata_somaj_2023.csv"),
        SourceSpec::new("salarii", "baze/salariul_mediu2023.csv"),
    ]
}

fn default_display_names() -> DisplayMapping {
    [
        ("Populatie", "Populație 2024"),
        ("Populatie_2024", "Populație 2024"),
        ("Pop_Activa_2023", "Populație Activă 2023"),
        ("Nr_Firme_2023", "Număr Firme 2023"),
        ("Firme_per_1000", "Firme la 1000 locuitori"),
        ("Rata_Somaj_2023", "Rată Șomaj 2023 (%)"),
        ("Salariu_Mediu_2023", "Salariu Mediu Net 2023 (RON)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_score_path() -> PathBuf {
    PathBuf::from("tabel_final.csv")
}

fn default_score_column() -> String {
    "Potential".to_string()
}

fn default_regions_path() -> Option<PathBuf> {
    Some(PathBuf::from("tabel_tooltip.csv"))
}

fn default_region_column() -> String {
    "Regiune".to_string()
}

fn default_top_n() -> usize {
    5
}

fn default_export_path() -> PathBuf {
    PathBuf::from("tabel_rezumativ_economic.csv")
}

fn default_stats_path() -> PathBuf {
    PathBuf::from("summary.json")
}

fn default_preview_rows() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_column: default_key_column(),
            base: None,
            sources: default_sources(),
            normalize: NormalizeOptions::default(),
            join: JoinOptions::default(),
            display_names: default_display_names(),
            score: ScoreConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Use `path` if given, else `county_report.toml` when present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_column.is_empty() {
            return Err(PipelineError::Config("key_column must not be empty".into()));
        }
        if self.sources.is_empty() {
            return Err(PipelineError::Config("at least one source is required".into()));
        }
        let mut seen = HashSet::new();
        for s in &self.sources {
            if !seen.insert(s.name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "source name '{}' is used twice",
                    s.name
                )));
            }
        }
        if let Some(base) = &self.base {
            if !seen.contains(base.as_str()) {
                return Err(PipelineError::Config(format!(
                    "base source '{}' is not among the configured sources",
                    base
                )));
            }
        }
        Ok(())
    }

    /// Position of the base source in `sources`.
    pub fn base_index(&self) -> usize {
        self.base
            .as_deref()
            .and_then(|b| self.sources.iter().position(|s| s.name == b))
            .unwrap_or(0)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        for s in &mut self.sources {
            join(&mut s.path);
        }
        join(&mut self.score.path);
        if let Some(r) = self.score.regions.as_mut() {
            join(r);
        }
    }

    /// Generate a default configuration file body.
    pub fn default_toml() -> String {
        let body = toml::to_string_pretty(&Self::default()).unwrap_or_default();
        format!(
            "# county_report configuration\n# Paths are relative to this file.\n\n{}",
            body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_sources() {
        let config = Config::default();
        assert_eq!(config.key_column, "Judet");
        assert_eq!(config.sources.len(), 6);
        assert_eq!(config.sources[0].name, "populatie");
        assert_eq!(config.base_index(), 0);
        assert_eq!(config.normalize.index_column, "Unnamed: 0");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config = Config::from_toml(
            r#"
            base = "b"
            [[sources]]
            name = "a"
            path = "a.csv"
            [[sources]]
            name = "b"
            path = "b.csv"
            [join]
            collisions = "error"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_index(), 1);
        assert_eq!(config.join.collisions, CollisionPolicy::Error);
        assert_eq!(config.normalize.key_match, KeyMatch::Canonical);
        assert_eq!(config.display_names, default_display_names());
    }

    #[test]
    fn rejects_unknown_base_and_duplicate_names() {
        let err = Config::from_toml("base = \"zzz\"").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        let err = Config::from_toml(
            "[[sources]]\nname = \"a\"\npath = \"x\"\n[[sources]]\nname = \"a\"\npath = \"y\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn default_toml_parses_back() {
        let text = Config::default_toml();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
