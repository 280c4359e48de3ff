// Orchestration of the load -> normalize -> join -> rename chain.
//
// Per-source failures are absorbed here: the source is skipped and exactly one
// `SourceWarning` names it. A failure on the base source aborts the run.
use crate::config::{Config, NonNumericPolicy, NormalizeOptions, SourceSpec};
use crate::error::Result;
use crate::join::left_join;
use crate::loader;
use crate::normalize::{first_per_key, normalize};
use crate::rename::rename;
use crate::types::{PipelineOutput, SourceWarning, Table};
use tracing::{info, warn};

fn load_normalized(source: &SourceSpec, config: &Config) -> Result<Table> {
    let raw = loader::load(source, &config.key_column)?;
    normalize(&raw, &config.key_column, &config.normalize)
}

/// Run the whole pipeline for one configuration.
pub fn run(config: &Config) -> Result<PipelineOutput> {
    config.validate()?;
    let base_idx = config.base_index();
    let base_spec = &config.sources[base_idx];
    let base = load_normalized(base_spec, config)?;

    let mut warnings: Vec<SourceWarning> = Vec::new();
    let mut joined_sources = vec![base_spec.name.clone()];
    let mut joined = base;
    for (idx, source) in config.sources.iter().enumerate() {
        if idx == base_idx {
            continue;
        }
        let step = load_normalized(source, config).and_then(|table| {
            left_join(&joined, &table, &config.key_column, config.join.collisions)
        });
        match step {
            Ok(table) => {
                joined = table;
                joined_sources.push(source.name.clone());
            }
            Err(e) if e.is_per_source() => {
                warn!(source = %source.name, error = %e, "skipping source");
                warnings.push(SourceWarning {
                    source: source.name.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let summary = rename(&joined, &config.display_names);
    info!(
        counties = summary.len(),
        columns = summary.columns.len(),
        sources = joined_sources.len(),
        dropped = warnings.len(),
        "summary table built"
    );
    Ok(PipelineOutput {
        summary,
        joined_sources,
        warnings,
    })
}

/// Load and mean-aggregate a numeric side table, e.g. the potential score.
///
/// Text columns such as region names are dropped rather than rejected.
pub fn load_scores(source: &SourceSpec, config: &Config) -> Result<Table> {
    let raw = loader::load(source, &config.key_column)?;
    let opts = NormalizeOptions {
        non_numeric: NonNumericPolicy::Drop,
        ..config.normalize.clone()
    };
    normalize(&raw, &config.key_column, &opts)
}

/// Load a lookup table (text allowed), keeping the first row per key.
pub fn load_lookup(source: &SourceSpec, config: &Config) -> Result<Table> {
    let raw = loader::load(source, &config.key_column)?;
    first_per_key(&raw, &config.key_column, &config.normalize)
}

impl PipelineOutput {
    pub fn dropped_sources(&self) -> impl Iterator<Item = &str> + '_ {
        self.warnings.iter().map(|w| w.source.as_str())
    }
}
