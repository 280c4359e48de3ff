//! Per-county summary table for Romanian economic indicators.
//!
//! Several independently sourced CSV files, each keyed by county (`Judet`),
//! are loaded, reduced to one row per county by averaging, left-joined onto a
//! base table, given display names and exported.
//!
//! ```text
//! loader -> normalize -> join -> rename -> output
//! ```
//!
//! [`pipeline::run`] wires the stages together; [`cache::SummaryCache`]
//! memoizes runs by input content.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod join;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod rename;
pub mod stats;
pub mod types;
pub mod util;

pub use config::{CollisionPolicy, Config, DisplayMapping, KeyMatch, NonNumericPolicy, SourceSpec};
pub use error::{PipelineError, Result};
pub use output::Format;
pub use types::{PipelineOutput, SourceWarning, Table, Value};
