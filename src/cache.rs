//! Explicit memo for pipeline runs.
//!
//! Each configuration holds one entry, tagged with a SHA-256 fingerprint of
//! the configuration and of the bytes of every configured source. An edited or
//! deleted file misses and the fresh output replaces the stale one. Nothing
//! about the running process goes into either digest.

use crate::config::Config;
use crate::error::Result;
use crate::pipeline;
use crate::types::PipelineOutput;
use sha2::{Digest, Sha256};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct SummaryCache {
    /// Config digest -> (input fingerprint, output).
    entries: HashMap<String, (String, PipelineOutput)>,
    hits: usize,
    misses: usize,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn config_digest(config: &Config) -> Result<String> {
        Ok(hex::encode(Sha256::digest(serde_json::to_vec(config)?)))
    }

    /// Hex digest identifying a configuration together with its inputs.
    pub fn fingerprint(config: &Config) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(config)?);
        for source in &config.sources {
            hasher.update(source.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(source.path.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            match std::fs::read(&source.path) {
                Ok(bytes) => {
                    hasher.update((bytes.len() as u64).to_le_bytes());
                    hasher.update(&bytes);
                }
                Err(_) => hasher.update(b"<missing>"),
            }
        }
        Ok(hex::encode(hasher.finalize()))
    }

    /// Return the cached output for these inputs, running the pipeline on a miss.
    ///
    /// Failed runs are not stored.
    pub fn get_or_run(&mut self, config: &Config) -> Result<&PipelineOutput> {
        let fingerprint = Self::fingerprint(config)?;
        match self.entries.entry(Self::config_digest(config)?) {
            Entry::Occupied(e) if e.get().0 == fingerprint => {
                self.hits += 1;
                debug!(key = %fingerprint, "summary cache hit");
                Ok(&e.into_mut().1)
            }
            Entry::Occupied(mut e) => {
                self.misses += 1;
                debug!(key = %fingerprint, "summary cache miss, inputs changed");
                let output = pipeline::run(config)?;
                e.insert((fingerprint, output));
                Ok(&e.into_mut().1)
            }
            Entry::Vacant(v) => {
                self.misses += 1;
                debug!(key = %fingerprint, "summary cache miss");
                let output = pipeline::run(config)?;
                Ok(&v.insert((fingerprint, output)).1)
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
