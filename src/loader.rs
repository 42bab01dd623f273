//! Cached loading of DESeq2 result files
//!
//! The cache is owned by a [`ResultLoader`] instance rather than living in a
//! global, so each server process (and each test) gets its own. Tables are
//! immutable once cached; every read hands back an owned copy.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;

use crate::error::Result;
use crate::io::{read_results_table, ComparisonTable};

/// Loads result tables and memoizes them by exact path string
#[derive(Debug, Default)]
pub struct ResultLoader {
    cache: RwLock<HashMap<String, ComparisonTable>>,
}

impl ResultLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table, serving a copy from the cache when possible
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ComparisonTable> {
        let key = path.as_ref().to_string_lossy().to_string();

        if let Some(table) = self.cache.read().get(&key) {
            log::debug!("Cache hit: {}", key);
            return Ok(table.clone());
        }

        let table = read_results_table(&key)?;
        log::info!("Loaded {} genes from {}", table.n_genes(), key);

        self.cache.write().insert(key, table.clone());
        Ok(table)
    }

    /// Load a table straight from disk without reading or filling the cache
    pub fn load_uncached<P: AsRef<Path>>(&self, path: P) -> Result<ComparisonTable> {
        read_results_table(path)
    }

    /// Drop every cached table
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write();
        log::info!("Clearing {} cached tables", cache.len());
        cache.clear();
    }

    /// Number of cached tables
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_cached<P: AsRef<Path>>(&self, path: P) -> bool {
        self.cache
            .read()
            .contains_key(path.as_ref().to_string_lossy().as_ref())
    }
}
