//! Extraction of differentially expressed gene sets

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::filter::passes_thresholds;
use crate::io::ComparisonTable;
use crate::loader::ResultLoader;

/// Genes passing the significance and fold-change thresholds in one comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegSet {
    /// File the set was extracted from; used to reject duplicate selections
    pub source: String,
    pub genes: BTreeSet<String>,
}

impl DegSet {
    pub fn new<I, S>(source: impl Into<String>, genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            genes: genes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Select DEGs from a loaded table.
///
/// Uses `padj` when the table has it, otherwise `pvalue` against the same
/// threshold. A table with neither yields an empty set.
pub fn degs_from_table(table: &ComparisonTable, p_threshold: f64, lfc_threshold: f64) -> DegSet {
    let genes = match table.significance_field() {
        Some(field) => table
            .records
            .iter()
            .filter(|r| !r.has_missing_gene())
            .filter(|r| passes_thresholds(r.get(field), r.log2_fold_change, p_threshold, lfc_threshold))
            .map(|r| r.gene_id.clone())
            .collect(),
        None => {
            log::warn!("{} has neither padj nor pvalue; no DEGs selected", table.source);
            BTreeSet::new()
        }
    };

    DegSet {
        source: table.source.clone(),
        genes,
    }
}

/// Load a comparison file and extract its DEG set
pub fn extract_degs<P: AsRef<Path>>(
    loader: &ResultLoader,
    path: P,
    p_threshold: f64,
    lfc_threshold: f64,
) -> Result<DegSet> {
    let table = loader.load(path)?;
    let degs = degs_from_table(&table, p_threshold, lfc_threshold);
    log::debug!(
        "{} DEGs in {} (p < {}, |log2FC| > {})",
        degs.len(),
        table.source,
        p_threshold,
        lfc_threshold
    );
    Ok(degs)
}
