//! deseq2_dashboard: interactive exploration of DESeq2 result tables
//!
//! The crate discovers DESeq2 result files, loads them through a shared
//! cache, and derives what the dashboard shows: merged comparisons, DEG
//! sets, their overlaps, and Plotly figures served by an actix-web app.
//!
//! # Example
//!
//! ```ignore
//! use deseq2_dashboard::prelude::*;
//!
//! let loader = ResultLoader::new();
//! let a = extract_degs(&loader, "primary/20240101_ko_vs_wt_results.tsv", 0.05, 1.0)?;
//! let b = extract_degs(&loader, "primary/20240102_dko_vs_wt_results.tsv", 0.05, 1.0)?;
//! let partition = overlap(&[a, b])?;
//! ```

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod loader;
pub mod plot;
pub mod server;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        annotate, compare, extract_degs, merge, overlap, summarize, DegSet, Direction, MergedTable,
        OverlapPartition, ScatterParams, VennSummary, VolcanoParams,
    };
    pub use crate::catalog::{discover, display_name, short_name, CatalogEntry, Category};
    pub use crate::config::ServerConfig;
    pub use crate::error::{DashboardError, Result};
    pub use crate::io::{read_results_table, write_results_table, ComparisonTable, Field, ResultRecord};
    pub use crate::loader::ResultLoader;
}

use std::path::Path;

use analysis::degs_from_table;
use io::ResultsSummary;
use prelude::*;

/// Summary counts and the DEG set of one result file at the given thresholds
pub fn report_degs<P: AsRef<Path>>(
    loader: &ResultLoader,
    path: P,
    fdr: f64,
    lfc: f64,
) -> Result<(ResultsSummary, DegSet)> {
    let table = loader.load(path)?;
    Ok((table.summary(fdr, lfc), degs_from_table(&table, fdr, lfc)))
}

/// Partition the DEGs of two or three result files and write the overlap table as CSV
pub fn write_overlaps<P: AsRef<Path>>(
    loader: &ResultLoader,
    paths: &[String],
    fdr: f64,
    lfc: f64,
    output: P,
) -> Result<VennSummary> {
    let summary = summarize(loader, paths, fdr, lfc)?;
    std::fs::write(output.as_ref(), summary.to_csv()?)?;
    log::info!("Wrote overlap table to {}", output.as_ref().display());
    Ok(summary)
}

/// Merge two result files and write the joined table as TSV
pub fn write_merged<P: AsRef<Path>>(
    loader: &ResultLoader,
    first: &str,
    second: &str,
    output: P,
) -> Result<MergedTable> {
    let merged = merge(loader, first, second)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output.as_ref())?;
    writer.write_record(merged.headers())?;
    for record in &merged.records {
        writer.write_record(merged.row_cells(record))?;
    }
    writer.flush()?;

    log::info!(
        "Wrote {} merged genes to {}",
        merged.n_genes(),
        output.as_ref().display()
    );
    Ok(merged)
}
