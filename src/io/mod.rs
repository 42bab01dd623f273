//! Input/Output operations for DESeq2 result tables

mod results;
mod tsv;

pub use results::{ComparisonTable, Field, ResultRecord, ResultsSummary, MISSING_GENE_ID};
pub use tsv::{parse_value, read_results_table, write_results_table, GENE_COLUMNS};

use crate::error::Result;

/// Format an optional value for export. Missing values are written as empty cells.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Serialize a header and rows as comma-separated text
pub fn to_csv_string<I>(header: &[String], rows: I) -> Result<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::DashboardError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
