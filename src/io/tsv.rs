//! Tab-delimited reading and writing of DESeq2 result tables

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use super::results::{ComparisonTable, Field, ResultRecord, MISSING_GENE_ID};
use crate::error::{DashboardError, Result};

/// Accepted names for the gene identifier column, in order of preference
pub const GENE_COLUMNS: [&str; 2] = ["gene_symbol", "gene_id"];

/// Cell values that mean "no value"
const MISSING_TOKENS: [&str; 6] = ["", "NA", "NaN", "nan", "null", "None"];

/// Parse a numeric cell. NA tokens, unparsable text and +/-Inf all become None.
pub fn parse_value(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if MISSING_TOKENS.contains(&s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize a gene identifier cell, mapping NA tokens to the missing marker
fn parse_gene_id(raw: &str) -> String {
    let s = raw.trim();
    if MISSING_TOKENS.contains(&s) {
        MISSING_GENE_ID.to_string()
    } else {
        s.to_string()
    }
}

/// Locate the gene column and the known numeric columns in a header row
fn resolve_columns(
    path: &str,
    header: &StringRecord,
) -> Result<(usize, Vec<(Field, usize)>)> {
    let names: Vec<&str> = header.iter().map(|h| h.trim()).collect();

    let gene_idx = GENE_COLUMNS
        .iter()
        .find_map(|g| names.iter().position(|n| n == g));

    let mut columns: Vec<(Field, usize)> = Vec::new();
    for (idx, name) in names.iter().enumerate() {
        match Field::from_header(name) {
            Some(field) if !columns.iter().any(|(f, _)| *f == field) => columns.push((field, idx)),
            Some(_) => log::warn!("Duplicate column '{}' in {}, keeping the first", name, path),
            None => {
                if Some(idx) != gene_idx {
                    log::debug!("Ignoring column '{}' in {}", name, path);
                }
            }
        }
    }

    let mut missing = Vec::new();
    if gene_idx.is_none() {
        missing.push(GENE_COLUMNS[0].to_string());
    }
    if !columns.iter().any(|(f, _)| *f == Field::Log2FoldChange) {
        missing.push(Field::Log2FoldChange.header().to_string());
    }

    match gene_idx {
        Some(idx) if missing.is_empty() => Ok((idx, columns)),
        _ => Err(DashboardError::Schema {
            path: path.to_string(),
            missing,
        }),
    }
}

/// Read a DESeq2 results table from a tab-delimited file
///
/// Expected format: a header row naming `gene_symbol` (or `gene_id`) and
/// `log2FoldChange`, optionally `baseMean`, `lfcSE`, `stat`, `pvalue`, `padj`.
/// Other columns are ignored.
pub fn read_results_table<P: AsRef<Path>>(path: P) -> Result<ComparisonTable> {
    let path = path.as_ref();
    let source = path.to_string_lossy().to_string();

    if !path.exists() {
        return Err(DashboardError::NotFound { path: source });
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;

    let header = reader.headers()?.clone();
    let (gene_idx, columns) = resolve_columns(&source, &header)?;

    let mut records = Vec::new();
    let mut unparsable = 0usize;

    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut record = ResultRecord::new(parse_gene_id(row.get(gene_idx).unwrap_or("")));
        for &(field, idx) in &columns {
            let raw = row.get(idx).unwrap_or("");
            let value = parse_value(raw);
            if value.is_none() && raw.trim().parse::<f64>().is_err() && !MISSING_TOKENS.contains(&raw.trim()) {
                unparsable += 1;
            }
            record.set(field, value);
        }
        records.push(record);
    }

    if unparsable > 0 {
        log::warn!("{} unparsable numeric cells in {} treated as missing", unparsable, source);
    }

    Ok(ComparisonTable::new(
        source,
        columns.into_iter().map(|(f, _)| f).collect(),
        records,
    ))
}

/// Write a results table back out as tab-delimited text
pub fn write_results_table<P: AsRef<Path>>(path: P, table: &ComparisonTable) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    let mut header = vec![GENE_COLUMNS[0].to_string()];
    header.extend(table.fields.iter().map(|f| f.header().to_string()));
    writer.write_record(&header)?;

    for record in &table.records {
        let mut row = vec![record.gene_id.clone()];
        row.extend(table.fields.iter().map(|&f| super::format_value(record.get(f))));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
