//! Fold-change comparison of two merged comparisons

use std::collections::HashSet;

use serde::Serialize;

use super::merge::{side_headers, MergedRecord, MergedTable};
use crate::error::Result;
use crate::filter::{GeneSearch, SCATTER_SIG_PADJ};
use crate::io::{format_value, to_csv_string, Field};
use crate::stats::{max_present, pearson, round_to};

/// Default number of top genes labelled on the scatter plot
pub const DEFAULT_SCATTER_LABELS: usize = 40;

/// User-adjustable scatter parameters
#[derive(Debug, Clone)]
pub struct ScatterParams {
    /// Keep only genes with padj < 0.05 in either comparison
    pub significant_only: bool,
    pub search: Option<String>,
    pub n_labels: usize,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self {
            significant_only: false,
            search: None,
            n_labels: DEFAULT_SCATTER_LABELS,
        }
    }
}

/// A merged gene with its labelling score
#[derive(Debug, Clone, Serialize)]
pub struct ScatterRow {
    #[serde(flatten)]
    pub merged: MergedRecord,
    /// max(|log2FC_1|, |log2FC_2|)
    pub max_abs_lfc: Option<f64>,
    pub labeled: bool,
}

/// Rounded row for the merged results table
#[derive(Debug, Clone, Serialize)]
pub struct ScatterTableRow {
    pub gene_symbol: String,
    #[serde(rename = "log2FoldChange_1")]
    pub lfc_1: Option<f64>,
    #[serde(rename = "log2FoldChange_2")]
    pub lfc_2: Option<f64>,
    #[serde(rename = "padj_1", skip_serializing_if = "Option::is_none")]
    pub padj_1: Option<Option<f64>>,
    #[serde(rename = "padj_2", skip_serializing_if = "Option::is_none")]
    pub padj_2: Option<Option<f64>>,
    #[serde(rename = "pvalue_1", skip_serializing_if = "Option::is_none")]
    pub pvalue_1: Option<Option<f64>>,
    #[serde(rename = "pvalue_2", skip_serializing_if = "Option::is_none")]
    pub pvalue_2: Option<Option<f64>>,
}

/// Merged comparison prepared for the scatter view
#[derive(Debug, Clone, Serialize)]
pub struct ScatterTable {
    pub first_source: String,
    pub second_source: String,
    pub first_fields: Vec<Field>,
    pub second_fields: Vec<Field>,
    pub rows: Vec<ScatterRow>,
    /// Pearson correlation of the two fold changes
    pub correlation: Option<f64>,
}

/// Filter, score and label a merged table
pub fn compare(merged: MergedTable, params: &ScatterParams) -> ScatterTable {
    let search = GeneSearch::new(params.search.as_deref());
    let apply_sig = params.significant_only && merged.both_have(Field::Padj);
    if params.significant_only && !apply_sig {
        log::debug!("Significance filter skipped: padj missing from one side");
    }

    let mut rows: Vec<ScatterRow> = merged
        .records
        .into_iter()
        .filter(|r| {
            !apply_sig
                || r.first.padj.map_or(false, |p| p < SCATTER_SIG_PADJ)
                || r.second.padj.map_or(false, |p| p < SCATTER_SIG_PADJ)
        })
        .filter(|r| search.matches(&r.gene_id))
        .map(|r| ScatterRow {
            max_abs_lfc: max_present(&[r.first.abs_lfc(), r.second.abs_lfc()]),
            merged: r,
            labeled: false,
        })
        .collect();

    if params.n_labels > 0 {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        // Missing scores sort last
        order.sort_by(|&a, &b| {
            let sa = rows[a].max_abs_lfc.unwrap_or(f64::NEG_INFINITY);
            let sb = rows[b].max_abs_lfc.unwrap_or(f64::NEG_INFINITY);
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
        });
        let top: HashSet<String> = order
            .into_iter()
            .take(params.n_labels)
            .map(|i| rows[i].merged.gene_id.clone())
            .collect();
        for row in rows.iter_mut() {
            row.labeled = top.contains(&row.merged.gene_id);
        }
    }

    let correlation = pearson(
        rows.iter()
            .map(|r| (r.merged.first.log2_fold_change, r.merged.second.log2_fold_change)),
    );

    ScatterTable {
        first_source: merged.first_source,
        second_source: merged.second_source,
        first_fields: merged.first_fields,
        second_fields: merged.second_fields,
        rows,
        correlation,
    }
}

impl ScatterTable {
    pub fn n_genes(&self) -> usize {
        self.rows.len()
    }

    fn both_have(&self, field: Field) -> bool {
        self.first_fields.contains(&field) && self.second_fields.contains(&field)
    }

    /// First `limit` rows, rounded to 4 decimals
    pub fn table_rows(&self, limit: usize) -> Vec<ScatterTableRow> {
        let has_padj = self.both_have(Field::Padj);
        let has_pvalue = self.both_have(Field::PValue);
        let when = |present: bool, v: Option<f64>| if present { Some(round_to(v, 4)) } else { None };

        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                let (a, b) = (&row.merged.first, &row.merged.second);
                ScatterTableRow {
                    gene_symbol: row.merged.gene_id.clone(),
                    lfc_1: round_to(a.log2_fold_change, 4),
                    lfc_2: round_to(b.log2_fold_change, 4),
                    padj_1: when(has_padj, a.padj),
                    padj_2: when(has_padj, b.padj),
                    pvalue_1: when(has_pvalue, a.pvalue),
                    pvalue_2: when(has_pvalue, b.pvalue),
                }
            })
            .collect()
    }

    /// Merged columns plus `max_abs_lfc`; shared columns carry `_1` / `_2`
    pub fn to_csv(&self) -> Result<String> {
        let mut header = vec!["gene_symbol".to_string()];
        header.extend(side_headers(&self.first_fields, &self.second_fields, "_1"));
        header.extend(side_headers(&self.second_fields, &self.first_fields, "_2"));
        header.push("max_abs_lfc".to_string());

        let rows = self.rows.iter().map(|row| {
            let mut cells = vec![row.merged.gene_id.clone()];
            cells.extend(self.first_fields.iter().map(|&f| format_value(row.merged.first.get(f))));
            cells.extend(self.second_fields.iter().map(|&f| format_value(row.merged.second.get(f))));
            cells.push(format_value(row.max_abs_lfc));
            cells
        });

        to_csv_string(&header, rows)
    }
}
