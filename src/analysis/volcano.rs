//! Per-gene significance classification for the volcano view

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::filter::{passes_thresholds, GeneSearch, DEFAULT_FDR, DEFAULT_LFC};
use crate::io::{format_value, to_csv_string, ComparisonTable, Field, ResultRecord, GENE_COLUMNS};
use crate::stats::{neg_log10, round_to};

/// Default number of top genes labelled on the volcano plot
pub const DEFAULT_VOLCANO_LABELS: usize = 20;
/// Rows shown in the results table
pub const TABLE_ROW_LIMIT: usize = 2000;
/// padj cutoff used to colour table rows
pub const TABLE_HIGHLIGHT_PADJ: f64 = 0.05;

/// User-adjustable volcano parameters
#[derive(Debug, Clone)]
pub struct VolcanoParams {
    pub fdr: f64,
    pub lfc: f64,
    pub search: Option<String>,
    pub n_labels: usize,
}

impl Default for VolcanoParams {
    fn default() -> Self {
        Self {
            fdr: DEFAULT_FDR,
            lfc: DEFAULT_LFC,
            search: None,
            n_labels: DEFAULT_VOLCANO_LABELS,
        }
    }
}

/// Regulation call for one gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[serde(rename = "Up-regulated")]
    Up,
    #[serde(rename = "Down-regulated")]
    Down,
    #[serde(rename = "Not significant")]
    NotSignificant,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "Up-regulated",
            Direction::Down => "Down-regulated",
            Direction::NotSignificant => "Not significant",
        })
    }
}

/// A record with its derived volcano statistics
#[derive(Debug, Clone, Serialize)]
pub struct VolcanoRow {
    #[serde(flatten)]
    pub record: ResultRecord,
    pub neg_log10_p: Option<f64>,
    pub significant: bool,
    pub direction: Direction,
    /// -log10(p) * |log2FC|, 0 when either is missing
    pub regulation_strength: f64,
    /// Among the top-N genes by regulation strength
    pub labeled: bool,
}

/// Rounded row for the results table
#[derive(Debug, Clone, Serialize)]
pub struct VolcanoTableRow {
    pub gene_symbol: String,
    #[serde(rename = "log2FoldChange")]
    pub log2_fold_change: Option<f64>,
    #[serde(rename = "baseMean")]
    pub base_mean: Option<f64>,
    pub pvalue: Option<f64>,
    pub padj: Option<f64>,
    /// "up" / "down" when padj < 0.05, for row colouring
    pub highlight: Option<&'static str>,
}

/// A comparison table annotated for the volcano view
#[derive(Debug, Clone, Serialize)]
pub struct VolcanoTable {
    pub source: String,
    pub fields: Vec<Field>,
    /// Column the y axis and significance are based on
    pub p_field: Option<Field>,
    pub fdr: f64,
    pub lfc: f64,
    pub n_labels: usize,
    pub rows: Vec<VolcanoRow>,
}

/// Classify every gene of a table.
///
/// The gene search is applied first, so top-N labels are chosen among the
/// matching genes only.
pub fn annotate(table: ComparisonTable, params: &VolcanoParams) -> VolcanoTable {
    let search = GeneSearch::new(params.search.as_deref());
    let p_field = table.significance_field();

    let mut rows: Vec<VolcanoRow> = table
        .records
        .into_iter()
        .filter(|r| search.matches(&r.gene_id))
        .map(|record| {
            let p = p_field.and_then(|f| record.get(f));
            let lfc = record.log2_fold_change;
            let neg_log10_p = neg_log10(p);
            let significant = p_field.is_some() && passes_thresholds(p, lfc, params.fdr, params.lfc);
            let direction = match lfc {
                Some(l) if significant && l > 0.0 => Direction::Up,
                Some(l) if significant && l < 0.0 => Direction::Down,
                _ => Direction::NotSignificant,
            };
            let regulation_strength = match (neg_log10_p, lfc) {
                (Some(y), Some(l)) => y * l.abs(),
                _ => 0.0,
            };
            VolcanoRow {
                record,
                neg_log10_p,
                significant,
                direction,
                regulation_strength,
                labeled: false,
            }
        })
        .collect();

    if params.n_labels > 0 {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|&a, &b| {
            rows[b]
                .regulation_strength
                .partial_cmp(&rows[a].regulation_strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let top: HashSet<String> = order
            .into_iter()
            .take(params.n_labels)
            .map(|i| rows[i].record.gene_id.clone())
            .collect();
        for row in rows.iter_mut() {
            row.labeled = top.contains(&row.record.gene_id);
        }
    }

    VolcanoTable {
        source: table.source,
        fields: table.fields,
        p_field,
        fdr: params.fdr,
        lfc: params.lfc,
        n_labels: params.n_labels,
        rows,
    }
}

impl VolcanoTable {
    pub fn n_genes(&self) -> usize {
        self.rows.len()
    }

    pub fn count(&self, direction: Direction) -> usize {
        self.rows.iter().filter(|r| r.direction == direction).count()
    }

    /// First `limit` rows, rounded to 4 decimals
    pub fn table_rows(&self, limit: usize) -> Vec<VolcanoTableRow> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                let r = &row.record;
                let highlight = match (r.padj, r.log2_fold_change) {
                    (Some(p), Some(l)) if p < TABLE_HIGHLIGHT_PADJ && l > 0.0 => Some("up"),
                    (Some(p), Some(l)) if p < TABLE_HIGHLIGHT_PADJ && l < 0.0 => Some("down"),
                    _ => None,
                };
                VolcanoTableRow {
                    gene_symbol: r.gene_id.clone(),
                    log2_fold_change: round_to(r.log2_fold_change, 4),
                    base_mean: round_to(r.base_mean, 4),
                    pvalue: round_to(r.pvalue, 4),
                    padj: round_to(r.padj, 4),
                    highlight,
                }
            })
            .collect()
    }

    /// Full annotated table as CSV: loaded columns plus the derived ones
    pub fn to_csv(&self) -> Result<String> {
        let mut header = vec![GENE_COLUMNS[0].to_string()];
        header.extend(self.fields.iter().map(|f| f.header().to_string()));
        header.extend(
            ["neg_log10_p", "significant", "direction", "regulation_strength"]
                .iter()
                .map(|s| s.to_string()),
        );

        let rows = self.rows.iter().map(|row| {
            let mut cells = vec![row.record.gene_id.clone()];
            cells.extend(self.fields.iter().map(|&f| format_value(row.record.get(f))));
            cells.push(format_value(row.neg_log10_p));
            cells.push(if row.significant { "True" } else { "False" }.to_string());
            cells.push(row.direction.to_string());
            cells.push(row.regulation_strength.to_string());
            cells
        });

        to_csv_string(&header, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(gene: &str, lfc: Option<f64>, padj: Option<f64>) -> ResultRecord {
        let mut r = ResultRecord::new(gene);
        r.log2_fold_change = lfc;
        r.padj = padj;
        r
    }

    fn table(records: Vec<ResultRecord>) -> ComparisonTable {
        ComparisonTable::new("cmp.tsv", vec![Field::Log2FoldChange, Field::Padj], records)
    }

    #[test]
    fn test_classification() {
        let t = table(vec![
            rec("up", Some(2.0), Some(0.001)),
            rec("down", Some(-3.0), Some(0.01)),
            rec("weak", Some(0.5), Some(0.001)),
            rec("ns", Some(4.0), Some(0.5)),
            rec("zero_p", Some(2.0), Some(0.0)),
            rec("na", None, Some(0.001)),
        ]);
        let v = annotate(t, &VolcanoParams::default());

        let dirs: Vec<_> = v.rows.iter().map(|r| r.direction).collect();
        assert_eq!(
            dirs,
            vec![
                Direction::Up,
                Direction::Down,
                Direction::NotSignificant,
                Direction::NotSignificant,
                Direction::Up,
                Direction::NotSignificant,
            ]
        );
        assert_eq!(v.p_field, Some(Field::Padj));
        // p == 0 is significant but has no finite -log10(p)
        assert_eq!(v.rows[4].neg_log10_p, None);
        assert_eq!(v.rows[4].regulation_strength, 0.0);
        assert!((v.rows[0].regulation_strength - 6.0).abs() < 1e-9);
        assert_eq!(v.count(Direction::Up), 2);
    }

    #[test]
    fn test_top_labels_by_strength() {
        let t = table(vec![
            rec("a", Some(1.0), Some(0.1)),
            rec("b", Some(5.0), Some(1e-10)),
            rec("c", Some(-4.0), Some(1e-8)),
            rec("d", Some(0.1), Some(0.5)),
        ]);
        let params = VolcanoParams {
            n_labels: 2,
            ..VolcanoParams::default()
        };
        let v = annotate(t, &params);
        let labeled: Vec<_> = v
            .rows
            .iter()
            .filter(|r| r.labeled)
            .map(|r| r.record.gene_id.as_str())
            .collect();
        assert_eq!(labeled, vec!["b", "c"]);

        let none = annotate(
            table(vec![rec("a", Some(3.0), Some(0.001))]),
            &VolcanoParams {
                n_labels: 0,
                ..VolcanoParams::default()
            },
        );
        assert!(!none.rows[0].labeled);
    }

    #[test]
    fn test_search_filters_before_ranking() {
        let t = table(vec![
            rec("Lifr", Some(1.0), Some(0.01)),
            rec("Kdr", Some(9.0), Some(1e-20)),
            rec("Lif", Some(2.0), Some(0.01)),
        ]);
        let params = VolcanoParams {
            search: Some("lif".to_string()),
            n_labels: 1,
            ..VolcanoParams::default()
        };
        let v = annotate(t, &params);
        assert_eq!(v.n_genes(), 2);
        assert!(v.rows.iter().any(|r| r.record.gene_id == "Lif" && r.labeled));
    }

    #[test]
    fn test_no_p_column_means_nothing_significant() {
        let t = ComparisonTable::new(
            "cmp.tsv",
            vec![Field::Log2FoldChange],
            vec![rec("a", Some(10.0), None)],
        );
        let v = annotate(t, &VolcanoParams::default());
        assert_eq!(v.p_field, None);
        assert!(!v.rows[0].significant);
        assert_eq!(v.rows[0].neg_log10_p, None);
    }

    #[test]
    fn test_table_rows_round_and_highlight() {
        let t = table(vec![
            rec("a", Some(1.234567), Some(0.01)),
            rec("b", Some(-2.0), Some(0.04)),
            rec("c", Some(2.0), Some(0.2)),
        ]);
        let v = annotate(t, &VolcanoParams::default());
        let rows = v.table_rows(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].log2_fold_change, Some(1.2346));
        assert_eq!(rows[0].highlight, Some("up"));
        assert_eq!(rows[1].highlight, Some("down"));
        assert_eq!(v.table_rows(TABLE_ROW_LIMIT)[2].highlight, None);
    }

    #[test]
    fn test_csv_export_columns() {
        let t = table(vec![rec("a", Some(2.0), Some(0.01)), rec("b", None, None)]);
        let csv = annotate(t, &VolcanoParams::default()).to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "gene_symbol,log2FoldChange,padj,neg_log10_p,significant,direction,regulation_strength"
        );
        let cells: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(&cells[..3], &["a", "2", "0.01"]);
        assert!((cells[3].parse::<f64>().unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(&cells[4..6], &["True", "Up-regulated"]);
        assert!((cells[6].parse::<f64>().unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(lines[2], "b,,,,False,Not significant,0");
    }
}
