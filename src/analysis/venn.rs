//! DEG overlap summary for the Venn view and its CSV export

use std::collections::HashSet;

use serde::Serialize;

use super::degs::{extract_degs, DegSet};
use super::overlap::{overlap, OverlapPartition};
use crate::catalog::short_name;
use crate::error::{DashboardError, Result};
use crate::io::to_csv_string;
use crate::loader::ResultLoader;

/// Gene list cap per region for two-way diagrams
pub const TWO_WAY_LIST_LIMIT: usize = 50;
/// Gene list cap per region for three-way diagrams
pub const THREE_WAY_LIST_LIMIT: usize = 30;

/// One displayed gene list
#[derive(Debug, Clone, Serialize)]
pub struct GeneList {
    pub title: String,
    pub total: usize,
    pub genes: Vec<String>,
}

/// Everything the Venn view shows for one selection
#[derive(Debug, Clone, Serialize)]
pub struct VennSummary {
    pub names: Vec<String>,
    pub deg_counts: Vec<usize>,
    pub fdr: f64,
    pub lfc: f64,
    pub partition: OverlapPartition,
}

/// Check the user's selection before any file is read.
///
/// `n_comparisons` is the requested diagram size; `paths` holds the selected
/// files, with `None` for an empty dropdown.
pub fn validate_selection(n_comparisons: usize, paths: &[Option<String>]) -> Result<Vec<String>> {
    if !(2..=3).contains(&n_comparisons) {
        return Err(DashboardError::validation(format!(
            "Number of comparisons must be 2 or 3, got {}",
            n_comparisons
        )));
    }

    let selected: Vec<Option<&str>> = (0..n_comparisons)
        .map(|i| paths.get(i).and_then(|p| p.as_deref()).filter(|p| !p.is_empty()))
        .collect();

    if selected[0].is_none() || selected[1].is_none() {
        return Err(DashboardError::validation("Please select at least two comparisons"));
    }
    if n_comparisons == 3 && selected[2].is_none() {
        return Err(DashboardError::validation("Please select all three comparisons"));
    }

    let chosen: Vec<String> = selected.into_iter().flatten().map(str::to_string).collect();
    let distinct: HashSet<&String> = chosen.iter().collect();
    if distinct.len() != chosen.len() {
        return Err(DashboardError::validation(if n_comparisons == 2 {
            "Please select two different comparisons"
        } else {
            "Please select three different comparisons"
        }));
    }

    Ok(chosen)
}

/// Extract DEGs from each selected file and partition them
pub fn summarize(loader: &ResultLoader, paths: &[String], fdr: f64, lfc: f64) -> Result<VennSummary> {
    let sets: Vec<DegSet> = paths
        .iter()
        .map(|p| extract_degs(loader, p, fdr, lfc))
        .collect::<Result<_>>()?;

    let partition = overlap(&sets)?;

    Ok(VennSummary {
        names: paths.iter().map(short_name).collect(),
        deg_counts: sets.iter().map(DegSet::len).collect(),
        fdr,
        lfc,
        partition,
    })
}

impl VennSummary {
    /// "DEG counts - a: 10, b: 12"
    pub fn counts_line(&self) -> String {
        let parts: Vec<String> = self
            .names
            .iter()
            .zip(&self.deg_counts)
            .map(|(n, c)| format!("{}: {}", n, c))
            .collect();
        format!("DEG counts - {}", parts.join(", "))
    }

    /// Sorted, capped gene lists in display order.
    ///
    /// Two-way: only first, overlap, only second. Three-way: the three
    /// exclusive regions and the triple overlap.
    pub fn gene_lists(&self) -> Vec<GeneList> {
        let regions = self.partition.regions();
        let (picks, limit): (Vec<usize>, usize) = match self.partition.n_sets() {
            2 => (vec![0, 1, 2], TWO_WAY_LIST_LIMIT),
            _ => (vec![0, 1, 2, 6], THREE_WAY_LIST_LIMIT),
        };

        picks
            .into_iter()
            .map(|i| {
                let region = &regions[i];
                let title = if region.members.len() == 3 {
                    "All three".to_string()
                } else {
                    self.partition.region_label(region, &self.names)
                };
                GeneList {
                    title,
                    total: region.genes.len(),
                    genes: region.genes.iter().take(limit).cloned().collect(),
                }
            })
            .collect()
    }

    /// Category / count / gene list table for download
    pub fn to_csv(&self) -> Result<String> {
        let header = vec![
            "Category".to_string(),
            "Gene_Count".to_string(),
            "Genes".to_string(),
        ];
        let rows = self.partition.regions().into_iter().map(|region| {
            vec![
                self.partition.region_label(&region, &self.names),
                region.genes.len().to_string(),
                region.genes.iter().cloned().collect::<Vec<_>>().join(", "),
            ]
        });
        to_csv_string(&header, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, rows: &[(&str, f64, f64)]) -> String {
        let path = dir.path().join(name);
        let mut body = String::from("gene_symbol\tlog2FoldChange\tpadj\n");
        for (g, lfc, padj) in rows {
            body.push_str(&format!("{}\t{}\t{}\n", g, lfc, padj));
        }
        fs::write(&path, body).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_validate_selection_messages() {
        let a = Some("a.tsv".to_string());
        let b = Some("b.tsv".to_string());

        let msg = |r: Result<Vec<String>>| r.unwrap_err().to_string();
        assert_eq!(msg(validate_selection(2, &[a.clone(), None])), "Please select at least two comparisons");
        assert_eq!(
            msg(validate_selection(3, &[a.clone(), b.clone(), None])),
            "Please select all three comparisons"
        );
        assert_eq!(
            msg(validate_selection(2, &[a.clone(), a.clone()])),
            "Please select two different comparisons"
        );
        assert_eq!(
            msg(validate_selection(3, &[a.clone(), b.clone(), a.clone()])),
            "Please select three different comparisons"
        );
        assert!(validate_selection(4, &[a.clone(), b.clone()]).is_err());

        // A third selection is ignored for a two-way diagram
        let chosen = validate_selection(2, &[a.clone(), b.clone(), a.clone()]).unwrap();
        assert_eq!(chosen, vec!["a.tsv", "b.tsv"]);
    }

    #[test]
    fn test_summary_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = write(
            &dir,
            "20240101_ko_vs_wt_results.tsv",
            &[("A", 2.0, 0.01), ("B", 2.0, 0.01), ("C", -2.0, 0.01), ("N", 0.1, 0.9)],
        );
        let p2 = write(
            &dir,
            "20240102_dko_vs_wt_results.tsv",
            &[("B", 3.0, 0.001), ("C", -3.0, 0.001), ("D", 3.0, 0.001)],
        );

        let loader = ResultLoader::new();
        let summary = summarize(&loader, &[p1, p2], 0.05, 1.0).unwrap();
        assert_eq!(summary.names, vec!["ko_vs_wt", "dko_vs_wt"]);
        assert_eq!(summary.deg_counts, vec![3, 3]);
        assert_eq!(summary.counts_line(), "DEG counts - ko_vs_wt: 3, dko_vs_wt: 3");

        let lists = summary.gene_lists();
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].genes, vec!["A"]);
        assert_eq!(lists[1].genes, vec!["B", "C"]);
        assert_eq!(lists[2].genes, vec!["D"]);

        let csv = summary.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Category,Gene_Count,Genes");
        assert_eq!(lines[1], "Only ko_vs_wt,1,A");
        assert_eq!(lines[2], "Overlap (ko_vs_wt & dko_vs_wt),2,\"B, C\"");
        assert_eq!(lines[3], "Only dko_vs_wt,1,D");
    }

    #[test]
    fn test_three_way_lists() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = write(&dir, "x_a_results.tsv", &[("A", 2.0, 0.01), ("T", 2.0, 0.01)]);
        let p2 = write(&dir, "x_b_results.tsv", &[("B", 2.0, 0.01), ("T", 2.0, 0.01)]);
        let p3 = write(&dir, "x_c_results.tsv", &[("C", 2.0, 0.01), ("T", 2.0, 0.01)]);

        let loader = ResultLoader::new();
        let summary = summarize(&loader, &[p1, p2, p3], 0.05, 1.0).unwrap();
        let lists = summary.gene_lists();
        let titles: Vec<_> = lists.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Only a", "Only b", "Only c", "All three"]);
        assert_eq!(lists[3].genes, vec!["T"]);

        let csv = summary.to_csv().unwrap();
        assert_eq!(csv.lines().count(), 8);
        assert!(csv.contains("Overlap All Three,1,T"));
    }

    #[test]
    fn test_load_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = write(&dir, "a.tsv", &[("A", 2.0, 0.01)]);
        let missing = dir.path().join("gone.tsv").to_string_lossy().to_string();
        let loader = ResultLoader::new();
        assert!(matches!(
            summarize(&loader, &[p1, missing], 0.05, 1.0),
            Err(DashboardError::NotFound { .. })
        ));
    }
}
