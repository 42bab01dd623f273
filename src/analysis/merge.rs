//! Inner join of two comparison tables on gene identifier

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::io::{ComparisonTable, Field, ResultRecord, GENE_COLUMNS};
use crate::loader::ResultLoader;

/// A gene measured in both comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub gene_id: String,
    /// Values from the first table (`_1` columns)
    pub first: ResultRecord,
    /// Values from the second table (`_2` columns)
    pub second: ResultRecord,
}

/// Genes common to two comparison tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedTable {
    pub first_source: String,
    pub second_source: String,
    pub first_fields: Vec<Field>,
    pub second_fields: Vec<Field>,
    pub records: Vec<MergedRecord>,
}

impl MergedTable {
    pub fn n_genes(&self) -> usize {
        self.records.len()
    }

    /// Whether both sides carry the given column
    pub fn both_have(&self, field: Field) -> bool {
        self.first_fields.contains(&field) && self.second_fields.contains(&field)
    }

    /// Column headers, gene column first. Only columns carried by both
    /// sides get a `_1` / `_2` suffix.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![GENE_COLUMNS[0].to_string()];
        headers.extend(side_headers(&self.first_fields, &self.second_fields, "_1"));
        headers.extend(side_headers(&self.second_fields, &self.first_fields, "_2"));
        headers
    }

    /// Cells for one record, in `headers()` order
    pub fn row_cells(&self, record: &MergedRecord) -> Vec<String> {
        let mut cells = vec![record.gene_id.clone()];
        cells.extend(self.first_fields.iter().map(|&f| crate::io::format_value(record.first.get(f))));
        cells.extend(self.second_fields.iter().map(|&f| crate::io::format_value(record.second.get(f))));
        cells
    }
}

/// Headers for one side of a join; `other` decides which names collide
pub(crate) fn side_headers<'a>(
    fields: &'a [Field],
    other: &'a [Field],
    suffix: &'a str,
) -> impl Iterator<Item = String> + 'a {
    fields.iter().map(move |f| {
        if other.contains(f) {
            format!("{}{}", f.header(), suffix)
        } else {
            f.header().to_string()
        }
    })
}

/// Join two already-loaded tables.
///
/// Only genes present in both tables survive; output follows the first
/// table's row order. A gene repeated within one table is matched on its
/// first occurrence only.
pub fn merge_tables(first: &ComparisonTable, second: &ComparisonTable) -> MergedTable {
    let mut second_index: HashMap<&str, &ResultRecord> = HashMap::with_capacity(second.n_genes());
    for record in &second.records {
        second_index.entry(record.gene_id.as_str()).or_insert(record);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let records: Vec<MergedRecord> = first
        .records
        .iter()
        .filter(|r| seen.insert(r.gene_id.as_str()))
        .filter_map(|r| {
            second_index.get(r.gene_id.as_str()).map(|other| MergedRecord {
                gene_id: r.gene_id.clone(),
                first: r.clone(),
                second: (*other).clone(),
            })
        })
        .collect();

    log::debug!(
        "Merged {} and {}: {} of {} / {} genes in common",
        first.source,
        second.source,
        records.len(),
        first.n_genes(),
        second.n_genes()
    );

    MergedTable {
        first_source: first.source.clone(),
        second_source: second.source.clone(),
        first_fields: first.fields.clone(),
        second_fields: second.fields.clone(),
        records,
    }
}

/// Load two comparison files and join them on gene identifier
pub fn merge<P: AsRef<Path>, Q: AsRef<Path>>(
    loader: &ResultLoader,
    first: P,
    second: Q,
) -> Result<MergedTable> {
    let first = loader.load(first)?;
    let second = loader.load(second)?;
    Ok(merge_tables(&first, &second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn rec(gene: &str, lfc: f64) -> ResultRecord {
        let mut r = ResultRecord::new(gene);
        r.log2_fold_change = Some(lfc);
        r
    }

    fn table(source: &str, genes: &[(&str, f64)]) -> ComparisonTable {
        ComparisonTable::new(
            source,
            vec![Field::Log2FoldChange],
            genes.iter().map(|&(g, l)| rec(g, l)).collect(),
        )
    }

    #[test]
    fn test_inner_join_keeps_common_genes() {
        let a = table("a", &[("g1", 1.0), ("g2", 2.0), ("g3", 3.0)]);
        let b = table("b", &[("g3", -3.0), ("g4", -4.0), ("g1", -1.0)]);

        let merged = merge_tables(&a, &b);
        let genes: Vec<_> = merged.records.iter().map(|r| r.gene_id.as_str()).collect();
        assert_eq!(genes, vec!["g1", "g3"]);
        assert_eq!(merged.records[0].first.log2_fold_change, Some(1.0));
        assert_eq!(merged.records[0].second.log2_fold_change, Some(-1.0));
        assert!(merged.n_genes() <= a.n_genes().min(b.n_genes()));
    }

    #[test]
    fn test_every_merged_gene_is_in_both_inputs() {
        let a = table("a", &[("x", 1.0), ("y", 1.0), ("y", 5.0), ("z", 1.0)]);
        let b = table("b", &[("y", 1.0), ("z", 1.0), ("z", 9.0)]);

        let merged = merge_tables(&a, &b);
        assert!(merged.n_genes() <= a.n_genes().min(b.n_genes()));
        for r in &merged.records {
            assert!(a.records.iter().any(|x| x.gene_id == r.gene_id));
            assert!(b.records.iter().any(|x| x.gene_id == r.gene_id));
        }
        assert_eq!(merged.records[0].first.log2_fold_change, Some(1.0));
        assert_eq!(merged.records[1].second.log2_fold_change, Some(1.0));
    }

    #[test]
    fn test_disjoint_tables_merge_empty() {
        let a = table("a", &[("x", 1.0)]);
        let b = table("b", &[("y", 1.0)]);
        assert_eq!(merge_tables(&a, &b).n_genes(), 0);
    }

    #[test]
    fn test_one_sided_column_keeps_bare_header() {
        let mut a = table("a", &[("g", 1.0)]);
        a.fields = vec![Field::Log2FoldChange, Field::Padj];
        let b = table("b", &[("g", 2.0)]);

        let merged = merge_tables(&a, &b);
        assert_eq!(
            merged.headers(),
            vec!["gene_symbol", "log2FoldChange_1", "padj", "log2FoldChange_2"]
        );
        assert_eq!(merged.row_cells(&merged.records[0]), vec!["g", "1", "", "2"]);
        assert!(!merged.both_have(Field::Padj));
        assert!(merged.both_have(Field::Log2FoldChange));
    }

    #[test]
    fn test_shared_columns_are_suffixed_on_both_sides() {
        let mut a = table("a", &[("g", 1.0)]);
        a.fields = vec![Field::BaseMean, Field::Log2FoldChange];
        let mut b = table("b", &[("g", 2.0)]);
        b.fields = vec![Field::Log2FoldChange, Field::PValue];

        let headers = merge_tables(&a, &b).headers();
        assert_eq!(
            headers,
            vec!["gene_symbol", "baseMean", "log2FoldChange_1", "log2FoldChange_2", "pvalue"]
        );
    }

    #[test]
    fn test_merge_propagates_load_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "gene_symbol\tlog2FoldChange").unwrap();
        writeln!(file, "g\t1.0").unwrap();

        let loader = ResultLoader::new();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.tsv");

        assert!(matches!(
            merge(&loader, file.path(), &missing),
            Err(DashboardError::NotFound { .. })
        ));
        assert_eq!(merge(&loader, file.path(), file.path()).unwrap().n_genes(), 1);
    }
}
