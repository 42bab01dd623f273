//! DESeq2 result table structures

use serde::{Deserialize, Serialize};

/// Placeholder identifier for rows whose gene column was empty or NA.
/// Kept as a string so every record has an identifier; excluded from DEG sets.
pub const MISSING_GENE_ID: &str = "nan";

/// Numeric columns of a DESeq2 results table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    BaseMean,
    Log2FoldChange,
    LfcSe,
    Stat,
    PValue,
    Padj,
}

impl Field {
    /// All known numeric columns, in the order DESeq2 writes them
    pub const ALL: [Field; 6] = [
        Field::BaseMean,
        Field::Log2FoldChange,
        Field::LfcSe,
        Field::Stat,
        Field::PValue,
        Field::Padj,
    ];

    /// Column header as written by DESeq2
    pub fn header(self) -> &'static str {
        match self {
            Field::BaseMean => "baseMean",
            Field::Log2FoldChange => "log2FoldChange",
            Field::LfcSe => "lfcSE",
            Field::Stat => "stat",
            Field::PValue => "pvalue",
            Field::Padj => "padj",
        }
    }

    /// Look up a field by its header name
    pub fn from_header(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.header() == name)
    }
}

/// One row of a DESeq2 comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Gene identifier (gene symbol)
    pub gene_id: String,
    /// Mean of normalized counts
    pub base_mean: Option<f64>,
    /// Log2 fold change
    pub log2_fold_change: Option<f64>,
    /// Standard error of the log2 fold change
    pub lfc_se: Option<f64>,
    /// Wald statistic
    pub stat: Option<f64>,
    /// Raw p-value
    pub pvalue: Option<f64>,
    /// BH adjusted p-value
    pub padj: Option<f64>,
}

impl ResultRecord {
    /// Create a record with only a gene identifier
    pub fn new(gene_id: impl Into<String>) -> Self {
        Self {
            gene_id: gene_id.into(),
            base_mean: None,
            log2_fold_change: None,
            lfc_se: None,
            stat: None,
            pvalue: None,
            padj: None,
        }
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::BaseMean => self.base_mean,
            Field::Log2FoldChange => self.log2_fold_change,
            Field::LfcSe => self.lfc_se,
            Field::Stat => self.stat,
            Field::PValue => self.pvalue,
            Field::Padj => self.padj,
        }
    }

    /// Set a numeric field. Non-finite values are stored as missing.
    pub fn set(&mut self, field: Field, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        match field {
            Field::BaseMean => self.base_mean = value,
            Field::Log2FoldChange => self.log2_fold_change = value,
            Field::LfcSe => self.lfc_se = value,
            Field::Stat => self.stat = value,
            Field::PValue => self.pvalue = value,
            Field::Padj => self.padj = value,
        }
    }

    /// Absolute log2 fold change, if present
    pub fn abs_lfc(&self) -> Option<f64> {
        self.log2_fold_change.map(f64::abs)
    }

    /// Whether the gene identifier is the missing marker
    pub fn has_missing_gene(&self) -> bool {
        self.gene_id == MISSING_GENE_ID
    }
}

/// A parsed DESeq2 results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    /// Path the table was loaded from
    pub source: String,
    /// Numeric columns present in the file, in file order
    pub fields: Vec<Field>,
    /// Rows in file order
    pub records: Vec<ResultRecord>,
}

impl ComparisonTable {
    pub fn new(source: impl Into<String>, fields: Vec<Field>, records: Vec<ResultRecord>) -> Self {
        Self {
            source: source.into(),
            fields,
            records,
        }
    }

    /// Get number of genes
    pub fn n_genes(&self) -> usize {
        self.records.len()
    }

    /// Whether the file carried the given column
    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Column used for significance: padj when present, otherwise pvalue
    pub fn significance_field(&self) -> Option<Field> {
        if self.has_field(Field::Padj) {
            Some(Field::Padj)
        } else if self.has_field(Field::PValue) {
            Some(Field::PValue)
        } else {
            None
        }
    }

    /// Summary counts at the given thresholds
    pub fn summary(&self, alpha: f64, lfc_threshold: f64) -> ResultsSummary {
        let p_field = self.significance_field();
        let mut summary = ResultsSummary {
            source: self.source.clone(),
            total_genes: self.n_genes(),
            genes_tested: 0,
            upregulated: 0,
            downregulated: 0,
            alpha,
            lfc_threshold,
        };

        for record in &self.records {
            let p = p_field.and_then(|f| record.get(f));
            if p.is_some() {
                summary.genes_tested += 1;
            }
            if let (Some(p), Some(lfc)) = (p, record.log2_fold_change) {
                if p < alpha && lfc.abs() > lfc_threshold {
                    if lfc > 0.0 {
                        summary.upregulated += 1;
                    } else {
                        summary.downregulated += 1;
                    }
                }
            }
        }

        summary
    }
}

/// Per-table DEG counts, printed by the CLI
#[derive(Debug, Clone)]
pub struct ResultsSummary {
    pub source: String,
    pub total_genes: usize,
    pub genes_tested: usize,
    pub upregulated: usize,
    pub downregulated: usize,
    pub alpha: f64,
    pub lfc_threshold: f64,
}

impl std::fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.source)?;
        writeln!(f, "  Total genes: {}", self.total_genes)?;
        writeln!(f, "  Genes with p-values: {}", self.genes_tested)?;
        writeln!(
            f,
            "  Significant (p < {}, |log2FC| > {}): {}",
            self.alpha,
            self.lfc_threshold,
            self.upregulated + self.downregulated
        )?;
        writeln!(f, "    Up-regulated: {}", self.upregulated)?;
        write!(f, "    Down-regulated: {}", self.downregulated)
    }
}
