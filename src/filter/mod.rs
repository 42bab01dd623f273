//! Row filters shared by the dashboard views

/// Default adjusted p-value (FDR) threshold
pub const DEFAULT_FDR: f64 = 0.05;
/// Default |log2 fold change| threshold
pub const DEFAULT_LFC: f64 = 1.0;
/// padj cutoff used by the scatter view's "significant in either" switch
pub const SCATTER_SIG_PADJ: f64 = 0.05;

/// Strict threshold test: `p < p_threshold` and `|lfc| > lfc_threshold`.
///
/// Missing values never pass, and values exactly at a threshold are excluded.
pub fn passes_thresholds(
    p: Option<f64>,
    lfc: Option<f64>,
    p_threshold: f64,
    lfc_threshold: f64,
) -> bool {
    match (p, lfc) {
        (Some(p), Some(lfc)) => p < p_threshold && lfc.abs() > lfc_threshold,
        _ => false,
    }
}

/// Case-insensitive substring search on gene identifiers
#[derive(Debug, Clone, Default)]
pub struct GeneSearch {
    needle: Option<String>,
}

impl GeneSearch {
    /// Build a search from user input; blank input matches everything
    pub fn new(query: Option<&str>) -> Self {
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_uppercase);
        Self { needle }
    }

    pub fn matches(&self, gene_id: &str) -> bool {
        match &self.needle {
            Some(needle) => gene_id.to_uppercase().contains(needle.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_strict() {
        assert!(passes_thresholds(Some(0.01), Some(2.0), 0.05, 1.0));
        assert!(passes_thresholds(Some(0.01), Some(-2.0), 0.05, 1.0));
        assert!(!passes_thresholds(Some(0.05), Some(2.0), 0.05, 1.0));
        assert!(!passes_thresholds(Some(0.01), Some(1.0), 0.05, 1.0));
        assert!(!passes_thresholds(Some(0.01), Some(-1.0), 0.05, 1.0));
        assert!(!passes_thresholds(None, Some(2.0), 0.05, 1.0));
        assert!(!passes_thresholds(Some(0.01), None, 0.05, 1.0));
    }

    #[test]
    fn test_gene_search() {
        let search = GeneSearch::new(Some("lif"));
        assert!(search.matches("Lifr"));
        assert!(search.matches("LIF"));
        assert!(!search.matches("Kdr"));

        let blank = GeneSearch::new(Some("   "));
        assert!(blank.matches("anything"));
        assert!(GeneSearch::new(None).matches("x"));
    }
}
