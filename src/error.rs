//! Error types for the DESeq2 dashboard

use thiserror::Error;

/// Main error type for dashboard operations
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Missing required columns in {path}: {}", missing.join(", "))]
    Schema { path: String, missing: Vec<String> },

    #[error("{reason}")]
    Validation { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DashboardError {
    /// Shorthand for a user-facing validation failure
    pub fn validation(reason: impl Into<String>) -> Self {
        DashboardError::Validation {
            reason: reason.into(),
        }
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_message_lists_columns() {
        let err = DashboardError::Schema {
            path: "a.tsv".to_string(),
            missing: vec!["gene_symbol".to_string(), "log2FoldChange".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required columns in a.tsv: gene_symbol, log2FoldChange"
        );
    }

    #[test]
    fn test_validation_message_is_bare() {
        let err = DashboardError::validation("Please select two different comparisons");
        assert_eq!(err.to_string(), "Please select two different comparisons");
    }
}
