/// Error types for the water balance engine
use thiserror::Error;

/// Main error type for water balance operations
#[derive(Error, Debug)]
pub enum BalanceError {
    /// A measured value, override or volume is unusable
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A required selection is missing or unknown
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failed to parse a golden numbers or standards table
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),
}

impl BalanceError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        BalanceError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Type alias for Results using BalanceError
pub type Result<T> = std::result::Result<T, BalanceError>;
