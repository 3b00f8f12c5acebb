//! Error handling for weather dataset analysis.
//!
//! Two layers: [`ValidationError`] describes datasets the analyzer rejects
//! (these end up inside a report, never as a fault), while [`WeatherError`]
//! covers everything the caller has to deal with itself.

use thiserror::Error;

/// Reasons a dataset is rejected before any numeric work is done.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("CSV file is empty")]
    EmptyDataset,

    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Invalid data in Temperature/Humidity columns")]
    InvalidData { column: &'static str },
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid date '{value}' in data row {row}")]
    DateParse { row: usize, value: String },

    #[error("Duplicate column '{name}' after normalising column names")]
    DuplicateColumn { name: String },

    #[error("Nothing to export: {reason}")]
    NothingToExport { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WeatherError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a nothing-to-export error
    pub fn nothing_to_export(reason: impl Into<String>) -> Self {
        Self::NothingToExport {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_names() {
        let error = ValidationError::MissingColumns(vec!["temperature", "humidity"]);
        assert_eq!(error.to_string(), "Missing columns: temperature, humidity");
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let error: WeatherError = ValidationError::EmptyDataset.into();
        assert_eq!(error.to_string(), "CSV file is empty");
    }
}
