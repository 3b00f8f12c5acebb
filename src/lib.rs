//! Weather Comfort Library
//!
//! Analyzes a CSV of weather observations (temperature and humidity, with
//! optional date and condition columns) and produces a structured report.
//!
//! This library provides tools for:
//! - Loading CSV input into a polars frame with normalised column names
//! - Validating and coercing the frame into typed observation rows
//! - Rule-based comfort classification of every reading
//! - Summary statistics, heat wave and hot/cold day alerts
//! - Day-to-day and z-score anomaly detection, extreme day flags
//! - Chart-ready series and enriched CSV export
//!
//! ```no_run
//! use weather_comfort::{Dataset, analyze};
//!
//! let dataset = Dataset::from_csv_path("readings.csv".as_ref())?;
//! let report = analyze(&dataset)?;
//! if let Some(error) = report.error() {
//!     eprintln!("{}", error);
//! }
//! # Ok::<(), weather_comfort::WeatherError>(())
//! ```

pub mod analyzer;
pub mod cli;
pub mod comfort;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod export;
pub mod models;
pub mod render;
pub mod stats;

// Re-export commonly used types
pub use analyzer::{Analysis, analyze, analyze_frame};
pub use comfort::{ComfortLabel, classify, classify_raw};
pub use config::{AppConfig, OutputFormat};
pub use dataset::Dataset;
pub use error::{Result, ValidationError, WeatherError};
pub use models::{AnalysisReport, Report, Summary};
