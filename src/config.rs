//! Configuration for the command-line front end.
//!
//! The analysis core takes no configuration of its own; everything here
//! concerns where uploads are staged and how results leave the process.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::constants::{APP_DIR_NAME, UPLOAD_DIR_NAME};
use crate::error::{Result, WeatherError};

/// How a finished report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored human-readable sections
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Settings for one analysis invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory input files are copied into before analysis
    pub upload_dir: PathBuf,

    /// Report rendering format
    pub output_format: OutputFormat,

    /// Where to write the enriched dataset, if requested
    pub export_path: Option<PathBuf>,

    /// Keep the staged upload after the run
    pub keep_upload: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_format: OutputFormat::Text,
            export_path: None,
            keep_upload: false,
        }
    }
}

/// Staging directory under the user cache dir, falling back to the temp dir
pub fn default_upload_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(UPLOAD_DIR_NAME)
}

impl AppConfig {
    /// Set the upload staging directory
    pub fn with_upload_dir(mut self, upload_dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = upload_dir.into();
        self
    }

    /// Set the report format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Request an enriched CSV export
    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = Some(path.into());
        self
    }

    /// Keep the staged upload instead of deleting it
    pub fn with_keep_upload(mut self) -> Self {
        self.keep_upload = true;
        self
    }

    /// Check the settings before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(WeatherError::configuration(
                "upload directory must not be empty",
            ));
        }

        if self.upload_dir.is_file() {
            return Err(WeatherError::configuration(format!(
                "upload directory {} is an existing file",
                self.upload_dir.display()
            )));
        }

        if let Some(export_path) = &self.export_path {
            if export_path.is_dir() {
                return Err(WeatherError::configuration(format!(
                    "export path {} is a directory",
                    export_path.display()
                )));
            }
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}
