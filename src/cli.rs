//! Command-line interface components.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::analyzer;
use crate::config::{AppConfig, OutputFormat};
use crate::constants::DEFAULT_EXPORT_FILENAME;
use crate::dataset::Dataset;
use crate::export;
use crate::render;

#[derive(Parser, Debug)]
#[command(name = "weather-comfort")]
#[command(about = "Analyze a CSV of weather observations: comfort, statistics and anomalies")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// CSV file with temperature and humidity columns (date and condition optional)
    #[arg(value_name = "CSV_FILE")]
    pub input: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the enriched dataset as CSV (defaults to weather_analysis.csv)
    #[arg(
        short,
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_EXPORT_FILENAME
    )]
    pub export: Option<PathBuf>,

    /// Directory uploads are staged in before analysis
    #[arg(long, value_name = "DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Keep the staged copy of the upload
    #[arg(long)]
    pub keep_upload: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Build the invocation config from the parsed arguments
    pub fn to_config(&self) -> AppConfig {
        let mut config = AppConfig::default().with_output_format(self.format);
        if let Some(upload_dir) = &self.upload_dir {
            config = config.with_upload_dir(upload_dir);
        }
        if let Some(export) = &self.export {
            config = config.with_export_path(export);
        }
        if self.keep_upload {
            config = config.with_keep_upload();
        }
        config
    }
}

/// How an invocation ended when no fault occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A full report was produced
    Completed,
    /// The dataset failed validation; the report carries the reason
    Rejected,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::Rejected => 2,
        }
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("weather_comfort={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to install log subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Stage, analyze, render and optionally export one input file
pub fn run(args: &Args) -> Result<Outcome> {
    let config = args.to_config();
    config.validate()?;

    let staged = upload::stage(&args.input, &config)?;
    let outcome = process(staged.path(), &config).context("Error processing file");
    let cleanup = staged.finish(config.keep_upload);

    settle(outcome, cleanup)
}

/// Combine the processing result with the staging cleanup result.
/// A processing error takes precedence; a cleanup failure alongside it is logged.
fn settle(outcome: Result<Outcome>, cleanup: Result<Option<PathBuf>>) -> Result<Outcome> {
    match (outcome, cleanup) {
        (Err(error), Err(cleanup_error)) => {
            warn!("Failed to clean up staged upload: {:#}", cleanup_error);
            Err(error)
        }
        (outcome, cleanup) => {
            cleanup?;
            outcome
        }
    }
}

fn process(path: &std::path::Path, config: &AppConfig) -> Result<Outcome> {
    let dataset = Dataset::from_csv_path(path)?;
    let analysis = analyzer::run(&dataset)?;

    // the report is final at this point; render exactly once
    println!("{}", render::render(&analysis.report, config.output_format)?);

    if analysis.report.is_rejected() {
        if config.export_path.is_some() {
            warn!("Skipping export because the dataset was rejected");
        }
        return Ok(Outcome::Rejected);
    }

    if let Some(export_path) = &config.export_path {
        let file = File::create(export_path)
            .with_context(|| format!("Failed to create {}", export_path.display()))?;
        let rows = export::write_enriched_csv(&dataset, &analysis, BufWriter::new(file))?;
        info!("Wrote {} rows to {}", rows, export_path.display());
    }

    Ok(Outcome::Completed)
}

/// Upload staging. Inputs are copied into the configured upload directory
/// and analyzed from there.
pub mod upload {
    use super::*;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// A staged copy of an input file
    #[derive(Debug)]
    pub struct StagedUpload {
        file: NamedTempFile,
    }

    impl StagedUpload {
        pub fn path(&self) -> &Path {
            self.file.path()
        }

        /// Keep or discard the staged copy, returning where it was kept
        pub fn finish(self, keep: bool) -> Result<Option<PathBuf>> {
            if keep {
                let (_, path) = self
                    .file
                    .keep()
                    .context("Failed to keep staged upload")?;
                info!("Staged upload kept at {}", path.display());
                Ok(Some(path))
            } else {
                let path = self.file.path().to_path_buf();
                self.file
                    .close()
                    .context("Failed to remove staged upload")?;
                debug!("Removed staged upload {}", path.display());
                Ok(None)
            }
        }
    }

    /// Copy `source` into the configured upload directory
    pub fn stage(source: &Path, config: &AppConfig) -> Result<StagedUpload> {
        if !source.is_file() {
            anyhow::bail!("Input file not found: {}", source.display());
        }

        fs::create_dir_all(&config.upload_dir).with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_dir.display()
            )
        })?;

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", stem))
            .suffix(".csv")
            .tempfile_in(&config.upload_dir)
            .context("Failed to create staged upload")?;

        let mut input = fs::File::open(source)
            .with_context(|| format!("Failed to open {}", source.display()))?;
        let bytes = io::copy(&mut input, file.as_file_mut())
            .context("Failed to copy input into upload directory")?;

        debug!(
            "Staged {} ({} bytes) at {}",
            source.display(),
            bytes,
            file.path().display()
        );
        Ok(StagedUpload { file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args_for(input: PathBuf) -> Args {
        Args {
            input,
            format: OutputFormat::Json,
            export: None,
            upload_dir: None,
            keep_upload: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_parse_arguments() {
        let args = Args::try_parse_from([
            "weather-comfort",
            "data.csv",
            "--format",
            "json",
            "--export",
            "--upload-dir",
            "/tmp/uploads",
        ])
        .unwrap();
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.export, Some(PathBuf::from("weather_analysis.csv")));
        assert_eq!(args.get_log_level(), "info");

        let config = args.to_config();
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/uploads"));
        assert_eq!(config.export_path, Some(PathBuf::from("weather_analysis.csv")));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["weather-comfort", "a.csv", "-v", "-q"]).is_err());
        let quiet = Args::try_parse_from(["weather-comfort", "a.csv", "-q"]).unwrap();
        assert_eq!(quiet.get_log_level(), "error");
    }

    #[test]
    fn test_stage_and_discard_upload() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("readings.csv");
        fs_write(&source, "temperature,humidity\n20,50\n");

        let config = AppConfig::default().with_upload_dir(temp_dir.path().join("uploads"));
        let staged = upload::stage(&source, &config).unwrap();
        let staged_path = staged.path().to_path_buf();
        assert!(staged_path.starts_with(temp_dir.path().join("uploads")));
        assert_eq!(
            std::fs::read_to_string(&staged_path).unwrap(),
            "temperature,humidity\n20,50\n"
        );

        assert_eq!(staged.finish(false).unwrap(), None);
        assert!(!staged_path.exists());
    }

    #[test]
    fn test_stage_and_keep_upload() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("readings.csv");
        fs_write(&source, "temperature,humidity\n20,50\n");

        let config = AppConfig::default().with_upload_dir(temp_dir.path());
        let kept = upload::stage(&source, &config)
            .unwrap()
            .finish(true)
            .unwrap()
            .unwrap();
        assert!(kept.exists());
        assert!(kept.file_name().unwrap().to_string_lossy().starts_with("readings-"));
    }

    #[test]
    fn test_stage_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::default().with_upload_dir(temp_dir.path());
        assert!(upload::stage(&temp_dir.path().join("missing.csv"), &config).is_err());
    }

    #[test]
    fn test_run_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.csv");
        fs_write(&good, "temperature,humidity,date\n20,50,2024-01-01\n27,55,2024-01-02\n");
        let export = temp_dir.path().join("enriched.csv");

        let mut args = args_for(good);
        args.upload_dir = Some(temp_dir.path().join("uploads"));
        args.export = Some(export.clone());
        assert_eq!(run(&args).unwrap(), Outcome::Completed);
        assert!(export.exists());

        let bad = temp_dir.path().join("bad.csv");
        fs_write(&bad, "temperature\n20\n");
        let mut args = args_for(bad);
        args.upload_dir = Some(temp_dir.path().join("uploads"));
        assert_eq!(run(&args).unwrap(), Outcome::Rejected);

        let broken = temp_dir.path().join("broken.csv");
        fs_write(&broken, "temperature,humidity,date\n20,50,soon\n");
        let mut args = args_for(broken);
        args.upload_dir = Some(temp_dir.path().join("uploads"));
        let error = run(&args).unwrap_err();
        assert!(format!("{:#}", error).starts_with("Error processing file"));

        // staged copies are cleaned up after every run
        let leftovers = std::fs::read_dir(temp_dir.path().join("uploads"))
            .unwrap()
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_processing_error_survives_failed_cleanup() {
        let error = settle(
            Err(anyhow::anyhow!("Error processing file")),
            Err(anyhow::anyhow!("Failed to remove staged upload")),
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "Error processing file");

        let error = settle(
            Ok(Outcome::Completed),
            Err(anyhow::anyhow!("Failed to remove staged upload")),
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "Failed to remove staged upload");

        assert_eq!(settle(Ok(Outcome::Rejected), Ok(None)).unwrap(), Outcome::Rejected);
    }

    fn fs_write(path: &std::path::Path, contents: &str) {
        std::fs::write(path, contents).unwrap();
    }
}
