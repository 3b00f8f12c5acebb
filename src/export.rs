//! Enriched dataset export.
//!
//! Projects the analyzed rows back onto the source table: the normalised
//! source columns in analysis order, followed by the derived columns.

use polars::prelude::*;
use std::io::Write;
use tracing::info;

use crate::analyzer::Analysis;
use crate::constants::columns;
use crate::dataset::Dataset;
use crate::error::{Result, WeatherError};
use crate::models::EnrichedDataset;

/// Build the enriched table for an analyzed dataset
pub fn enriched_frame(dataset: &Dataset, enriched: &EnrichedDataset) -> Result<DataFrame> {
    let order: Vec<IdxSize> = enriched
        .rows
        .iter()
        .map(|row| row.source_row as IdxSize)
        .collect();
    let mut frame = dataset
        .frame()
        .take(&IdxCa::from_vec("order".into(), order))?;

    let labels: Vec<String> = enriched
        .rows
        .iter()
        .map(|row| row.comfort_index.to_string())
        .collect();
    let temp_z: Vec<f64> = enriched.rows.iter().map(|row| row.temp_zscore).collect();
    let humidity_z: Vec<f64> = enriched
        .rows
        .iter()
        .map(|row| row.humidity_zscore)
        .collect();

    frame.with_column(Series::new(columns::COMFORT_INDEX.into(), labels))?;
    frame.with_column(Series::new(columns::TEMP_ZSCORE.into(), temp_z))?;
    frame.with_column(Series::new(columns::HUMIDITY_ZSCORE.into(), humidity_z))?;

    if enriched.dated {
        let diffs: Vec<f64> = enriched
            .rows
            .iter()
            .map(|row| row.temp_diff.unwrap_or(0.0))
            .collect();
        let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
        frame.with_column(Series::new(columns::TEMP_DIFF.into(), diffs))?;
        frame.with_column(Series::new(columns::ABS_DIFF.into(), abs_diffs))?;
    }

    Ok(frame)
}

/// Write the enriched dataset as CSV, returning the number of rows written
pub fn write_enriched_csv<W: Write>(
    dataset: &Dataset,
    analysis: &Analysis,
    writer: W,
) -> Result<usize> {
    let enriched = analysis.enriched.as_ref().ok_or_else(|| {
        let reason = analysis
            .report
            .error()
            .map(|error| format!("dataset was rejected ({})", error))
            .unwrap_or_else(|| "analysis produced no rows".to_string());
        WeatherError::nothing_to_export(reason)
    })?;

    let mut frame = enriched_frame(dataset, enriched)?;
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut frame)?;

    info!(
        "Exported {} enriched rows with {} columns",
        frame.height(),
        frame.width()
    );
    Ok(frame.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::run;

    fn analyzed(csv: &str) -> (Dataset, Analysis) {
        let dataset = Dataset::from_csv_bytes(csv.as_bytes().to_vec()).unwrap();
        let analysis = run(&dataset).unwrap();
        (dataset, analysis)
    }

    #[test]
    fn test_export_dated_dataset() {
        let (dataset, analysis) = analyzed(
            "Date,Temperature,Humidity,Station\n2024-01-02,30,50,B\n2024-01-01,20,50,A\n",
        );

        let mut buffer = Vec::new();
        let written = write_enriched_csv(&dataset, &analysis, &mut buffer).unwrap();
        assert_eq!(written, 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "date,temperature,humidity,station,comfort_index,temp_zscore,humidity_zscore,temp_diff,abs_diff"
        );
        // rows follow date order
        assert!(lines[1].starts_with("2024-01-01,20,50,A,"));
        assert!(lines[2].starts_with("2024-01-02,30,50,B,"));
        assert!(lines[2].ends_with(",10.0,10.0"));
    }

    #[test]
    fn test_export_undated_dataset_has_no_diff_columns() {
        let (dataset, analysis) = analyzed("temperature,humidity\n25,50\n18,40\n");
        let frame = enriched_frame(&dataset, analysis.enriched.as_ref().unwrap()).unwrap();

        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "temperature",
                "humidity",
                "comfort_index",
                "temp_zscore",
                "humidity_zscore"
            ]
        );

        let labels = frame.column("comfort_index").unwrap();
        let labels = labels.as_materialized_series().str().unwrap();
        assert_eq!(labels.get(0), Some("Comfortable 😊"));
        assert_eq!(labels.get(1), Some("Mild and Pleasant 🌤️"));
    }

    #[test]
    fn test_rejected_dataset_cannot_be_exported() {
        let (dataset, analysis) = analyzed("temperature\n25\n");
        let result = write_enriched_csv(&dataset, &analysis, Vec::<u8>::new());
        match result {
            Err(WeatherError::NothingToExport { reason }) => {
                assert!(reason.contains("Missing columns: humidity"));
            }
            other => panic!("Expected NothingToExport, got {:?}", other),
        }
    }
}
