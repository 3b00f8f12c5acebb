//! Dataset analysis engine.
//!
//! Runs the four analysis phases over one dataset:
//! 1. Validation: typed row extraction, rejecting unusable datasets
//! 2. Enrichment: comfort label and z-scores per row
//! 3. Aggregation: summary statistics and histograms
//! 4. Time series (dated datasets only): date sort, day-to-day differences,
//!    anomaly lists, extreme days and chart series
//!
//! Validation failures are reported inside the returned [`Report`]; only
//! unexpected faults such as malformed dates surface as errors.

use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use crate::comfort::{ComfortLabel, classify};
use crate::constants::{DAY_FORMAT, columns, thresholds};
use crate::dataset::Dataset;
use crate::error::{Result, ValidationError, WeatherError};
use crate::models::{
    AnalysisReport, ChartData, EnrichedDataset, EnrichedObservation, ExtremeDay, ExtremeKind,
    Observation, Report, Summary, TemperatureAnomaly, ZScoreAnomaly,
};
use crate::stats::{Describe, Histogram, round2, z_scores};

/// Report plus the enriched rows it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub report: Report,
    /// Absent when the dataset was rejected
    pub enriched: Option<EnrichedDataset>,
}

impl Analysis {
    fn rejected(error: ValidationError) -> Self {
        Self {
            report: Report::rejected(error),
            enriched: None,
        }
    }
}

/// Analyze a dataset and return its report
pub fn analyze(dataset: &Dataset) -> Result<Report> {
    run(dataset).map(|analysis| analysis.report)
}

/// Analyze an in-memory frame with arbitrary column casing
pub fn analyze_frame(frame: DataFrame) -> Result<Report> {
    analyze(&Dataset::from_frame(frame)?)
}

/// Analyze a dataset, keeping the enriched rows for export
pub fn run(dataset: &Dataset) -> Result<Analysis> {
    let observations = match dataset.observations() {
        Ok(observations) => observations,
        Err(WeatherError::Validation(error)) => {
            warn!("Dataset rejected: {}", error);
            return Ok(Analysis::rejected(error));
        }
        Err(error) => return Err(error),
    };

    debug!("Validated {} observations", observations.len());

    let mut rows = enrich(observations);
    let summary = summarize(&rows);

    let conditions = dataset.has_column(columns::CONDITION).then(|| {
        Histogram::from_values(
            rows.iter()
                .filter_map(|row| row.observation.condition.clone()),
        )
    });

    let dated = dataset.is_dated();
    let report = if dated {
        sort_by_date(&mut rows);
        apply_temperature_diffs(&mut rows);

        AnalysisReport {
            summary,
            conditions,
            anomalies: temperature_anomalies(&rows),
            extreme_days: extreme_days(&rows),
            z_anomalies: z_score_anomalies(&rows),
            chart_data: chart_series(&rows),
        }
    } else {
        debug!("No date column, skipping time-series phase");
        AnalysisReport {
            summary,
            conditions,
            anomalies: Vec::new(),
            extreme_days: Vec::new(),
            z_anomalies: Vec::new(),
            chart_data: ChartData::default(),
        }
    };

    info!(
        "Analyzed {} rows: {} temperature anomalies, {} extreme days, {} z-score anomalies",
        rows.len(),
        report.anomalies.len(),
        report.extreme_days.len(),
        report.z_anomalies.len()
    );

    Ok(Analysis {
        report: Report::Complete(Box::new(report)),
        enriched: Some(EnrichedDataset { rows, dated }),
    })
}

/// Attach comfort labels and z-scores, keeping source order
fn enrich(observations: Vec<Observation>) -> Vec<EnrichedObservation> {
    let temperatures: Vec<f64> = observations.iter().map(|o| o.temperature).collect();
    let humidities: Vec<f64> = observations.iter().map(|o| o.humidity).collect();
    let temp_z = z_scores(&temperatures);
    let humidity_z = z_scores(&humidities);

    observations
        .into_iter()
        .enumerate()
        .map(|(row, observation)| EnrichedObservation {
            source_row: row,
            comfort_index: classify(observation.temperature, observation.humidity),
            temp_zscore: temp_z[row],
            humidity_zscore: humidity_z[row],
            temp_diff: None,
            abs_diff: None,
            observation,
        })
        .collect()
}

fn summarize(rows: &[EnrichedObservation]) -> Summary {
    let temperatures: Vec<f64> = rows.iter().map(|r| r.observation.temperature).collect();
    let humidities: Vec<f64> = rows.iter().map(|r| r.observation.humidity).collect();

    // rows are non-empty once validation has passed
    let temp = Describe::new(&temperatures).unwrap_or_else(empty_describe);
    let humidity = Describe::new(&humidities).unwrap_or_else(empty_describe);

    let comfort_distribution = Histogram::from_values(rows.iter().map(|r| r.comfort_index));
    let most_common_comfort = comfort_distribution
        .most_common()
        .copied()
        .unwrap_or(ComfortLabel::DataError);

    let hot_rows = temperatures
        .iter()
        .filter(|t| **t > thresholds::HEAT_WAVE_TEMP)
        .count();
    let heat_wave = if hot_rows >= thresholds::HEAT_WAVE_MIN_DAYS {
        thresholds::HEAT_WAVE_FLAG
    } else {
        0
    };

    Summary {
        max_temp: round2(temp.max),
        min_temp: round2(temp.min),
        avg_temp: round2(temp.mean),
        max_humidity: round2(humidity.max),
        min_humidity: round2(humidity.min),
        avg_humidity: round2(humidity.mean),
        hot_day_alert: temp.max >= thresholds::HOT_DAY_TEMP,
        cold_day_alert: temp.min <= thresholds::COLD_DAY_TEMP,
        most_common_comfort,
        heat_wave,
        comfort_distribution,
        temp_std: temp.sample_std.map(round2),
        humidity_std: humidity.sample_std.map(round2),
    }
}

fn empty_describe() -> Describe {
    Describe {
        count: 0,
        min: f64::NAN,
        max: f64::NAN,
        mean: f64::NAN,
        population_std: f64::NAN,
        sample_std: None,
    }
}

/// Stable ascending sort; rows sharing a date keep their source order
fn sort_by_date(rows: &mut [EnrichedObservation]) {
    rows.sort_by(|a, b| a.observation.date.cmp(&b.observation.date));
}

fn apply_temperature_diffs(rows: &mut [EnrichedObservation]) {
    let mut previous: Option<f64> = None;
    for row in rows.iter_mut() {
        let diff = previous.map_or(0.0, |prev| row.observation.temperature - prev);
        row.temp_diff = Some(diff);
        row.abs_diff = Some(diff.abs());
        previous = Some(row.observation.temperature);
    }
}

/// Moderate jumps: strictly above the lower bound, up to and including the upper
fn is_moderate_jump(abs_diff: f64) -> bool {
    abs_diff > thresholds::ANOMALY_MIN_JUMP && abs_diff <= thresholds::ANOMALY_MAX_JUMP
}

fn temperature_anomalies(rows: &[EnrichedObservation]) -> Vec<TemperatureAnomaly> {
    rows.iter()
        .filter_map(|row| {
            let date = row.observation.date?;
            let diff = row.temp_diff?;
            is_moderate_jump(diff.abs()).then_some(TemperatureAnomaly {
                date,
                temperature_change: diff,
            })
        })
        .collect()
}

fn z_score_anomalies(rows: &[EnrichedObservation]) -> Vec<ZScoreAnomaly> {
    rows.iter()
        .filter(|row| {
            row.temp_zscore > thresholds::Z_SCORE_LIMIT
                || row.humidity_zscore > thresholds::Z_SCORE_LIMIT
        })
        .filter_map(|row| {
            Some(ZScoreAnomaly {
                date: row.observation.date?,
                temp_value: row.observation.temperature,
                humidity_value: row.observation.humidity,
            })
        })
        .collect()
}

fn extreme_days(rows: &[EnrichedObservation]) -> Vec<ExtremeDay> {
    rows.iter()
        .filter_map(|row| {
            let date = row.observation.date?;
            let label = ExtremeKind::classify(
                row.observation.temperature,
                row.observation.humidity,
                row.comfort_index,
            )?;
            Some(ExtremeDay {
                date: date.format(DAY_FORMAT).to_string(),
                temp: row.observation.temperature,
                humidity: row.observation.humidity,
                label,
            })
        })
        .collect()
}

fn chart_series(rows: &[EnrichedObservation]) -> ChartData {
    let mut chart = ChartData::default();
    for row in rows {
        let Some(date) = row.observation.date else {
            continue;
        };
        chart.labels.push(date.format(DAY_FORMAT).to_string());
        chart.temperature.push(row.observation.temperature);
        chart.humidity.push(row.observation.humidity);
    }
    chart
}
