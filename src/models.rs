//! Core data structures for weather analysis.
//!
//! Defines the typed observation rows produced by the loader, the enriched
//! rows produced by the analyzer, and the report handed to renderers.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::comfort::ComfortLabel;
use crate::constants::thresholds;
use crate::error::ValidationError;
use crate::stats::Histogram;

/// One validated observation row
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub temperature: f64,
    pub humidity: f64,
    pub date: Option<NaiveDateTime>,
    pub condition: Option<String>,
}

/// An observation with the columns derived during analysis
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedObservation {
    /// Position of the row in the source dataset
    pub source_row: usize,
    pub observation: Observation,
    pub comfort_index: ComfortLabel,
    pub temp_zscore: f64,
    pub humidity_zscore: f64,
    /// Only populated when the dataset has a date column
    pub temp_diff: Option<f64>,
    pub abs_diff: Option<f64>,
}

/// Enriched rows in analysis order (date-sorted when dated)
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedDataset {
    pub rows: Vec<EnrichedObservation>,
    pub dated: bool,
}

/// Aggregate statistics over the whole dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub max_temp: f64,
    pub min_temp: f64,
    pub avg_temp: f64,
    pub max_humidity: f64,
    pub min_humidity: f64,
    pub avg_humidity: f64,
    pub hot_day_alert: bool,
    pub cold_day_alert: bool,
    pub most_common_comfort: ComfortLabel,
    /// Fixed marker value when a heat wave is detected, 0 otherwise
    pub heat_wave: u32,
    pub comfort_distribution: Histogram<ComfortLabel>,
    pub temp_std: Option<f64>,
    pub humidity_std: Option<f64>,
}

impl Summary {
    pub fn has_heat_wave(&self) -> bool {
        self.heat_wave == thresholds::HEAT_WAVE_FLAG
    }
}

/// A moderate day-to-day temperature jump
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureAnomaly {
    pub date: NaiveDateTime,
    /// Signed change from the previous row
    pub temperature_change: f64,
}

/// A statistically unusual reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreAnomaly {
    pub date: NaiveDateTime,
    pub temp_value: f64,
    pub humidity_value: f64,
}

/// Extreme day categories, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtremeKind {
    ExtremelyHot,
    Freezing,
    VeryHumid,
    Overheat,
}

impl ExtremeKind {
    /// First matching category for a row, if any
    pub fn classify(temperature: f64, humidity: f64, comfort: ComfortLabel) -> Option<Self> {
        if temperature >= thresholds::EXTREME_HOT_TEMP {
            Some(ExtremeKind::ExtremelyHot)
        } else if temperature <= thresholds::EXTREME_FREEZING_TEMP {
            Some(ExtremeKind::Freezing)
        } else if humidity >= thresholds::EXTREME_HUMIDITY {
            Some(ExtremeKind::VeryHumid)
        } else if comfort == ComfortLabel::ExtremelyUncomfortable {
            Some(ExtremeKind::Overheat)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExtremeKind::ExtremelyHot => "Extremely Hot",
            ExtremeKind::Freezing => "Freezing",
            ExtremeKind::VeryHumid => "Very Humid",
            ExtremeKind::Overheat => "Overheat",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ExtremeKind::ExtremelyHot => "🔥",
            ExtremeKind::Freezing => "🧊",
            ExtremeKind::VeryHumid => "💦",
            ExtremeKind::Overheat => "🥵",
        }
    }
}

impl fmt::Display for ExtremeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.name())
    }
}

impl Serialize for ExtremeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeDay {
    /// Day formatted as YYYY-MM-DD
    pub date: String,
    pub temp: f64,
    pub humidity: f64,
    pub label: ExtremeKind,
}

/// Parallel series for charting, in date order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
}

impl ChartData {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Everything a successful analysis produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: Summary,
    /// Absent when the dataset has no condition column
    pub conditions: Option<Histogram<String>>,
    pub anomalies: Vec<TemperatureAnomaly>,
    pub extreme_days: Vec<ExtremeDay>,
    pub z_anomalies: Vec<ZScoreAnomaly>,
    pub chart_data: ChartData,
}

/// Outcome of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Complete(Box<AnalysisReport>),
    Rejected {
        #[serde(serialize_with = "serialize_display")]
        error: ValidationError,
    },
}

impl Report {
    pub fn rejected(error: ValidationError) -> Self {
        Report::Rejected { error }
    }

    pub fn analysis(&self) -> Option<&AnalysisReport> {
        match self {
            Report::Complete(report) => Some(report.as_ref()),
            Report::Rejected { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Report::Complete(_) => None,
            Report::Rejected { error } => Some(error),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Report::Rejected { .. })
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_kind_priority() {
        assert_eq!(
            ExtremeKind::classify(41.0, 95.0, ComfortLabel::DangerousHeatIndex),
            Some(ExtremeKind::ExtremelyHot)
        );
        assert_eq!(
            ExtremeKind::classify(5.0, 95.0, ComfortLabel::ExtremelyUncomfortable),
            Some(ExtremeKind::Freezing)
        );
        assert_eq!(
            ExtremeKind::classify(14.0, 90.0, ComfortLabel::ModeratelyUncomfortable),
            Some(ExtremeKind::VeryHumid)
        );
        assert_eq!(
            ExtremeKind::classify(20.0, 50.0, ComfortLabel::ExtremelyUncomfortable),
            Some(ExtremeKind::Overheat)
        );
        assert_eq!(
            ExtremeKind::classify(6.0, 60.0, ComfortLabel::ModeratelyUncomfortable),
            None
        );
    }

    #[test]
    fn test_extreme_kind_display() {
        assert_eq!(ExtremeKind::ExtremelyHot.to_string(), "🔥 Extremely Hot");
    }

    #[test]
    fn test_rejected_report_serializes_only_error() {
        let report = Report::rejected(ValidationError::MissingColumns(vec!["humidity"]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Missing columns: humidity" }));
        assert!(report.analysis().is_none());
        assert!(report.is_rejected());
    }
}
