//! Rule-based comfort classification.
//!
//! A (temperature, humidity) pair is mapped to a [`ComfortLabel`] by walking
//! an ordered list of rules. The first rule whose predicate holds decides the
//! label; later rules are never consulted, even when they would also match.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::stats::parse_finite;

/// Comfort categories assigned to each observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComfortLabel {
    DangerousHeatIndex,
    BitterWindChill,
    ExtremelyUncomfortable,
    VeryUncomfortable,
    FreezingCold,
    ChillyAndDry,
    Comfortable,
    MildAndPleasant,
    ModeratelyUncomfortable,
    /// Inputs could not be read as real numbers
    DataError,
}

impl ComfortLabel {
    /// Human-readable name without the glyph
    pub fn name(&self) -> &'static str {
        match self {
            ComfortLabel::DangerousHeatIndex => "Dangerous Heat Index",
            ComfortLabel::BitterWindChill => "Bitter Wind Chill",
            ComfortLabel::ExtremelyUncomfortable => "Extremely Uncomfortable",
            ComfortLabel::VeryUncomfortable => "Very Uncomfortable",
            ComfortLabel::FreezingCold => "Freezing Cold",
            ComfortLabel::ChillyAndDry => "Chilly and Dry",
            ComfortLabel::Comfortable => "Comfortable",
            ComfortLabel::MildAndPleasant => "Mild and Pleasant",
            ComfortLabel::ModeratelyUncomfortable => "Moderately Uncomfortable",
            ComfortLabel::DataError => "Data Error",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ComfortLabel::DangerousHeatIndex => "⚠️",
            ComfortLabel::BitterWindChill => "🌬️",
            ComfortLabel::ExtremelyUncomfortable => "🔥",
            ComfortLabel::VeryUncomfortable => "🥵",
            ComfortLabel::FreezingCold => "🧊",
            ComfortLabel::ChillyAndDry => "❄️",
            ComfortLabel::Comfortable => "😊",
            ComfortLabel::MildAndPleasant => "🌤️",
            ComfortLabel::ModeratelyUncomfortable => "😓",
            ComfortLabel::DataError => "❌",
        }
    }
}

impl fmt::Display for ComfortLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.glyph())
    }
}

impl Serialize for ComfortLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Simplified heat index: temperature adjusted upwards by relative humidity
pub fn heat_index(temperature: f64, humidity: f64) -> f64 {
    temperature + 0.5 * (humidity / 100.0) * (temperature - 14.3)
}

/// Simplified wind chill used for cold readings
pub fn wind_chill(temperature: f64, humidity: f64) -> f64 {
    temperature - 0.7 * (humidity / 100.0)
}

/// A single entry of the decision list
pub struct ComfortRule {
    pub label: ComfortLabel,
    pub applies: fn(f64, f64) -> bool,
}

/// Decision list in priority order
pub const COMFORT_RULES: &[ComfortRule] = &[
    ComfortRule {
        label: ComfortLabel::DangerousHeatIndex,
        applies: |t, h| heat_index(t, h) > 35.0,
    },
    ComfortRule {
        label: ComfortLabel::BitterWindChill,
        applies: |t, h| t < 10.0 && wind_chill(t, h) < -5.0,
    },
    ComfortRule {
        label: ComfortLabel::ExtremelyUncomfortable,
        applies: |t, h| t > 45.0 || h > 90.0,
    },
    ComfortRule {
        label: ComfortLabel::VeryUncomfortable,
        applies: |t, h| t > 35.0 && h > 70.0,
    },
    ComfortRule {
        label: ComfortLabel::FreezingCold,
        applies: |t, _| t < 5.0,
    },
    ComfortRule {
        label: ComfortLabel::ChillyAndDry,
        applies: |t, h| t < 15.0 && h < 30.0,
    },
    ComfortRule {
        label: ComfortLabel::Comfortable,
        applies: |t, h| (20.0..=30.0).contains(&t) && (40.0..=60.0).contains(&h),
    },
    ComfortRule {
        label: ComfortLabel::MildAndPleasant,
        applies: |t, h| (15.0..=20.0).contains(&t) && (30.0..=50.0).contains(&h),
    },
];

/// Classify a reading. Non-finite inputs yield [`ComfortLabel::DataError`].
pub fn classify(temperature: f64, humidity: f64) -> ComfortLabel {
    if !temperature.is_finite() || !humidity.is_finite() {
        return ComfortLabel::DataError;
    }

    COMFORT_RULES
        .iter()
        .find(|rule| (rule.applies)(temperature, humidity))
        .map(|rule| rule.label)
        .unwrap_or(ComfortLabel::ModeratelyUncomfortable)
}

/// Classify readings that have not been parsed yet.
///
/// Unparseable text is a normal outcome here and maps to
/// [`ComfortLabel::DataError`] instead of failing.
pub fn classify_raw(temperature: &str, humidity: &str) -> ComfortLabel {
    match (parse_finite(temperature), parse_finite(humidity)) {
        (Some(t), Some(h)) => classify(t, h),
        _ => ComfortLabel::DataError,
    }
}
