//! Descriptive statistics helpers.
//!
//! Plain functions over `f64` slices plus an insertion-ordered frequency
//! table used for label and condition histograms.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Descriptive statistics for a non-empty set of readings
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Standard deviation with divisor `n`
    pub population_std: f64,
    /// Standard deviation with divisor `n - 1`, absent below two readings
    pub sample_std: Option<f64>,
}

impl Describe {
    /// Returns `None` for an empty slice
    pub fn new(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / count as f64;
        let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();

        let population_std = (squared / count as f64).sqrt();
        let sample_std = (count > 1).then(|| (squared / (count - 1) as f64).sqrt());

        Some(Self {
            count,
            min,
            max,
            mean,
            population_std,
            sample_std,
        })
    }
}

/// Round to two decimal places, halves to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Absolute z-scores against the population standard deviation.
///
/// A constant series has no spread; every reading then scores 0.
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    let Some(describe) = Describe::new(values) else {
        return Vec::new();
    };

    if describe.population_std == 0.0 {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|v| (v - describe.mean).abs() / describe.population_std)
        .collect()
}

/// Parse a reading, rejecting text that is not a finite real number
pub fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Frequency table ordered by descending count.
///
/// Keys with equal counts keep the order in which they were first seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram<K> {
    entries: Vec<(K, usize)>,
}

impl<K: PartialEq> Histogram<K> {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut entries: Vec<(K, usize)> = Vec::new();
        for value in values {
            match entries.iter_mut().find(|(key, _)| *key == value) {
                Some((_, count)) => *count += 1,
                None => entries.push((value, 1)),
            }
        }

        // stable sort keeps first-seen order among ties
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    /// Most frequent key
    pub fn most_common(&self) -> Option<&K> {
        self.entries.first().map(|(key, _)| key)
    }

    pub fn get(&self, key: &K) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl<K: Serialize> Serialize for Histogram<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}
