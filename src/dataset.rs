//! Tabular dataset loading and typed row extraction.
//!
//! CSV input is read into a polars [`DataFrame`] with every column kept as
//! text. Column names are normalised on construction; the typed row schema
//! (numeric temperature and humidity, optional date and condition) is only
//! applied when [`Dataset::observations`] is called.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::constants::{
    DATE_FORMATS, DATETIME_FORMATS, columns, is_recognised_column, normalise_column_name,
};
use crate::error::{Result, ValidationError, WeatherError};
use crate::models::Observation;
use crate::stats::parse_finite;

/// An uploaded table with normalised column names
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Wrap an existing frame, normalising its column names
    pub fn from_frame(mut frame: DataFrame) -> Result<Self> {
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| normalise_column_name(name.as_str()))
            .collect();

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(WeatherError::DuplicateColumn { name: name.clone() });
            }
        }

        let ignored: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| !is_recognised_column(name))
            .collect();
        if !ignored.is_empty() {
            debug!("Columns carried through without analysis: {:?}", ignored);
        }

        frame.set_column_names(names)?;
        Ok(Self { frame })
    }

    /// Parse CSV bytes with a header row
    pub fn from_csv_bytes(bytes: Vec<u8>) -> Result<Self> {
        // polars refuses input without a header line; treat it as an empty table
        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("CSV input has no content");
            return Self::from_frame(DataFrame::empty());
        }

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        debug!(
            "Parsed CSV: {} rows, {} columns",
            frame.height(),
            frame.width()
        );
        Self::from_frame(frame)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        debug!("Reading dataset from {}", path.display());
        let bytes = fs::read(path)?;
        Self::from_csv_bytes(bytes)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Look up a normalised column name
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    pub fn is_dated(&self) -> bool {
        self.has_column(columns::DATE)
    }

    /// Apply the typed row schema.
    ///
    /// Structural and data-quality problems come back as
    /// [`WeatherError::Validation`]; a malformed date is a plain fault.
    pub fn observations(&self) -> Result<Vec<Observation>> {
        if self.is_empty() {
            return Err(ValidationError::EmptyDataset.into());
        }

        let missing: Vec<&'static str> = columns::REQUIRED
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingColumns(missing).into());
        }

        let temperatures = self.numeric_column(columns::TEMPERATURE)?;
        let humidities = self.numeric_column(columns::HUMIDITY)?;
        let dates = self.date_column()?;
        let conditions = self.text_column(columns::CONDITION)?;

        let observations = temperatures
            .into_iter()
            .zip(humidities)
            .enumerate()
            .map(|(row, (temperature, humidity))| Observation {
                temperature,
                humidity,
                date: dates.as_ref().map(|dates| dates[row]),
                condition: conditions.as_ref().and_then(|values| values[row].clone()),
            })
            .collect();

        Ok(observations)
    }

    fn numeric_column(&self, name: &'static str) -> Result<Vec<f64>> {
        let series = self.frame.column(name)?.as_materialized_series();

        let values: Option<Vec<f64>> = match series.dtype() {
            DataType::String => series
                .str()?
                .into_iter()
                .map(|value| value.and_then(parse_finite))
                .collect(),
            _ => match series.strict_cast(&DataType::Float64) {
                Ok(cast) => cast
                    .f64()?
                    .into_iter()
                    .map(|value| value.filter(|v| v.is_finite()))
                    .collect(),
                Err(_) => None,
            },
        };

        values.ok_or_else(|| {
            debug!("Column '{}' holds non-numeric values", name);
            ValidationError::InvalidData { column: name }.into()
        })
    }

    fn date_column(&self) -> Result<Option<Vec<NaiveDateTime>>> {
        if !self.is_dated() {
            return Ok(None);
        }

        let text = self
            .frame
            .column(columns::DATE)?
            .as_materialized_series()
            .cast(&DataType::String)?;

        let dates = text
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let raw = value.unwrap_or_default();
                parse_date(raw).ok_or_else(|| WeatherError::DateParse {
                    row: row + 1,
                    value: raw.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(dates))
    }

    fn text_column(&self, name: &str) -> Result<Option<Vec<Option<String>>>> {
        if !self.has_column(name) {
            return Ok(None);
        }

        let text = self
            .frame
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::String)?;

        let values = text
            .str()?
            .into_iter()
            .map(|value| {
                value
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
            })
            .collect();

        Ok(Some(values))
    }
}

/// Parse a date cell, trying date-time layouts before date-only ones
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use polars::df;

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_csv_bytes(csv.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_column_names_are_normalised() {
        let data = dataset(" Temperature ,HUMIDITY,Date\n20,50,2024-01-01\n");
        assert!(data.has_column("temperature"));
        assert!(data.has_column("humidity"));
        assert!(data.is_dated());
        assert!(!data.has_column("condition"));
    }

    #[test]
    fn test_empty_input() {
        let data = dataset("");
        assert!(data.is_empty());
        match data.observations() {
            Err(WeatherError::Validation(ValidationError::EmptyDataset)) => {}
            other => panic!("Expected empty dataset error, got {:?}", other),
        }

        let header_only = dataset("temperature,humidity\n");
        assert!(header_only.is_empty());
    }

    #[test]
    fn test_missing_humidity_column() {
        let data = dataset("temperature,wind\n20,3\n");
        match data.observations() {
            Err(WeatherError::Validation(ValidationError::MissingColumns(missing))) => {
                assert_eq!(missing, vec!["humidity"]);
            }
            other => panic!("Expected missing columns error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_temperature() {
        let data = dataset("temperature,humidity\nabc,50\n5,60\n");
        match data.observations() {
            Err(WeatherError::Validation(ValidationError::InvalidData { column })) => {
                assert_eq!(column, "temperature");
            }
            other => panic!("Expected invalid data error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_numeric_cell_is_invalid() {
        let data = dataset("temperature,humidity\n20,\n21,50\n");
        assert!(matches!(
            data.observations(),
            Err(WeatherError::Validation(ValidationError::InvalidData { column: "humidity" }))
        ));
    }

    #[test]
    fn test_typed_rows() {
        let data = dataset("humidity,temperature,condition,date\n50, 21.5 ,Rain,2024-03-02\n40,18, ,2024-03-01\n");
        let rows = data.observations().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temperature, 21.5);
        assert_eq!(rows[0].humidity, 50.0);
        assert_eq!(rows[0].condition.as_deref(), Some("Rain"));
        assert_eq!(rows[1].condition, None);
        assert_eq!(rows[1].date, parse_date("2024-03-01"));
    }

    #[test]
    fn test_condition_text_is_kept_verbatim() {
        let data = dataset("temperature,humidity,condition\n20,50,Rain\n21,50, Rain\n22,50,  \n");
        let rows = data.observations().unwrap();
        assert_eq!(rows[0].condition.as_deref(), Some("Rain"));
        assert_eq!(rows[1].condition.as_deref(), Some(" Rain"));
        assert_eq!(rows[2].condition, None);
    }

    #[test]
    fn test_malformed_date_is_a_fault() {
        let data = dataset("temperature,humidity,date\n20,50,yesterday\n");
        match data.observations() {
            Err(WeatherError::DateParse { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "yesterday");
            }
            other => panic!("Expected date parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_columns_after_normalisation() {
        let frame = df!("Temperature" => [1.0], "temperature " => [2.0]).unwrap();
        assert!(matches!(
            Dataset::from_frame(frame),
            Err(WeatherError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_numeric_frame_columns() {
        let frame = df!("TEMPERATURE" => [20i64, 25], "Humidity" => [50.0, 55.0]).unwrap();
        let rows = Dataset::from_frame(frame).unwrap().observations().unwrap();
        assert_eq!(rows[1].temperature, 25.0);
        assert_eq!(rows[1].humidity, 55.0);
    }

    #[test]
    fn test_parse_date_layouts() {
        let day = parse_date("2024-01-05").unwrap();
        assert_eq!(day.format("%Y-%m-%d").to_string(), "2024-01-05");
        assert_eq!(parse_date("2024/01/05"), Some(day));
        assert_eq!(parse_date("01/05/2024"), Some(day));
        assert_eq!(parse_date("05.01.2024"), Some(day));

        let timed = parse_date("2024-01-05 13:45:00").unwrap();
        assert_eq!(timed.hour(), 13);
        assert_eq!(parse_date("2024-01-05T13:45:00"), Some(timed));
        assert_eq!(parse_date("2024-01-05T13:45:00+02:00"), Some(timed));

        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
    }
}
