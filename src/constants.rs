//! Application constants for the weather comfort analyzer
//!
//! Column names, alert thresholds and formats shared by the loader,
//! the analyzer and the command-line front end.

// =============================================================================
// Column Names
// =============================================================================

/// Recognised input and derived column names (already normalised)
pub mod columns {
    pub const TEMPERATURE: &str = "temperature";
    pub const HUMIDITY: &str = "humidity";
    pub const DATE: &str = "date";
    pub const CONDITION: &str = "condition";

    /// Columns every dataset must provide, in reporting order
    pub const REQUIRED: &[&str] = &[TEMPERATURE, HUMIDITY];

    pub const COMFORT_INDEX: &str = "comfort_index";
    pub const TEMP_ZSCORE: &str = "temp_zscore";
    pub const HUMIDITY_ZSCORE: &str = "humidity_zscore";
    pub const TEMP_DIFF: &str = "temp_diff";
    pub const ABS_DIFF: &str = "abs_diff";
}

// =============================================================================
// Alert Thresholds
// =============================================================================

/// Thresholds used by the summary and time-series phases
pub mod thresholds {
    /// Maximum temperature at or above which the hot day alert fires
    pub const HOT_DAY_TEMP: f64 = 40.0;

    /// Minimum temperature at or below which the cold day alert fires
    pub const COLD_DAY_TEMP: f64 = 5.0;

    /// Temperature a row must exceed to count towards a heat wave
    pub const HEAT_WAVE_TEMP: f64 = 35.0;

    /// Number of qualifying rows needed to raise the heat wave flag
    pub const HEAT_WAVE_MIN_DAYS: usize = 3;

    /// Value reported for `heat_wave` when the flag is raised.
    /// This is a fixed marker, not a count of qualifying rows.
    pub const HEAT_WAVE_FLAG: u32 = 3;

    /// Day-to-day jumps must be strictly larger than this to be reported
    pub const ANOMALY_MIN_JUMP: f64 = 5.0;

    /// Day-to-day jumps larger than this are not reported
    pub const ANOMALY_MAX_JUMP: f64 = 15.0;

    /// Absolute z-score above which a reading is statistically unusual
    pub const Z_SCORE_LIMIT: f64 = 2.0;

    /// Extreme day thresholds
    pub const EXTREME_HOT_TEMP: f64 = 40.0;
    pub const EXTREME_FREEZING_TEMP: f64 = 5.0;
    pub const EXTREME_HUMIDITY: f64 = 90.0;
}

// =============================================================================
// Formats
// =============================================================================

/// Date format used for chart labels and extreme day entries
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Date-time layouts accepted in the `date` column, tried in order
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Date-only layouts accepted in the `date` column, tried in order
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

// =============================================================================
// Input / Output
// =============================================================================

/// Default file name for the enriched dataset export
pub const DEFAULT_EXPORT_FILENAME: &str = "weather_analysis.csv";

/// Application directory name under the user cache directory
pub const APP_DIR_NAME: &str = "weather_comfort";

/// Upload staging directory name inside the application directory
pub const UPLOAD_DIR_NAME: &str = "uploads";

/// Glyph prefixed to validation and processing errors in rendered output
pub const ERROR_GLYPH: &str = "❌";

/// Check whether a normalised column name is one the analyzer understands
pub fn is_recognised_column(name: &str) -> bool {
    matches!(
        name,
        columns::TEMPERATURE | columns::HUMIDITY | columns::DATE | columns::CONDITION
    )
}

/// Normalise a raw CSV header into the form used for column lookups
pub fn normalise_column_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}
