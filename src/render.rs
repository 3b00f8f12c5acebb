//! Report rendering.
//!
//! Turns a finalized [`Report`] into text for the terminal or JSON for
//! machine consumption. Rendering happens once, after analysis is done.

use colored::*;

use crate::config::OutputFormat;
use crate::constants::{DAY_FORMAT, ERROR_GLYPH};
use crate::error::Result;
use crate::models::{AnalysisReport, Report, Summary};

/// Render a report in the requested format
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
    }
}

pub fn render_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_text(report: &Report) -> String {
    match report {
        Report::Rejected { error } => format!("{} {}\n", ERROR_GLYPH, error)
            .bright_red()
            .to_string(),
        Report::Complete(analysis) => render_analysis(analysis),
    }
}

fn render_analysis(report: &AnalysisReport) -> String {
    let mut output = String::new();

    render_summary(&mut output, &report.summary);

    output.push_str(&section("Comfort Distribution"));
    for (label, count) in report.summary.comfort_distribution.iter() {
        output.push_str(&format!("   • {}: {}\n", label, count));
    }

    if let Some(conditions) = &report.conditions {
        output.push_str(&section("Conditions"));
        if conditions.is_empty() {
            output.push_str("   (no conditions recorded)\n");
        }
        for (condition, count) in conditions.iter() {
            output.push_str(&format!("   • {}: {}\n", condition, count));
        }
    }

    output.push_str(&section("Temperature Anomalies"));
    if report.anomalies.is_empty() {
        output.push_str("   None detected\n");
    }
    for anomaly in &report.anomalies {
        output.push_str(&format!(
            "   • {}: {:+.2}°C\n",
            anomaly.date.format(DAY_FORMAT),
            anomaly.temperature_change
        ));
    }

    output.push_str(&section("Extreme Days"));
    if report.extreme_days.is_empty() {
        output.push_str("   None detected\n");
    }
    for day in &report.extreme_days {
        output.push_str(&format!(
            "   • {}: {} ({}°C, {}%)\n",
            day.date, day.label, day.temp, day.humidity
        ));
    }

    output.push_str(&section("Statistical Anomalies"));
    if report.z_anomalies.is_empty() {
        output.push_str("   None detected\n");
    }
    for anomaly in &report.z_anomalies {
        output.push_str(&format!(
            "   • {}: {}°C, {}%\n",
            anomaly.date.format(DAY_FORMAT),
            anomaly.temp_value,
            anomaly.humidity_value
        ));
    }

    if !report.chart_data.is_empty() {
        output.push_str(&section("Chart Series"));
        for ((label, temp), humidity) in report
            .chart_data
            .labels
            .iter()
            .zip(&report.chart_data.temperature)
            .zip(&report.chart_data.humidity)
        {
            output.push_str(&format!("   {}  {:>7.2}°C  {:>6.2}%\n", label, temp, humidity));
        }
    }

    output
}

fn render_summary(output: &mut String, summary: &Summary) {
    output.push_str(&section("Summary"));
    output.push_str(&format!(
        "   • Temperature: max {} / min {} / avg {} / std {}\n",
        summary.max_temp,
        summary.min_temp,
        summary.avg_temp,
        format_optional(summary.temp_std)
    ));
    output.push_str(&format!(
        "   • Humidity: max {} / min {} / avg {} / std {}\n",
        summary.max_humidity,
        summary.min_humidity,
        summary.avg_humidity,
        format_optional(summary.humidity_std)
    ));
    output.push_str(&format!(
        "   • Most common comfort: {}\n",
        summary.most_common_comfort
    ));

    if summary.hot_day_alert {
        output.push_str(&format!("   {}\n", "🔥 Hot day alert".bright_red()));
    }
    if summary.cold_day_alert {
        output.push_str(&format!("   {}\n", "🧊 Cold day alert".bright_blue()));
    }
    if summary.has_heat_wave() {
        output.push_str(&format!("   {}\n", "☀️ Heat wave detected".bright_yellow()));
    }
}

fn section(title: &str) -> String {
    format!("\n{}\n", title.bright_green().bold())
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_frame;
    use crate::error::ValidationError;
    use polars::df;

    fn sample_report() -> Report {
        analyze_frame(
            df!(
                "temperature" => [41.0, 42.0, 6.0],
                "humidity" => [50.0, 55.0, 60.0],
                "date" => ["2024-01-01", "2024-01-02", "2024-01-03"],
                "condition" => ["Sunny", "Sunny", "Rain"]
            )
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_text_rendering_sections() {
        colored::control::set_override(false);
        let text = render(&sample_report(), OutputFormat::Text).unwrap();
        assert!(text.contains("Summary"));
        assert!(text.contains("max 42"));
        assert!(text.contains("Hot day alert"));
        assert!(text.contains("2024-01-01: 🔥 Extremely Hot (41°C, 50%)"));
        assert!(text.contains("• Sunny: 2"));
        assert!(text.contains("Chart Series"));
    }

    #[test]
    fn test_text_rendering_of_rejection() {
        colored::control::set_override(false);
        let report = Report::rejected(ValidationError::EmptyDataset);
        assert_eq!(render_text(&report), "❌ CSV file is empty\n");
    }

    #[test]
    fn test_json_rendering_shape() {
        let json = render(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["max_temp"], 42.0);
        assert_eq!(value["summary"]["hot_day_alert"], true);
        assert_eq!(value["summary"]["heat_wave"], 0);
        assert_eq!(value["conditions"]["Sunny"], 2);
        assert_eq!(value["chart_data"]["labels"][2], "2024-01-03");
        assert_eq!(value["extreme_days"][0]["label"], "🔥 Extremely Hot");
        assert!(value.get("error").is_none());
    }
}
