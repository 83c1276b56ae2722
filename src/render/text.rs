//! Text rendering of evaluated values
//!
//! ```text
//! Vector:  http_requests_total{code="200",job="api"} => 42 @[1705329342.123]
//! Matrix:  http_requests_total{code="200", job="api"} =>
//!          1 @[10],
//!          2 @[20]
//! ```
//!
//! Vectors keep the order the evaluator produced. Matrices are sorted by the
//! fully rendered text of each series, so the output does not depend on the
//! order series arrive in.

use crate::model::types::non_finite_name;
use crate::model::{Matrix, Metric, Sample, Timestamp, Vector};

/// Format a sample value the way it appears in text output
pub fn format_value(value: f64) -> String {
    match non_finite_name(value) {
        Some(name) => name.to_string(),
        None => value.to_string(),
    }
}

/// Text form of a scalar result
pub fn scalar_to_text(value: f64, timestamp: Timestamp) -> String {
    format!("scalar: {} @[{}]", format_value(value), timestamp)
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels = self.sorted_label_pairs();
        match (self.name(), labels.is_empty()) {
            (Some(name), true) => f.write_str(name),
            (None, true) => f.write_str("{}"),
            (name, false) => write!(f, "{}{{{}}}", name.unwrap_or(""), labels.join(",")),
        }
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Some(value) => write!(
                f,
                "{} => {} @[{}]",
                self.metric,
                format_value(value),
                self.timestamp
            ),
            None => write!(f, "{} => null @[{}]", self.metric, self.timestamp),
        }
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, sample) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", sample)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut series_strings: Vec<String> = self
            .iter()
            .map(|series| {
                let points: Vec<String> = series
                    .values
                    .iter()
                    .map(|point| format!("\n{} @[{}]", format_value(point.value), point.timestamp))
                    .collect();
                format!(
                    "{}{{{}}} => {}",
                    series.metric.name().unwrap_or(""),
                    series.metric.sorted_label_pairs().join(", "),
                    points.join(", ")
                )
            })
            .collect();
        series_strings.sort();
        f.write_str(&series_strings.join("\n"))
    }
}
