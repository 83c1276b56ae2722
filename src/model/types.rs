//! Core value types produced by evaluating a query expression
//!
//! - `Timestamp`: an instant in milliseconds since the Unix epoch
//! - `Metric`: the label set identifying one series
//! - `Sample` / `Vector`: an instant result
//! - `SamplePair` / `SeriesPoints` / `Matrix`: a range result
//! - `Value`: any of the four result kinds

use crate::ast::ResultKind;
use chrono::Utc;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Label conventionally holding a series' metric name.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// Synthetic label carrying the text of a string result coerced into a vector.
pub const STRING_VALUE_LABEL: &str = "__value__";

/// Name of a non-finite value as it appears in output: `NaN`, `+Inf` or `-Inf`
pub fn non_finite_name(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value.is_infinite() {
        Some(if value > 0.0 { "+Inf" } else { "-Inf" })
    } else {
        None
    }
}

/// Serialize a sample value as a JSON number, or as its name when non-finite
///
/// serde_json would otherwise write NaN and infinities as `null`, which is
/// reserved for samples with no value.
pub fn serialize_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match non_finite_name(*value) {
        Some(name) => serializer.serialize_str(name),
        None => serializer.serialize_f64(*value),
    }
}

fn serialize_optional_float<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serialize_float(value, serializer),
        None => serializer.serialize_none(),
    }
}

/// An instant in time, stored as Unix milliseconds
///
/// Rendered in text and JSON as (fractional) seconds, e.g. `1705329342.123`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from Unix milliseconds
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Create a timestamp from whole Unix seconds
    pub fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// The current wall-clock time
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Unix milliseconds
    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Unix seconds with millisecond precision
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_secs_f64())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_secs_f64())
    }
}

/// The label set identifying a series
///
/// Labels are stored unordered; every rendering of a metric sorts them, so two
/// metrics built in different orders render identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metric {
    labels: HashMap<String, String>,
}

impl Metric {
    /// Create an empty metric
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a metric carrying only the reserved name label
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().label(METRIC_NAME_LABEL, name)
    }

    /// Builder method: add a label
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Value of a label, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Value of the reserved name label, if present
    pub fn name(&self) -> Option<&str> {
        self.get(METRIC_NAME_LABEL)
    }

    /// Number of labels, including the name label
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the metric has no labels at all
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over all labels in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rendered `name="value"` pairs for every label except the metric name,
    /// sorted by their rendered text
    pub fn sorted_label_pairs(&self) -> Vec<String> {
        let mut pairs: Vec<String> = self
            .iter()
            .filter(|(name, _)| *name != METRIC_NAME_LABEL)
            .map(|(name, value)| format!("{}={:?}", name, value))
            .collect();
        pairs.sort();
        pairs
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metric {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            labels: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Sorted keys keep the wire output deterministic
        let sorted: BTreeMap<&str, &str> = self.iter().collect();
        serializer.collect_map(sorted)
    }
}

/// One labeled value at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Labels identifying the series
    pub metric: Metric,
    /// Sample value; `None` only for a string result coerced into a sample
    #[serde(serialize_with = "serialize_optional_float")]
    pub value: Option<f64>,
    /// Evaluation instant
    pub timestamp: Timestamp,
}

impl Sample {
    /// Create a sample with a value
    pub fn new(metric: Metric, value: f64, timestamp: Timestamp) -> Self {
        Self {
            metric,
            value: Some(value),
            timestamp,
        }
    }

    /// Create a sample that carries no numeric value
    pub fn without_value(metric: Metric, timestamp: Timestamp) -> Self {
        Self {
            metric,
            value: None,
            timestamp,
        }
    }
}

/// An instant result: samples in the order the evaluator produced them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Vector(pub Vec<Sample>);

impl Vector {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of samples
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over samples in stored order
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.0.iter()
    }

    /// Builder method: append a sample
    pub fn push(mut self, sample: Sample) -> Self {
        self.0.push(sample);
        self
    }
}

impl From<Vec<Sample>> for Vector {
    fn from(samples: Vec<Sample>) -> Self {
        Self(samples)
    }
}

impl FromIterator<Sample> for Vector {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Vector {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One point of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePair {
    #[serde(serialize_with = "serialize_float")]
    pub value: f64,
    pub timestamp: Timestamp,
}

impl SamplePair {
    pub fn new(value: f64, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }
}

/// One series over a time range, points in time order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoints {
    pub metric: Metric,
    pub values: Vec<SamplePair>,
}

impl SeriesPoints {
    /// Create a series with no points
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            values: Vec::new(),
        }
    }

    /// Builder method: append a point
    pub fn point(mut self, value: f64, timestamp: Timestamp) -> Self {
        self.values.push(SamplePair::new(value, timestamp));
        self
    }
}

/// A range result: one entry per series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Matrix(pub Vec<SeriesPoints>);

impl Matrix {
    /// Create an empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of series
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over series in stored order
    pub fn iter(&self) -> std::slice::Iter<'_, SeriesPoints> {
        self.0.iter()
    }
}

impl From<Vec<SeriesPoints>> for Matrix {
    fn from(series: Vec<SeriesPoints>) -> Self {
        Self(series)
    }
}

impl FromIterator<SeriesPoints> for Matrix {
    fn from_iter<I: IntoIterator<Item = SeriesPoints>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The result of evaluating a node
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vector),
    Matrix(Matrix),
    String(String),
}

impl Value {
    /// The kind of this result
    pub fn kind(&self) -> ResultKind {
        match self {
            Self::Scalar(_) => ResultKind::Scalar,
            Self::Vector(_) => ResultKind::Vector,
            Self::Matrix(_) => ResultKind::Matrix,
            Self::String(_) => ResultKind::String,
        }
    }
}
