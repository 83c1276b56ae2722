//! Evaluated query values
//!
//! The evaluator (an external collaborator) produces these; the renderers in
//! [`crate::render`] turn them into text or JSON.

pub mod types;

pub use types::{
    Matrix, Metric, Sample, SamplePair, SeriesPoints, Timestamp, Value, Vector, METRIC_NAME_LABEL,
    STRING_VALUE_LABEL,
};
