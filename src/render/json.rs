//! Versioned JSON envelopes
//!
//! Every structured response has the shape
//!
//! ```text
//! {"type": "scalar" | "vector" | "matrix" | "string" | "error", "value": ..., "version": 1}
//! ```
//!
//! Encoding never fails outward: a payload that cannot be encoded becomes an
//! error envelope, and an error envelope that cannot be encoded becomes an
//! empty string.

use super::error::RenderError;
use crate::ast::ResultKind;
use crate::model::types::serialize_float;
use serde::Serialize;

/// Version carried by every envelope
pub const JSON_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize + ?Sized> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a T,
    version: u32,
}

impl<'a, T: Serialize + ?Sized> Envelope<'a, T> {
    fn new(kind: &'a str, value: &'a T) -> Self {
        Self {
            kind,
            value,
            version: JSON_FORMAT_VERSION,
        }
    }
}

/// Wrap an error's message in an `"error"` envelope
///
/// Returns an empty string if even that cannot be encoded.
pub fn error_to_json(err: &dyn std::error::Error) -> String {
    error_envelope(err.to_string().as_str())
}

fn error_envelope<M: Serialize + ?Sized>(message: &M) -> String {
    match serde_json::to_string(&Envelope::new("error", message)) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode error envelope");
            String::new()
        }
    }
}

/// Scalar result payload
///
/// Finite values encode as JSON numbers; NaN and infinities as `"NaN"`,
/// `"+Inf"` and `"-Inf"`. A bare `f64` payload would encode those as `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarPayload(pub f64);

impl Serialize for ScalarPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_float(&self.0, serializer)
    }
}

/// Wrap a typed payload in an envelope tagged with its result kind
pub fn typed_value_to_json<T: Serialize + ?Sized>(value: &T, kind: ResultKind) -> String {
    match serde_json::to_string(&Envelope::new(kind.as_str(), value)) {
        Ok(json) => json,
        Err(e) => {
            let err = RenderError::from(e);
            tracing::warn!(kind = %kind, error = %err, "Falling back to error envelope");
            error_to_json(&err)
        }
    }
}
