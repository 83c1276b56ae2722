//! Duration text for range selectors

use std::time::Duration;

/// Formats the window of a range selector
pub trait DurationFormatter {
    fn format_duration(&self, duration: Duration) -> String;
}

/// Compound units from largest to smallest: `5m`, `1h30m`, `2d12h`, `1s500ms`
///
/// A year counts as 365 days. Sub-millisecond precision is dropped; a zero
/// duration renders as `0s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalDuration;

const UNITS: [(&str, u128); 7] = [
    ("y", 365 * 24 * 60 * 60 * 1000),
    ("w", 7 * 24 * 60 * 60 * 1000),
    ("d", 24 * 60 * 60 * 1000),
    ("h", 60 * 60 * 1000),
    ("m", 60 * 1000),
    ("s", 1000),
    ("ms", 1),
];

impl DurationFormatter for CanonicalDuration {
    fn format_duration(&self, duration: Duration) -> String {
        let mut remaining = duration.as_millis();
        if remaining == 0 {
            return "0s".to_string();
        }

        let mut out = String::new();
        for (unit, millis) in UNITS {
            let count = remaining / millis;
            if count > 0 {
                out.push_str(&count.to_string());
                out.push_str(unit);
                remaining %= millis;
            }
        }
        out
    }
}
