//! JSON serialization for throughput reports.

use crate::report::Report;

/// Serialize a Report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for Report).
pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a Report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for Report).
pub fn to_json_pretty(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
