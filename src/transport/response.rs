use crate::error::{SubmitError, GENERIC_FAILURE};
use crate::model::AnalysisResult;
use serde::Deserialize;
use tracing::warn;

#[derive(Deserialize)]
struct FailureBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Decode a 2xx body into a typed result.
pub fn decode_success(body: &[u8]) -> Result<AnalysisResult, SubmitError> {
    let result: AnalysisResult = serde_json::from_slice(body)
        .map_err(|e| SubmitError::MalformedResponse(e.to_string()))?;

    for rec in &result.recommendations {
        if !(0.0..=1.0).contains(&rec.score) {
            warn!(profile = %rec.profile, score = rec.score, "score outside [0, 1]");
        }
    }
    Ok(result)
}

/// Map a non-2xx response to a service failure.
///
/// Only a non-blank string `detail` is surfaced verbatim; anything else (missing field,
/// a list of validation errors, a non-JSON body) falls back to the generic message.
pub fn decode_failure(status: u16, body: &[u8]) -> SubmitError {
    let message = serde_json::from_slice::<FailureBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.as_str().map(str::to_string))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    warn!(status, %message, "analysis service returned an error");
    SubmitError::Service { status, message }
}
