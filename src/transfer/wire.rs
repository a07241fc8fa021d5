//! Response bodies of the analysis service and their classification.
//!
//! Success body:
//!
//! ```json
//! {
//!   "message": "File uploaded and processed",
//!   "download_url": "/download/optimized_resume.pdf",
//!   "ai_feedback": {
//!     "overall_score": 8,
//!     "strengths": ["Clear formatting"],
//!     "improvements": ["Add metrics"],
//!     "actionable_changes": ["Quantify impact in bullet 3"]
//!   }
//! }
//! ```
//!
//! Failure body, when present: `{ "error": "model unavailable" }`. Older service
//! builds also answer 200 with a top-level `error`, or with `ai_feedback.error`
//! when the model output could not be decoded; both are service failures, not
//! successes.

use crate::error::{Operation, OutcomeError};
use crate::types::AnalysisFeedback;
use serde::Deserialize;

/// Highest score the service hands out
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Deserialize)]
struct UploadResponseBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    ai_feedback: Option<AiFeedbackBody>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiFeedbackBody {
    #[serde(default)]
    overall_score: Option<f64>,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default)]
    improvements: Option<Vec<String>>,
    #[serde(default)]
    actionable_changes: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Classify a completed upload response
pub fn parse_upload_response(status: u16, body: &[u8]) -> Result<AnalysisFeedback, OutcomeError> {
    if !(200..300).contains(&status) {
        return Err(server_failure(Operation::Upload, status, body));
    }

    let parsed: UploadResponseBody = serde_json::from_slice(body)
        .map_err(|e| OutcomeError::parse(Operation::Upload, format!("invalid JSON body: {}", e)))?;

    if let Some(message) = non_blank(parsed.error.as_deref()) {
        return Err(OutcomeError::server(Operation::Upload, status, message));
    }

    let feedback = parsed
        .ai_feedback
        .ok_or_else(|| missing_field("ai_feedback"))?;

    if let Some(message) = non_blank(feedback.error.as_deref()) {
        return Err(OutcomeError::server(Operation::Upload, status, message));
    }

    let overall_score = feedback
        .overall_score
        .ok_or_else(|| missing_field("ai_feedback.overall_score"))?;
    if !overall_score.is_finite() || !(0.0..=MAX_SCORE).contains(&overall_score) {
        return Err(OutcomeError::parse(
            Operation::Upload,
            format!("ai_feedback.overall_score {} is outside 0-10", overall_score),
        ));
    }

    let strengths = feedback
        .strengths
        .ok_or_else(|| missing_field("ai_feedback.strengths"))?;
    let improvements = feedback
        .improvements
        .ok_or_else(|| missing_field("ai_feedback.improvements"))?;

    let artifact_reference = non_blank(parsed.download_url.as_deref())
        .ok_or_else(|| missing_field("download_url"))?
        .to_string();

    Ok(AnalysisFeedback {
        overall_score,
        strengths,
        improvements,
        actionable_changes: feedback.actionable_changes.unwrap_or_default(),
        artifact_reference,
        service_message: parsed.message,
    })
}

/// Build the error for a non-success status
///
/// Uses the service's `{ "error": ... }` message when the body has one, otherwise a
/// generic message naming the raw status.
pub fn server_failure(operation: Operation, status: u16, body: &[u8]) -> OutcomeError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.trim().is_empty() => {
            OutcomeError::server(operation, status, parsed.error)
        }
        _ => {
            let reason = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown Status");
            OutcomeError::server(
                operation,
                status,
                format!("the analysis service responded with HTTP {} {}", status, reason),
            )
        }
    }
}

fn missing_field(field: &str) -> OutcomeError {
    OutcomeError::parse(Operation::Upload, format!("missing required field {}", field))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, WARMING_UP_HINT};
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn full_success() -> serde_json::Value {
        json!({
            "message": "File uploaded and processed",
            "download_url": "/d/1",
            "ai_feedback": {
                "overall_score": 8,
                "strengths": ["Clear formatting"],
                "improvements": ["Add metrics"],
                "actionable_changes": ["Quantify impact in bullet 3"]
            }
        })
    }

    #[test]
    fn parses_complete_success() {
        let feedback = parse_upload_response(200, &body(full_success())).unwrap();
        assert_eq!(feedback.overall_score, 8.0);
        assert_eq!(feedback.strengths, vec!["Clear formatting"]);
        assert_eq!(feedback.improvements, vec!["Add metrics"]);
        assert_eq!(feedback.actionable_changes, vec!["Quantify impact in bullet 3"]);
        assert_eq!(feedback.artifact_reference, "/d/1");
        assert_eq!(
            feedback.service_message.as_deref(),
            Some("File uploaded and processed")
        );
    }

    #[test]
    fn actionable_changes_are_optional() {
        let mut value = full_success();
        value["ai_feedback"]
            .as_object_mut()
            .unwrap()
            .remove("actionable_changes");
        let feedback = parse_upload_response(200, &body(value)).unwrap();
        assert!(feedback.actionable_changes.is_empty());
    }

    #[test]
    fn missing_score_is_a_parse_error() {
        let mut value = full_success();
        value["ai_feedback"]
            .as_object_mut()
            .unwrap()
            .remove("overall_score");
        let err = parse_upload_response(200, &body(value)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert_eq!(err.operation, Some(Operation::Upload));
        assert!(err.detail.as_deref().unwrap().contains("ai_feedback.overall_score"));
    }

    #[test]
    fn out_of_range_score_is_a_parse_error() {
        let mut value = full_success();
        value["ai_feedback"]["overall_score"] = json!(42);
        let err = parse_upload_response(200, &body(value)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
    }

    #[test]
    fn non_numeric_score_is_a_parse_error() {
        let mut value = full_success();
        value["ai_feedback"]["overall_score"] = json!("8/10");
        let err = parse_upload_response(200, &body(value)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
    }

    #[test]
    fn missing_download_url_is_a_parse_error() {
        let mut value = full_success();
        value["download_url"] = json!("");
        let err = parse_upload_response(200, &body(value)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert!(err.detail.as_deref().unwrap().contains("download_url"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_upload_response(200, b"<html>upstream</html>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert!(err.detail.as_deref().unwrap().starts_with("invalid JSON body"));
    }

    #[test]
    fn error_inside_success_status_is_a_server_error() {
        let err = parse_upload_response(200, &body(json!({ "error": "Empty filename" }))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServerError);
        assert_eq!(err.message, "Empty filename");

        let err = parse_upload_response(
            200,
            &body(json!({
                "filename": "resume.pdf",
                "ai_feedback": { "error": "AI response formatting issue." }
            })),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServerError);
        assert_eq!(err.message, "AI response formatting issue.");
    }

    #[test]
    fn failure_status_uses_service_message() {
        let err =
            parse_upload_response(500, &body(json!({ "error": "model unavailable" }))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServerError);
        assert_eq!(err.message, "model unavailable");
        assert_eq!(err.status, Some(500));
    }

    #[test]
    fn failure_status_without_structured_body_falls_back_to_status() {
        let err = parse_upload_response(502, b"Bad Gateway").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServerError);
        assert_eq!(
            err.message,
            "the analysis service responded with HTTP 502 Bad Gateway"
        );
        assert_eq!(err.status, Some(502));
        assert_eq!(err.detail.as_deref(), Some(WARMING_UP_HINT));

        let err = server_failure(Operation::Export, 404, br#"{"error": "   "}"#);
        assert_eq!(
            err.message,
            "the analysis service responded with HTTP 404 Not Found"
        );
        assert_eq!(err.operation, Some(Operation::Export));
    }
}
