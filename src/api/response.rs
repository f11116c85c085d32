//! Response types for the Renewal Workflow Engine API.
//!
//! Every batch action answers with a one-field JSON envelope: either
//! `{"success": msg}` or `{"error": msg}`. Caller errors come back as
//! HTTP 400 with the error envelope; the engine never answers 5xx for
//! a failed batch.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::workflow::BatchOutcome;

/// The JSON envelope returned by every batch action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// The outcome description, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    /// The failure description, on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiMessage {
    /// Builds a success envelope.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            error: None,
        }
    }

    /// Builds an error envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(message.into()),
        }
    }
}

/// A 200 response describing a completed batch, naming the ids that
/// matched no renewal when there were any.
pub fn batch_success(outcome: &BatchOutcome) -> Response {
    let message = if outcome.skipped.is_empty() {
        format!("{} renewal(s) updated.", outcome.updated)
    } else {
        format!(
            "{} renewal(s) updated, {} id(s) not found.",
            outcome.updated,
            outcome.skipped.len()
        )
    };
    (StatusCode::OK, Json(ApiMessage::success(message))).into_response()
}

/// A 200 response with an ad-hoc success message.
pub fn success_message(message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiMessage::success(message))).into_response()
}

/// A 400 response carrying the error envelope.
pub fn error_response(error: &EngineError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiMessage::error(error.to_string())),
    )
        .into_response()
}

/// A 400 response with an ad-hoc error message.
pub fn error_message(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiMessage::error(message))).into_response()
}
