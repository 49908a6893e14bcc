//! Error types for the optimization service.
//!
//! `status=failed` outcomes (empty window, infeasible model) are NOT errors
//! - they are ordinary `Ok` results of the facade carrying that status.
//! `OptimizeError` is reserved for request-shape problems and unexpected
//! solver failures, the only two cases that cross the HTTP boundary as
//! non-200 responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("shift {id}: {reason}")]
    InvalidShift { id: String, reason: String },

    #[error("request: {reason}")]
    InvalidRequest { reason: String },

    #[error("solver failure: {0}")]
    Solver(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for OptimizeError {
    fn into_response(self) -> Response {
        let status = match &self {
            OptimizeError::InvalidShift { .. } | OptimizeError::InvalidRequest { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            OptimizeError::Solver(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
