//! HTTP surface: `/health`, `/`, and `POST /optimize`.

use axum::extract::{FromRequest, Request};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::dto::{OptimizationRequestDto, OptimizationResponseDto, OptimizationStatus, SolutionDto};
use crate::error::OptimizeError;
use crate::facade::{OutcomeStatus, ScheduleSolver};

/// Wraps `axum::Json` so a malformed or schema-violating request body
/// surfaces as the same 422 the rest of the core uses for ill-formed
/// requests, rather than axum's default 400.
struct StrictJson<T>(T);

impl<S, T> FromRequest<S> for StrictJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = OptimizeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(StrictJson(value)),
            Err(rejection) => Err(OptimizeError::InvalidRequest {
                reason: rejection.body_text(),
            }),
        }
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(service_info))
        .route("/optimize", post(optimize))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Wire-compatibility version string for `/health` and `/`, independent of
/// this crate's own `Cargo.toml` version.
const SERVICE_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "optimization-service",
        version: SERVICE_VERSION,
    })
}

#[derive(Debug, Serialize)]
struct ServiceInfoResponse {
    service: &'static str,
    version: &'static str,
    endpoints: HashMap<&'static str, &'static str>,
}

async fn service_info() -> Json<ServiceInfoResponse> {
    let mut endpoints = HashMap::new();
    endpoints.insert("health", "/health");
    endpoints.insert("optimize", "/optimize (POST)");
    Json(ServiceInfoResponse {
        service: "optimization-service",
        version: SERVICE_VERSION,
        endpoints,
    })
}

/// `POST /optimize`: parses the request, drives the solver on a blocking
/// thread, and wraps the outcome in the response envelope.
async fn optimize(
    StrictJson(dto): StrictJson<OptimizationRequestDto>,
) -> Result<Json<OptimizationResponseDto>, OptimizeError> {
    let optimization_id = format!("opt_{}", &Uuid::new_v4().simple().to_string()[..8]);

    let request = dto.into_domain()?;
    let span = tracing::info_span!("optimize", optimization_id = %optimization_id);
    let outcome = tokio::task::spawn_blocking(move || span.in_scope(|| ScheduleSolver::solve(&request)))
        .await
        .map_err(|e| OptimizeError::Solver(format!("solver task panicked: {e}")))??;

    let status = match outcome.status {
        OutcomeStatus::Completed => OptimizationStatus::Completed,
        OutcomeStatus::Failed => OptimizationStatus::Failed,
    };
    let solutions: Vec<SolutionDto> = outcome.solutions.iter().map(SolutionDto::from).collect();

    Ok(Json(OptimizationResponseDto {
        optimization_id,
        status,
        solutions,
        total_solve_time: outcome.total_solve_time_ms,
        message: outcome.message,
    }))
}
