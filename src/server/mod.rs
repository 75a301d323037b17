//! HTTP surface for the scorer.
//!
//! Routes:
//! - `GET /health` -> `{ "ok": bool, "version": "..." }`, always 200
//! - `POST /score` -> `{ "pd", "recommended_apr", "model_version" }`
//! - `POST /evaluate` -> `{ "approved", "ltv", "dti", "principal", "offers" }`
//!   (rule-based, answers even when no model is loaded)
//!
//! The [`Scorer`] is loaded once before the listener starts and shared through
//! axum `State`; handlers never touch the filesystem.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::domain::{
    ApplicationRecord, HealthStatus, LoanEvaluation, LoanRequest, ScoredResult, ServeConfig,
};
use crate::error::{AppError, EXIT_UNAVAILABLE, EXIT_USAGE, ScoreError};
use crate::offers::evaluate_loan;
use crate::scoring::Scorer;

/// Build the router over a shared scorer.
pub fn router(scorer: Arc<Scorer>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/score", post(score))
        .route("/evaluate", post(evaluate))
        .layer(TraceLayer::new_for_http())
        .with_state(scorer)
}

async fn health(State(scorer): State<Arc<Scorer>>) -> Json<HealthStatus> {
    Json(scorer.health())
}

async fn score(
    State(scorer): State<Arc<Scorer>>,
    payload: Result<Json<ApplicationRecord>, JsonRejection>,
) -> Result<Json<ScoredResult>, ApiError> {
    let Json(record) = payload.map_err(ApiError::from)?;
    let result = scorer.score(&record).map_err(ApiError::from)?;
    Ok(Json(result))
}

async fn evaluate(
    payload: Result<Json<LoanRequest>, JsonRejection>,
) -> Result<Json<LoanEvaluation>, ApiError> {
    let Json(request) = payload.map_err(ApiError::from)?;
    let result = evaluate_loan(&request).map_err(ApiError::from)?;
    Ok(Json(result))
}

/// JSON error body returned by `/score` and `/evaluate`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    message: String,
}

/// A request failure mapped to an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl From<ScoreError> for ApiError {
    fn from(err: ScoreError) -> Self {
        let message = err.to_string();
        match err {
            ScoreError::Validation { field, .. } => {
                debug!(field, %message, "rejected application");
                Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    body: ErrorBody {
                        error: "validation_error",
                        field: Some(field),
                        message,
                    },
                }
            }
            ScoreError::ModelUnavailable(_) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ErrorBody {
                    error: "model_unavailable",
                    field: None,
                    message,
                },
            },
            ScoreError::Prediction(_) => {
                warn!(%message, "prediction failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        error: "prediction_failed",
                        field: None,
                        message,
                    },
                }
            }
            ScoreError::Evaluation(_) => {
                warn!(%message, "evaluation failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        error: "evaluation_failed",
                        field: None,
                        message,
                    },
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected payload");
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "invalid_payload",
                field: None,
                message: rejection.body_text(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn serve(config: &ServeConfig, scorer: Arc<Scorer>) -> Result<(), AppError> {
    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to bind '{}': {e}", config.bind)))?;
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to read listen address: {e}")))?;

    info!(
        %addr,
        model_ready = scorer.is_ready(),
        version = scorer.version(),
        "loan-score listening on http://{addr}"
    );

    axum::serve(listener, router(scorer))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::new(EXIT_UNAVAILABLE, format!("Server error: {e}")))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_failure_is_a_server_error() {
        let err = ApiError::from(ScoreError::Prediction("non-finite score".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "prediction_failed");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn evaluation_failure_is_a_server_error() {
        let err = ApiError::from(ScoreError::Evaluation("dti is not finite".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "evaluation_failed");
    }

    #[test]
    fn validation_failure_names_the_field() {
        let err = ApiError::from(ScoreError::validation("dti", "must be in [0, 5]"));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.field, Some("dti"));
    }
}
