//! Blocking HTTP client for a running `loan-score serve` instance.
//!
//! Used by `loan-score score --url ...` and `loan-score evaluate --url ...`.
//! Server error bodies are mapped back onto the same exit codes local calls
//! would produce.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{ApplicationRecord, HealthStatus, LoanEvaluation, LoanRequest, ScoredResult};
use crate::error::{AppError, EXIT_UNAVAILABLE, EXIT_USAGE, EXIT_VALIDATION};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

pub struct ScoreClient {
    client: Client,
    base_url: String,
}

impl ScoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn health(&self) -> Result<HealthStatus, AppError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .map_err(|e| AppError::new(EXIT_UNAVAILABLE, format!("Health request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                EXIT_UNAVAILABLE,
                format!("Health request failed with status {}.", resp.status()),
            ));
        }

        resp.json()
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to parse health response: {e}")))
    }

    pub fn score(&self, record: &ApplicationRecord) -> Result<ScoredResult, AppError> {
        self.post("score", record)
    }

    pub fn evaluate(&self, request: &LoanRequest) -> Result<LoanEvaluation, AppError> {
        self.post("evaluate", request)
    }

    fn post<B, R>(&self, route: &str, body: &B) -> Result<R, AppError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}/{route}", self.base_url))
            .json(body)
            .send()
            .map_err(|e| AppError::new(EXIT_UNAVAILABLE, format!("Request to /{route} failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return resp.json().map_err(|e| {
                AppError::new(EXIT_USAGE, format!("Failed to parse /{route} response: {e}"))
            });
        }

        let code = match status {
            StatusCode::UNPROCESSABLE_ENTITY => EXIT_VALIDATION,
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::INTERNAL_SERVER_ERROR => EXIT_UNAVAILABLE,
            _ => EXIT_USAGE,
        };
        let detail = match resp.json::<ErrorBody>() {
            Ok(body) => format!("{}: {}", body.error, body.message),
            Err(_) => "no error body".to_string(),
        };
        Err(AppError::new(
            code,
            format!("Request to /{route} failed with status {status} ({detail})."),
        ))
    }
}
