use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

// The only caller-visible request error: the rate limiter said no
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limited ({limit} reqs/min)")]
    RateLimited { limit: u32 },
}

// Startup failures while loading the reasons file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read reasons file: {0}")]
    Io(#[from] std::io::Error),
    #[error("reasons file is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reasons file contains no entries")]
    Empty,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::RateLimited { limit } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!(
                    "Too many requests, please try again later. ({} reqs/min/IP)",
                    limit
                ),
            ),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
