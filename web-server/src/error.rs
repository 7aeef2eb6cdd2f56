// web-server/src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::client::transport::TransportError;

/// Failures surfaced by the admin resource clients
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("another submission is already in flight")]
    Busy,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("content API request failed: {0}")]
    Transport(String),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl ResponseError for ClientError {
    fn status_code(&self) -> StatusCode {
        match self {
            ClientError::Busy => StatusCode::CONFLICT,
            ClientError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ClientError::NotFound(_) => StatusCode::NOT_FOUND,
            ClientError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
