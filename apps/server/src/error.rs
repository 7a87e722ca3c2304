use std::io::Error as IoError;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::auth::AuthError;

/// Startup-level failures; fatal before the server binds.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] settings::Error),
}

/// Handler-level failures with an HTTP mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("invalid Authorization header")]
    BadAuthorizationHeader,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::InvalidCredentials | AuthError::InvalidToken(_) | AuthError::MissingToken) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Auth(AuthError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Auth(AuthError::MissingSecret) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadAuthorizationHeader => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "detail": self.to_string() }))
    }
}
