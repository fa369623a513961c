use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use tradepilot_core::{OracleError, OracleErrorKind, PredictorError};
use tradepilot_strategies::StrategyError;

use crate::config::ConfigError;

/// Error returned by request handlers, rendered as `{"error": {...}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("price oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("price predictor failed: {0}")]
    Predictor(#[from] PredictorError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    kind: &'a str,
    code: &'a str,
    message: String,
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Strategy(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Strategy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Oracle(error) if error.kind() == OracleErrorKind::UnknownAsset => {
                StatusCode::NOT_FOUND
            }
            Self::Oracle(_) | Self::Predictor(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Strategy(error) => error.kind().as_str(),
            Self::NotFound { .. } => "NotFound",
            Self::BadRequest(_) => "BadRequest",
            Self::Oracle(_) => "OracleUnavailable",
            Self::Predictor(_) => "PredictorUnavailable",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Strategy(error) => error.code(),
            Self::NotFound { .. } => "api.not_found",
            Self::BadRequest(_) => "api.bad_request",
            Self::Oracle(error) => error.code(),
            Self::Predictor(error) => error.code(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(code = self.code(), error = %self, "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Startup failures mapped to process exit codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
        }
    }
}
