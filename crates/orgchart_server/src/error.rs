//! Boundary error type and its HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, error};
use orgchart_core::db::DbError;
use orgchart_core::{ErrorKind, RepoError, ServiceError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Domain outcome from the core services.
    Service(ServiceError),
    /// Path segment is not an integer id.
    InvalidId { what: &'static str, raw: String },
    /// Request body is not the expected JSON shape.
    InvalidBody(String),
    /// Connection could not be opened or migrated.
    Db(DbError),
    /// Repository could not be built on the connection.
    Repo(RepoError),
    /// Blocking task panicked or was cancelled.
    Join(tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Transaction | ErrorKind::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::InvalidId { .. } | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Db(_) | Self::Repo(_) | Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_kind(&self) -> &'static str {
        match self {
            Self::Service(err) => err.kind().as_str(),
            Self::InvalidId { .. } | Self::InvalidBody(_) => "validation",
            Self::Db(_) | Self::Repo(_) | Self::Join(_) => "internal",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::InvalidId { what, raw } => write!(f, "invalid {what} id `{raw}`"),
            Self::InvalidBody(message) => write!(f, "invalid request body: {message}"),
            Self::Db(err) => write!(f, "database unavailable: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Join(err) => write!(f, "request worker failed: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Join(err) => Some(err),
            Self::InvalidId { .. } | Self::InvalidBody(_) => None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Join(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidBody(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=server status={} error_kind={} error={}",
                status.as_u16(),
                self.error_kind(),
                self
            );
        } else {
            debug!(
                "event=http_rejected module=server status={} error_kind={} error={}",
                status.as_u16(),
                self.error_kind(),
                self
            );
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
