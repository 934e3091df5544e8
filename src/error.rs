//! HTTP error type. Every failure leaves the server as one `{message}` body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DbError;

/// Body of every non-data response: `{ "message": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: DbError,
    },
}

impl ApiError {
    pub fn post_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Post with id {} not found", id))
    }

    /// Wrap a storage failure with the message shown to the caller.
    pub fn database(context: &'static str) -> impl FnOnce(DbError) -> Self {
        move |source| Self::Database { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::PayloadTooLarge(msg) => msg,
            Self::Database { context, source } => {
                match &source {
                    DbError::Connection(e) => {
                        tracing::error!(error = %e, "{}: database unreachable", context)
                    }
                    DbError::Query(e) => tracing::error!(error = %e, "{}: query failed", context),
                }
                context.to_string()
            }
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}

/// Body extraction failures (wrong content type, undecodable JSON) are
/// answered as validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
