//! Required-field checks for post payloads, run as middleware ahead of the
//! create and update handlers.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::Value;
use std::error::Error as StdError;
use thiserror::Error;

use crate::error::ApiError;

/// Fields every post payload must carry, in reporting order.
pub const REQUIRED_FIELDS: [(&str, FieldKind); 6] = [
    ("title", FieldKind::Text),
    ("image", FieldKind::Text),
    ("category_id", FieldKind::Id),
    ("description", FieldKind::Text),
    ("content", FieldKind::Text),
    ("status_id", FieldKind::Id),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string
    Text,
    /// Non-zero integer within i32 range
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Request body is not valid JSON")]
    MalformedJson,

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a string")]
    NotText { field: &'static str },

    #[error("{field} must be a non-zero integer")]
    NotId { field: &'static str },
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

/// Check that `body` holds all six post fields with truthy values.
/// Reports the first failing field.
pub fn validate_post_body(body: &Value) -> Result<(), ValidationError> {
    let fields = body.as_object().ok_or(ValidationError::NotAnObject)?;

    for (field, kind) in REQUIRED_FIELDS {
        let value = match fields.get(field) {
            None | Some(Value::Null) => return Err(ValidationError::Missing { field }),
            Some(v) => v,
        };

        match kind {
            FieldKind::Text => match value.as_str() {
                Some("") => return Err(ValidationError::Empty { field }),
                Some(_) => {}
                None => return Err(ValidationError::NotText { field }),
            },
            FieldKind::Id => {
                let valid = value
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .is_some_and(|n| n != 0);
                if !valid {
                    return Err(ValidationError::NotId { field });
                }
            }
        }
    }

    Ok(())
}

/// True when the body stream was cut off by the request size limit.
fn exceeds_body_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn StdError + 'static));
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Buffers the request body, rejects it with 400 when a required post field
/// is missing or falsy, and otherwise forwards the untouched bytes.
pub async fn require_post_fields(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_body_limit(&e) => {
            tracing::warn!(method = %parts.method, uri = %parts.uri, "request body over limit");
            return ApiError::PayloadTooLarge("Request body is too large".into()).into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            return ApiError::Validation("Request body could not be read".into()).into_response();
        }
    };

    let checked = serde_json::from_slice::<Value>(&bytes)
        .map_err(|_| ValidationError::MalformedJson)
        .and_then(|value| validate_post_body(&value));

    if let Err(e) = checked {
        tracing::debug!(method = %parts.method, uri = %parts.uri, reason = %e, "post payload rejected");
        return ApiError::from(e).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
