use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can report. All of them are local to the request.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } | ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Storage(e) => error!("[api] storage failure: {e}"),
            other => warn!("[api] {} {}", status.as_u16(), other),
        }

        let field = match &self {
            ApiError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };
        let body = ErrorBody {
            detail: self.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}

/// Reports the first offending field (alphabetical, so the answer is stable)
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let Some((field, errs)) = fields.into_iter().next() else {
            return ApiError::validation("body", "invalid payload");
        };
        let message = errs
            .first()
            .map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => describe_code(&e.code, &e.params),
            })
            .unwrap_or_else(|| "invalid value".to_string());

        ApiError::validation(field.to_string(), message)
    }
}

fn describe_code(
    code: &Cow<'static, str>,
    params: &std::collections::HashMap<Cow<'static, str>, serde_json::Value>,
) -> String {
    let bound = |key: &str| params.get(key).map(|v| v.to_string());
    match code.as_ref() {
        "length" => match (bound("min"), bound("max")) {
            (Some(min), Some(max)) => format!("length must be between {min} and {max}"),
            (Some(min), None) => format!("length must be at least {min}"),
            (None, Some(max)) => format!("length must be at most {max}"),
            _ => "invalid length".to_string(),
        },
        "range" => {
            let low = bound("min")
                .map(|v| format!(">= {v}"))
                .or_else(|| bound("exclusive_min").map(|v| format!("> {v}")));
            let high = bound("max")
                .map(|v| format!("<= {v}"))
                .or_else(|| bound("exclusive_max").map(|v| format!("< {v}")));
            match (low, high) {
                (Some(low), Some(high)) => format!("must be {low} and {high}"),
                (Some(limit), None) | (None, Some(limit)) => format!("must be {limit}"),
                _ => "out of range".to_string(),
            }
        }
        "email" => "invalid email format".to_string(),
        other => format!("failed check '{other}'"),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}
