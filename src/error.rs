use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::database::StoreError;
use crate::mailer::MailError;

/// 单个字段的校验错误
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorItem {
    pub field: String,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("validation failed")]
    Validation(Vec<ErrorItem>),
    #[error("{0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("too many requests")]
    TooManyRequests,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ErrorItem>>,
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut items: Vec<ErrorItem> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| ErrorItem {
                    field: field.clone(),
                    error: describe(&e.code),
                })
            })
            .collect();
        items.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(items)
    }
}

fn describe(code: &str) -> String {
    match code {
        "required" => "This field is required".into(),
        "length" => "The field does not meet the length requirement".into(),
        "email" => "The field must be a valid email address".into(),
        "img_base64_or_null" => "The field must be null or a valid Base64 string".into(),
        other => format!("Validation failed on tag: {}", other),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, errors) = match self {
            AppError::InvalidBody(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body".to_string(),
                None,
            ),
            AppError::Validation(items) => (
                StatusCode::BAD_REQUEST,
                "Validation error".to_string(),
                Some(items),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} not found", entity), None)
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests".to_string(),
                None,
            ),
            AppError::Store(e) => {
                tracing::error!("Document store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Mail(e) => {
                tracing::error!("Failed to send email: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error_message,
            errors,
        });

        (status, body).into_response()
    }
}
