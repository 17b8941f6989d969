//! # Error Handling for restkit APIs
//!
//! [`ApiError`] maps each failure onto an HTTP status and a sanitized body in
//! the same `errors` envelope the response builder produces:
//!
//! ```json
//! {"errors": [{"message": "Product not found", "template": "Product not found", "code": "not_found"}]}
//! ```
//!
//! Database and internal details are logged through `tracing` and never sent
//! to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use std::fmt;

use crate::error_list::{ErrorItem, ErrorList};
use crate::filtering::FilterError;
use crate::response::JsonResponseBuilder;

pub const NOT_FOUND_CODE: &str = "not_found";
pub const BAD_REQUEST_CODE: &str = "bad_request";
pub const ACCESS_DENIED_CODE: &str = "access_denied";
pub const INVALID_FILTER_CODE: &str = "invalid_filter";
pub const INTERNAL_ERROR_CODE: &str = "internal_error";

#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - Resource doesn't exist
    NotFound {
        resource: String,
        id: Option<String>,
    },

    /// 400 Bad Request - Malformed input
    BadRequest { message: String, code: String },

    /// 403 Forbidden - Caller lacks the role required for the action
    Forbidden { message: String },

    /// 400 Bad Request - Form validation failed; carries every field error
    ValidationFailed { errors: ErrorList },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database { internal: DbErr },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: BAD_REQUEST_CODE.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn access_denied() -> Self {
        Self::forbidden("Access denied")
    }

    #[must_use]
    pub fn validation_failed(errors: ErrorList) -> Self {
        Self::ValidationFailed { errors }
    }

    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database { internal: err }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The sanitized message shown to clients
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::BadRequest { message, .. }
            | Self::Forbidden { message }
            | Self::Internal { message, .. } => message.clone(),
            Self::ValidationFailed { errors } => match errors.errors() {
                [single] => single.message.clone(),
                _ => format!("Validation failed with {} error(s)", errors.len()),
            },
            Self::Database { .. } => "A database error occurred".to_string(),
        }
    }

    fn code(&self) -> &str {
        match self {
            Self::NotFound { .. } => NOT_FOUND_CODE,
            Self::BadRequest { code, .. } => code,
            Self::Forbidden { .. } => ACCESS_DENIED_CODE,
            Self::ValidationFailed { errors } => errors.code(),
            Self::Database { .. } | Self::Internal { .. } => INTERNAL_ERROR_CODE,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let mut builder = JsonResponseBuilder::new();
        match self {
            Self::ValidationFailed { errors } => {
                builder.add_error_list(errors);
            }
            other => {
                builder.add_error(ErrorItem::new(other.user_message(), other.code()));
            }
        }
        builder.build(status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `RecordNotFound` becomes 404; every other `DbErr` is a logged 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::not_found(resource, None)
            }
            _ => Self::database(err),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        Self::BadRequest {
            message: err.to_string(),
            code: INVALID_FILTER_CODE.to_string(),
        }
    }
}

impl From<ErrorList> for ApiError {
    fn from(errors: ErrorList) -> Self {
        Self::validation_failed(errors)
    }
}
