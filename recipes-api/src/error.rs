//! HTTP error responses.
//!
//! Every failed request answers with a JSON body of the form
//! `{"code": "RECIPE_NOT_FOUND", "message": "...", "details": {...}}`.
//! The status is derived from `code`. Core `RecipeError`s are mapped here
//! so handlers can use `?` throughout.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recipes_core::{CacheError, RecipeError, StorageError, ValidationError};
use serde::Serialize;
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Machine-readable failure category, serialized in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body is not JSON or has a field of the wrong type (400)
    InvalidInput,

    /// No recipe has the requested id (404)
    RecipeNotFound,

    /// Path id is not a recipe id (500)
    MalformedId,

    InternalError,

    /// Record store failure (500)
    DatabaseError,

    /// Listing cache failure (500)
    CacheError,

    /// Cached listing does not decode (500)
    SerializationError,
}

impl ErrorCode {
    /// `MalformedId` answers 500: the public contract of the recipes
    /// endpoints reports a bad path id as a server error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::RecipeNotFound => StatusCode::NOT_FOUND,
            ErrorCode::MalformedId
            | ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::CacheError
            | ErrorCode::SerializationError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Request body is not a valid recipe",
            ErrorCode::RecipeNotFound => "Recipe has not found by the given id",
            ErrorCode::MalformedId => "Malformed recipe id",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Record store unavailable",
            ErrorCode::CacheError => "Listing cache unavailable",
            ErrorCode::SerializationError => "Cached listing could not be decoded",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR
// ============================================================================

/// Error body returned by every recipe and health handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,

    /// Extra context, such as the failing seed entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn malformed_id(value: &str) -> Self {
        Self::new(
            ErrorCode::MalformedId,
            format!("'{}' is not a valid recipe id", value),
        )
    }

    pub fn recipe_not_found() -> Self {
        Self::from_code(ErrorCode::RecipeNotFound)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn cache_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CacheError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Rejected request bodies are client errors, never 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MalformedId { value } => ApiError::malformed_id(&value),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => ApiError::recipe_not_found(),
            other => {
                tracing::error!(error = %other, "Record store error");
                ApiError::database_error(other.to_string())
            }
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        tracing::error!(error = %err, "Listing cache error");
        match err {
            CacheError::Corrupted { .. } => {
                ApiError::new(ErrorCode::SerializationError, err.to_string())
            }
            other => ApiError::cache_error(other.to_string()),
        }
    }
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::Validation(e) => e.into(),
            RecipeError::Storage(e) => e.into(),
            RecipeError::Cache(e) => e.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
