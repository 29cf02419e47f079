use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use retirement_core::EngineError;
use serde_json::json;

/// API-facing error type. Wraps kernel errors, storage errors, and request
/// validation failures behind one `IntoResponse` impl.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("no persisted result for plan: {0}")]
    ResultNotFound(String),

    #[error("invalid parameter: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("engine error: {0:?}")]
    Engine(EngineError),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal lock error")]
    Lock,
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ApiError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        ApiError::Lock
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::PlanNotFound(_) | ApiError::ResultNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::ValidationError { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Engine(EngineError::Cancelled) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ApiError::Engine(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Serialization(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Database(_) => {
                tracing::error!(error = %self, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal database error".to_string())
            }
            ApiError::Lock => {
                tracing::error!(error = %self, "lock poisoned");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
