//! Error types for templeacct-api

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use templeacct_client::ClientError;
use templeacct_core::error::{ErrorCode, ErrorDetails};
use templeacct_core::{CoreError, Notice};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ClientError> for ApiError {
    fn from(error: ClientError) -> Self {
        ApiError::Core(error.into())
    }
}

impl From<templeacct_core::ValidationError> for ApiError {
    fn from(error: templeacct_core::ValidationError) -> Self {
        ApiError::Core(error.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(CoreError::RequestFailure { .. }) | ApiError::Core(CoreError::MalformedResponse { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Core(CoreError::Config(_)) | ApiError::Core(CoreError::Internal { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Notification shown in the page's notice area
    pub fn notice(&self) -> Notice {
        match self {
            ApiError::Core(error) => error.to_notice(),
            ApiError::NotFound { .. } | ApiError::BadRequest { .. } => Notice::warning(self.to_string()),
        }
    }

    pub fn details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(error) => error.to_details(),
            other => ErrorDetails::plain(ErrorCode::InvalidRequest, other.to_string()),
        }
    }
}

/// JSON body with the error details, for the `/api/*` endpoints
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "message": self.to_string(),
            "error": self.details(),
        });
        (
            self.status(),
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use templeacct_core::validate::DateField;
    use templeacct_core::{NoticeLevel, ValidationError};

    #[test]
    fn test_status_mapping() {
        let err: ApiError = ValidationError::MissingDate { field: DateField::AsOn }.into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.notice().level, NoticeLevel::Warning);

        let err: ApiError = ClientError::Transport { message: "connection refused".to_string() }.into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.notice().level, NoticeLevel::Error);

        let err = ApiError::NotFound { resource: "report cash-flow".to_string() };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::Core(CoreError::Internal { message: "bad header".to_string() });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details().code, ErrorCode::InternalError);
    }
}
