//! Service-level error type and its HTTP mapping.

use crate::backend::BackendError;
use crate::dispatch::DispatchError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// Errors surfaced by the endpoint layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("query timed out after {0} seconds")]
    Timeout(u64),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create a bad-request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Dispatch(DispatchError::Backend(BackendError::Status { .. }))
            | ServiceError::Dispatch(DispatchError::Backend(BackendError::Transport(_))) => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Dispatch(_) | ServiceError::Configuration(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

/// Result type for endpoint operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::bad_request("missing query").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::configuration("bad port").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let backend = ServiceError::Dispatch(DispatchError::Backend(BackendError::Status {
            status: 503,
            body: "overloaded".to_string(),
        }));
        assert_eq!(backend.status_code(), StatusCode::BAD_GATEWAY);
        let not_found =
            ServiceError::Dispatch(DispatchError::FormatNotFound("YAML".to_string()));
        assert_eq!(not_found.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
