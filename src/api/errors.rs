//! HTTP error mapping.
//!
//! Domain errors collapse to the compact `{"error": "..."}` wire shape the
//! clients expect. Validation and funds failures keep their distinct
//! messages; everything internal is deliberately opaque, with detail going
//! to the logs instead of the response body.

use crate::errors::CasinoError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid identity header")]
    Unauthorized,

    #[error("caller is not an administrator")]
    Forbidden,

    #[error(transparent)]
    Casino(#[from] CasinoError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            ApiError::Casino(e) => match e {
                CasinoError::InvalidRequest(detail)
                | CasinoError::InvalidSelection(detail)
                | CasinoError::UnsupportedGame(detail) => {
                    tracing::debug!(%detail, "rejected request");
                    (StatusCode::BAD_REQUEST, "Invalid request")
                }
                CasinoError::InsufficientFunds => {
                    (StatusCode::BAD_REQUEST, "Insufficient funds")
                }
                CasinoError::UserNotFound(_) => (StatusCode::NOT_FOUND, "User not found"),
                CasinoError::AccountExists(_) => (StatusCode::CONFLICT, "User already exists"),
                CasinoError::ConcurrentModification(_) => {
                    (StatusCode::CONFLICT, "Concurrent modification, retry")
                }
                CasinoError::EntropyUnavailable(detail) => {
                    tracing::error!(%detail, "entropy source failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
                }
                CasinoError::PartialSettlement { .. }
                | CasinoError::Storage(_)
                | CasinoError::Configuration(_) => {
                    tracing::error!(error = %e, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
                }
            },
        };

        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            status_of(CasinoError::InvalidRequest("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CasinoError::InsufficientFunds.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CasinoError::UserNotFound("u".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CasinoError::EntropyUnavailable("os".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CasinoError::PartialSettlement {
                wager_id: "w".into(),
                detail: "d".into()
            }
            .into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
    }
}
