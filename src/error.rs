//! Error taxonomy shared by every handler.
//!
//! Validation failures are detected before any mutation and carry a stable,
//! descriptive message. Store/infrastructure faults are logged in full and
//! surfaced as an opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("insufficient stock for the requested quantity")]
    InsufficientStock,

    #[error("cart is empty")]
    EmptyCart,

    #[error("amount received is less than the total")]
    InsufficientPayment,

    #[error("missing or invalid credentials")]
    Unauthorized,

    #[error("access denied for this role")]
    Forbidden,

    #[error("invoice rendering failed: {0}")]
    RenderingFailed(String),

    #[error("internal error")]
    Internal(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::InsufficientStock
            | ApiError::EmptyCart
            | ApiError::InsufficientPayment => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::RenderingFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Store errors keep their detail in the log, not in the body.
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "request failed on a store error");
                "internal error".to_string()
            }
            ApiError::RenderingFailed(e) => {
                tracing::error!(error = %e, "invoice rendering failed");
                "could not generate the invoice document".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_map_to_400() {
        assert_eq!(
            ApiError::InvalidInput("quantity must be positive".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::EmptyCart.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InsufficientPayment.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InsufficientStock.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_and_lookup_failures_keep_their_codes() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("product").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::RenderingFailed("font table".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_are_stable() {
        assert_eq!(ApiError::EmptyCart.to_string(), "cart is empty");
        assert_eq!(
            ApiError::NotFound("sale").to_string(),
            "sale not found"
        );
    }
}
