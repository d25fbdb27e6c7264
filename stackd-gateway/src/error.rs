//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use stackd_core::StoreError;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// An error propagated from the stack store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A query parameter is missing or not parseable. The message is the
    /// exact wire text.
    #[error("{0}")]
    BadParam(&'static str),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Wire texts are part of the API contract; clients match on them.
        let (status, body): (StatusCode, String) = match self {
            GatewayError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Stack not found".to_owned())
            }
            GatewayError::Store(StoreError::TooManyStacks(max)) => (
                StatusCode::BAD_REQUEST,
                format!("Maximum number of stacks reached ({max})"),
            ),
            GatewayError::Store(StoreError::StackOverflow(_)) => {
                (StatusCode::BAD_REQUEST, "Stack overflow".to_owned())
            }
            GatewayError::Store(StoreError::ValueOutOfRange) => {
                (StatusCode::BAD_REQUEST, "Value is too large".to_owned())
            }
            GatewayError::Store(StoreError::MissingValues) => {
                (StatusCode::BAD_REQUEST, "Values must be provided".to_owned())
            }
            GatewayError::Store(StoreError::Underflow) => {
                (StatusCode::BAD_REQUEST, "Stack underflow".to_owned())
            }
            GatewayError::Store(StoreError::Empty) => {
                (StatusCode::BAD_REQUEST, "Stack is empty".to_owned())
            }
            GatewayError::Store(other) => {
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
            GatewayError::BadParam(msg) => (StatusCode::BAD_REQUEST, msg.to_owned()),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_with_wire_text() {
        let resp = GatewayError::from(StoreError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn capacity_errors_map_to_400() {
        let resp = GatewayError::from(StoreError::TooManyStacks(1000)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = GatewayError::from(StoreError::StackOverflow(102_400)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_param_maps_to_400() {
        let resp = GatewayError::BadParam("Stack ID must be an integer").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn display_carries_the_store_message() {
        let err = GatewayError::from(StoreError::Underflow);
        assert_eq!(err.to_string(), "stack underflow");
    }
}
