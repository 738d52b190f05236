//! Error types for the status API.
//!
//! [`ObserverError`] converts into an HTTP response with a JSON body via
//! its [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the status API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// No tick has published a snapshot yet.
    #[error("no snapshot published yet")]
    NoSnapshot,

    /// The server was started without scheduler control attached.
    #[error("scheduler control not available")]
    ControlUnavailable,

    /// A request carried an invalid value.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NoSnapshot | Self::ControlUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
