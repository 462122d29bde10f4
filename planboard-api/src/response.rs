/// Success response envelope
///
/// Every successful endpoint responds with
/// `{success: true, message, data?}`; the error half of the envelope
/// lives in [`crate::error`].

use axum::Json;
use serde::Serialize;

/// Success envelope wrapping a data payload
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always true
    pub success: bool,

    /// Human-readable summary
    pub message: String,

    /// Endpoint-specific payload, omitted when there is none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload in the success envelope
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// A bare acknowledgement with no data payload
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: None,
        })
    }
}
