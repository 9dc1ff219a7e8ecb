//! Webhook failures and their HTTP mapping.
//!
//! Error bodies follow the `{"detail": "..."}` shape form plugins already
//! log on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::email::SendError;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid secret")]
    Unauthorized,

    #[error("No destination email found (no 'email' field and RECIPIENT_FALLBACK not configured)")]
    NoDestination,

    /// Provider rejected the send; carries its response text verbatim.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebhookError::NoDestination => StatusCode::BAD_REQUEST,
            WebhookError::Upstream(_) => StatusCode::BAD_GATEWAY,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SendError> for WebhookError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Upstream { body, .. } => WebhookError::Upstream(body),
            other => WebhookError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode as ProviderStatus;

    #[test]
    fn test_status_codes() {
        assert_eq!(WebhookError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebhookError::NoDestination.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebhookError::Upstream("nope".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            WebhookError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_send_error() {
        let upstream = WebhookError::from(SendError::Upstream {
            status: ProviderStatus::FORBIDDEN,
            body: r#"{"message":"domain not verified"}"#.to_string(),
        });
        assert_eq!(upstream.to_string(), r#"{"message":"domain not verified"}"#);
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let missing_key = WebhookError::from(SendError::MissingApiKey);
        assert_eq!(missing_key.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(missing_key.to_string(), "RESEND_API_KEY not configured");
    }
}
