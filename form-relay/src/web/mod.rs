//! Web server module for receiving form webhooks.
//!
//! Routes:
//! - `GET /health`: liveness probe
//! - `POST /webhook`: form submission relay

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, WebhookError};
pub use handlers::{
    form_webhook, health, AppState, HealthResponse, WebhookResponse,
    NOTIFICATION_HTML, NOTIFICATION_SUBJECT,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(form_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
