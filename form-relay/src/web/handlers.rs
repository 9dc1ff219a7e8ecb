//! Webhook endpoint handlers.
//!
//! The webhook handler runs the whole relay for one submission:
//! 1. Extract and normalize the posted fields
//! 2. Verify the shared secret (if configured)
//! 3. Resolve the semantic fields and pick a destination address
//! 4. Send the notification through Resend

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::email::{OutboundEmail, ResendClient};
use crate::extract::{extract_payload, SECRET_KEY};
use crate::fields::{normalize_payload, ResolvedFields};
use crate::web::error::WebhookError;
use crate::Config;

/// Characters of the raw body kept in the diagnostic log.
pub const RAW_BODY_LOG_LIMIT: usize = 2000;

/// Subject of every notification.
pub const NOTIFICATION_SUBJECT: &str = "Recebemos seu contato";

/// Body of every notification. It does not include the submitted fields.
pub const NOTIFICATION_HTML: &str =
    "<p>Recebemos sua mensagem. Em breve entraremos em contato.</p>";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: ResendClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mailer = ResendClient::from_config(&config);
        Self {
            config: Arc::new(config),
            mailer,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

// =============================================================================
// Form Webhook
// =============================================================================

/// Successful relay response.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub provider_response: Value,
}

/// Form submission webhook.
///
/// Accepts URL-encoded, multipart and JSON bodies. Field labels are
/// normalized before lookup, so "E-mail" and "email" both resolve.
pub async fn form_webhook(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let raw_body = String::from_utf8_lossy(&body).into_owned();

    let extraction = extract_payload(&content_type, body).await;
    let provided_secret = extraction
        .secret()
        .or_else(|| query_secret(query.as_deref()))
        .filter(|s| !s.is_empty());
    let data = normalize_payload(&extraction.into_fields());

    if state.config.secret_required()
        && !provided_secret
            .as_deref()
            .is_some_and(|s| constant_time_compare(s, &state.config.webhook_secret))
    {
        warn!(
            content_type = %content_type,
            has_secret = provided_secret.is_some(),
            "webhook_secret_invalid"
        );
        return Err(WebhookError::Unauthorized);
    }

    let fields = ResolvedFields::resolve(&data);

    info!(
        content_type = %content_type,
        raw_body = %truncate_chars(&raw_body, RAW_BODY_LOG_LIMIT),
        resolved = %serde_json::to_string(&fields).unwrap_or_default(),
        "webhook_received"
    );

    let to = destination(&fields, &state.config).ok_or_else(|| {
        warn!(field_count = data.len(), "webhook_no_destination");
        WebhookError::NoDestination
    })?;

    let email = OutboundEmail {
        to,
        subject: NOTIFICATION_SUBJECT.to_string(),
        html: NOTIFICATION_HTML.to_string(),
    };

    match state.mailer.send(&email).await {
        Ok(provider_response) => {
            info!(to = %email.to, "webhook_relayed");
            Ok(Json(WebhookResponse {
                status: "ok",
                provider_response,
            }))
        }
        Err(e) => {
            error!(to = %email.to, error = ?e, "webhook_send_failed");
            Err(e.into())
        }
    }
}

/// `secret` from the query string. A repeated parameter keeps its last value.
fn query_secret(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .filter(|(key, _)| key == SECRET_KEY)
        .map(|(_, value)| value.into_owned())
        .last()
}

/// Resolved email if non-blank, otherwise the configured fallback.
fn destination(fields: &ResolvedFields, config: &Config) -> Option<String> {
    non_blank(fields.email.as_deref())
        .or_else(|| non_blank(Some(config.recipient_fallback.as_str())))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Cut `s` to at most `max` characters, respecting char boundaries.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
