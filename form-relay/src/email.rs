//! Resend transactional email client.
//!
//! One POST per notification, no retries. Reference:
//! https://resend.com/docs/api-reference/emails/send-email

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::Config;

/// A notification ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// JSON body of Resend's send-email endpoint.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("RESEND_API_KEY not configured")]
    MissingApiKey,

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("request to provider failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider response was not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Thin client for the Resend API.
#[derive(Clone)]
pub struct ResendClient {
    client: Client,
    api_key: String,
    endpoint: String,
    sender: String,
    timeout: Duration,
}

impl ResendClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.resend_api_key.clone(),
            endpoint: format!("{}/emails", config.resend_api_url.trim_end_matches('/')),
            sender: config.sender_email.clone(),
            timeout: config.request_timeout(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Client::new(), config)
    }

    /// Send `email` and return the provider's JSON response.
    pub async fn send(&self, email: &OutboundEmail) -> Result<Value, SendError> {
        if self.api_key.is_empty() {
            error!("resend_api_key_missing");
            return Err(SendError::MissingApiKey);
        }

        let payload = SendEmailRequest {
            from: &self.sender,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        info!(
            to = %email.to,
            subject = %email.subject,
            timeout_seconds = self.timeout.as_secs_f64(),
            "email_send_starting"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(to = %email.to, error = %e, "email_send_timeout");
                } else {
                    error!(to = %email.to, error = %e, "email_send_request_error");
                }
                SendError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        to = %email.to,
                        status_code = status.as_u16(),
                        error = %e,
                        "email_send_error_body_unreadable"
                    );
                    String::new()
                }
            };
            error!(
                to = %email.to,
                status_code = status.as_u16(),
                body = %body,
                "email_send_rejected"
            );
            return Err(SendError::Upstream { status, body });
        }

        let body: Value = response.json().await.map_err(SendError::Decode)?;
        let provider_id = body.get("id").and_then(serde_json::Value::as_str).unwrap_or("");

        info!(
            to = %email.to,
            status_code = status.as_u16(),
            provider_id = provider_id,
            "email_send_complete"
        );

        Ok(body)
    }
}
