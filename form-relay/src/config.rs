//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup and shared read-only with the handlers.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Default Resend API base URL.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

/// Default sender address used when `SENDER_EMAIL` is unset.
pub const DEFAULT_SENDER_EMAIL: &str = "no-reply@youve.co";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Resend API key. Empty means sends fail at request time.
    pub resend_api_key: String,

    /// Resend API base URL (without the `/emails` path)
    pub resend_api_url: String,

    /// Address the notification is sent from
    pub sender_email: String,

    /// Recipient used when the submission carries no email field
    pub recipient_fallback: String,

    /// Shared webhook secret. Empty disables the check.
    pub webhook_secret: String,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            resend_api_key: env::var("RESEND_API_KEY").unwrap_or_default(),

            resend_api_url: env::var("RESEND_API_URL")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),

            sender_email: env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| DEFAULT_SENDER_EMAIL.to_string()),

            recipient_fallback: env::var("RECIPIENT_FALLBACK").unwrap_or_default(),

            webhook_secret: env::var("WEBHOOK_SECRET").unwrap_or_default(),

            request_timeout_ms: parse_number("REQUEST_TIMEOUT_MS", 20_000),

            port: parse_number("PORT", 8080),
        }
    }

    /// Whether requests must carry the shared secret.
    pub fn secret_required(&self) -> bool {
        !self.webhook_secret.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            resend_api_key: String::new(),
            resend_api_url: DEFAULT_RESEND_API_URL.to_string(),
            sender_email: DEFAULT_SENDER_EMAIL.to_string(),
            recipient_fallback: String::new(),
            webhook_secret: String::new(),
            request_timeout_ms: 20_000,
            port: 8080,
        }
    }
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_valid() {
        env::set_var("TEST_FORM_RELAY_NUMBER", " 1500 ");
        let result: u64 = parse_number("TEST_FORM_RELAY_NUMBER", 0);
        assert_eq!(result, 1500);
        env::remove_var("TEST_FORM_RELAY_NUMBER");
    }

    #[test]
    fn test_parse_number_invalid_uses_default() {
        env::set_var("TEST_FORM_RELAY_BAD_PORT", "eighty");
        let result: u16 = parse_number("TEST_FORM_RELAY_BAD_PORT", 8080);
        assert_eq!(result, 8080);
        env::remove_var("TEST_FORM_RELAY_BAD_PORT");
    }

    #[test]
    fn test_parse_number_default() {
        let result: u64 = parse_number("NONEXISTENT_FORM_RELAY_VAR", 20_000);
        assert_eq!(result, 20_000);
    }

    #[test]
    fn test_secret_required() {
        let mut config = Config::default();
        assert!(!config.secret_required());

        config.webhook_secret = "s3cret".to_string();
        assert!(config.secret_required());
    }

    #[test]
    fn test_default_timeout_is_twenty_seconds() {
        assert_eq!(Config::default().request_timeout(), Duration::from_secs(20));
    }
}
