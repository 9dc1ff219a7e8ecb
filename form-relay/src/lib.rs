//! Form Relay - webhook receiver that turns form submissions into email
//! notifications.
//!
//! ## Architecture
//!
//! ```text
//! POST /webhook → extract → normalize keys → resolve fields → Resend
//! ```

pub mod config;
pub mod email;
pub mod extract;
pub mod fields;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use email::{OutboundEmail, ResendClient, SendError};
pub use extract::{extract_payload, Extraction, PayloadFormat};
pub use fields::{normalize_payload, pick, slug_key, FieldMap, ResolvedFields};
pub use web::{router, AppState};
