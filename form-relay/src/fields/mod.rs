//! Field name normalization and alias resolution.
//!
//! Form builders label the same field in many ways ("E-mail", "email",
//! "Qual_o_seu_CRM?"). Keys are first folded into slug form, then each
//! semantic field is looked up through an ordered alias list.
//!
//! ```text
//! raw keys → slug_key() → FieldMap → ResolvedFields::resolve()
//! ```

pub mod normalize;
pub mod resolve;

use serde_json::{Map, Value};

pub use normalize::{normalize_payload, slug_key};
pub use resolve::{pick, value_to_string, ResolvedFields};

/// Flat mapping of field name to submitted value.
pub type FieldMap = Map<String, Value>;
