//! Request body extraction into a flat field map.
//!
//! Form plugins post either `application/x-www-form-urlencoded`,
//! `multipart/form-data` or JSON (optionally in Elementor's
//! `{"fields": [{"id": ..., "value": ...}]}` shape). Extraction never fails the
//! request: a body that cannot be parsed yields [`Extraction::Degraded`] and
//! an empty field map, and the destination check rejects it later.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{header, Request},
};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::fields::{slug_key, value_to_string, FieldMap};

/// Top-level key holding Elementor's nested field list.
pub const ELEMENTOR_FIELDS_KEY: &str = "fields";

/// Identifier keys of an Elementor field entry, in priority order.
pub const ELEMENTOR_ID_KEYS: &[&str] = &["id", "name", "label"];

/// Body key that may carry the shared secret.
pub const SECRET_KEY: &str = "secret";

/// Body encoding selected from the content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Multipart,
    UrlEncoded,
}

impl PayloadFormat {
    /// Pick the decoder for a content type. Anything that is neither JSON nor
    /// multipart, including a missing header, is read as URL-encoded.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("application/json") {
            PayloadFormat::Json
        } else if content_type.contains("multipart/form-data") {
            PayloadFormat::Multipart
        } else {
            PayloadFormat::UrlEncoded
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::Json => "json",
            PayloadFormat::Multipart => "multipart",
            PayloadFormat::UrlEncoded => "urlencoded",
        }
    }
}

/// Why a body could not be read.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("JSON body is not an object")]
    NotAnObject,

    #[error("entry {0} of the fields list is not an object")]
    InvalidFieldEntry(usize),

    #[error("invalid multipart body: {0}")]
    Multipart(String),
}

/// Outcome of reading a request body.
#[derive(Debug)]
pub enum Extraction {
    Parsed {
        format: PayloadFormat,
        fields: FieldMap,
    },
    /// The body could not be parsed; it contributes no fields.
    Degraded {
        format: PayloadFormat,
        error: ExtractError,
    },
}

impl Extraction {
    pub fn format(&self) -> PayloadFormat {
        match self {
            Extraction::Parsed { format, .. } | Extraction::Degraded { format, .. } => *format,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Extraction::Degraded { .. })
    }

    /// Shared secret carried in the body, if any.
    pub fn secret(&self) -> Option<String> {
        match self {
            Extraction::Parsed { fields, .. } => fields
                .get(SECRET_KEY)
                .filter(|v| is_truthy(v))
                .map(value_to_string),
            Extraction::Degraded { .. } => None,
        }
    }

    /// The extracted fields; empty when degraded.
    pub fn into_fields(self) -> FieldMap {
        match self {
            Extraction::Parsed { fields, .. } => fields,
            Extraction::Degraded { .. } => FieldMap::new(),
        }
    }
}

/// Read a request body into a flat field map.
pub async fn extract_payload(content_type: &str, body: Bytes) -> Extraction {
    let format = PayloadFormat::from_content_type(content_type);

    let result = match format {
        PayloadFormat::Json => parse_json(&body),
        PayloadFormat::Multipart => parse_multipart(content_type, body).await,
        PayloadFormat::UrlEncoded => Ok(parse_urlencoded(&body)),
    };

    match result {
        Ok(fields) => {
            info!(
                format = format.as_str(),
                field_count = fields.len(),
                "payload_extracted"
            );
            Extraction::Parsed { format, fields }
        }
        Err(error) => {
            warn!(format = format.as_str(), error = %error, "payload_extract_failed");
            Extraction::Degraded { format, error }
        }
    }
}

/// Parse a JSON object body, merging Elementor's nested field list.
///
/// Top-level keys take precedence over entries of the field list.
fn parse_json(body: &[u8]) -> Result<FieldMap, ExtractError> {
    let text = String::from_utf8_lossy(body);
    if text.is_empty() {
        return Ok(FieldMap::new());
    }

    let mut data = match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => map,
        _ => return Err(ExtractError::NotAnObject),
    };

    for (key, value) in flatten_elementor_fields(&data)? {
        data.entry(key).or_insert(value);
    }

    Ok(data)
}

/// Turn `{"fields": [{"id": "E-mail", "value": "x"}]}` into `{"e_mail": "x"}`.
fn flatten_elementor_fields(payload: &FieldMap) -> Result<FieldMap, ExtractError> {
    let mut flat = FieldMap::new();

    let Some(Value::Array(entries)) = payload.get(ELEMENTOR_FIELDS_KEY) else {
        return Ok(flat);
    };

    for (index, entry) in entries.iter().enumerate() {
        let entry = entry
            .as_object()
            .ok_or(ExtractError::InvalidFieldEntry(index))?;

        let Some(id) = ELEMENTOR_ID_KEYS
            .iter()
            .filter_map(|key| entry.get(*key))
            .find(|v| is_truthy(v))
        else {
            continue;
        };

        let value = entry.get("value").cloned().unwrap_or(Value::Null);
        flat.insert(slug_key(&value_to_string(id)), value);
    }

    Ok(flat)
}

async fn parse_multipart(content_type: &str, body: Bytes) -> Result<FieldMap, ExtractError> {
    let request = Request::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .map_err(|e| ExtractError::Multipart(e.to_string()))?;

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ExtractError::Multipart(e.to_string()))?;

    let mut fields = FieldMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ExtractError::Multipart(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let text = field
            .text()
            .await
            .map_err(|e| ExtractError::Multipart(e.to_string()))?;
        fields.insert(name, Value::String(text));
    }

    Ok(fields)
}

fn parse_urlencoded(body: &[u8]) -> FieldMap {
    url::form_urlencoded::parse(body)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

/// Loose truthiness used for identifiers and the body secret.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
