use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error body returned by the backend on non-2xx responses (`{"detail": ...}`).
///
/// `detail` is usually a string, but request validation failures carry a list
/// of objects, so it is kept as raw JSON and flattened on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorDetail {
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text.clone()),
                        Value::Object(fields) => fields
                            .get("msg")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        _ => None,
                    })
                    .collect();
                (!parts.is_empty()).then(|| parts.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

/// A request the backend understood and refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("backend rejected request ({status}): {detail}")]
pub struct BackendRejection {
    pub status: u16,
    pub detail: String,
}

impl BackendRejection {
    pub const UNKNOWN_DETAIL: &'static str = "Unknown error";

    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn from_body(status: u16, body: &ErrorDetail) -> Self {
        Self::new(
            status,
            body.message()
                .unwrap_or_else(|| Self::UNKNOWN_DETAIL.to_string()),
        )
    }
}
