use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body the service attaches to non-2xx responses, e.g.
/// `{"detail": "Todo not found"}`. Validation failures carry a structured
/// `detail` instead of a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Value,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Value::String(detail.into()),
        }
    }

    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
