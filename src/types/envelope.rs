//! Wire envelopes for the data endpoint.
//!
//! Decoding is deliberately tolerant: services in this family disagree on
//! key names and omit fields freely, so every envelope defaults what it can.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Response to a count-only query. A missing count field means zero.
#[derive(Debug, Deserialize)]
pub struct CountResponse {
    #[serde(default)]
    pub count: u64,
}

/// One page of raw records. Some services call the array `rows`, feature
/// services call it `features`; both decode here.
#[derive(Debug, Deserialize)]
pub struct RowsetResponse {
    #[serde(default, alias = "features")]
    pub rows: Vec<Value>,
}

/// A service-reported logical error, carried inside a well-formed (often
/// 200) response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl ErrorBody {
    /// Decodes the value under an `error` key. Payloads that are not the
    /// usual object shape are kept verbatim as the message.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(body) => body,
            Err(_) => ErrorBody {
                code: None,
                message: value.to_string(),
                details: Vec::new(),
            },
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message)?,
            None => write!(f, "{}", self.message)?,
        }
        if !self.details.is_empty() {
            write!(f, " ({})", self.details.join("; "))?;
        }
        Ok(())
    }
}
