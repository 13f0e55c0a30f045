//! # Response Envelope
//!
//! Every backend response is wrapped as `{code, message, data, timestamp}`. The gateway
//! first reads the envelope with an untyped payload, checks the code, and only then
//! converts `data` into the type the caller asked for. A failed envelope's payload is
//! never handed to callers.

use crate::codes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The standard wire wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            code: codes::SUCCESS,
            message: "success".to_owned(),
            data: Some(data),
            timestamp: None,
            success: Some(true),
            trace_id: None,
        }
    }

    /// A failed envelope with no payload.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            timestamp: None,
            success: Some(false),
            trace_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == codes::SUCCESS
    }
}

impl Envelope<Value> {
    /// Converts the untyped payload into `T`.
    ///
    /// A missing payload is decoded from JSON `null`, so `()` and `Option<_>` targets
    /// accept empty success responses.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.unwrap_or(Value::Null))
    }
}
