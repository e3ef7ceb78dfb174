//! Request and response bodies exchanged with the site backend

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Body for `POST /api/send-otp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOtpRequest {
    pub email: String,
}

/// Body for `POST /api/verify-otp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,
}

/// Successful reply carrying only a message (send-otp, form submission)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Successful reply from `POST /api/verify-otp`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct VerifyOtpResponse {
    /// Absent means verified; only an explicit `false` is a rejection
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl VerifyOtpResponse {
    pub fn is_verified(&self) -> bool {
        self.verified.unwrap_or(true)
    }
}

/// Body of a non-2xx reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Server-provided text, preferring `error` over `message`
    pub fn text(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Body for `POST /api/chatbot`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply from `POST /api/chatbot`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// File attached to a multipart submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: String,
    pub path: PathBuf,
}

/// Multipart form submission: ordered text fields plus attachments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
    pub attachments: Vec<Attachment>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn attach(mut self, field: &str, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(Attachment {
            field: field.to_string(),
            path: path.into(),
        });
        self
    }

    /// Value of the first text field with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
