//! HTTP client for the site backend
//!
//! All calls share one cookie store: the backend binds an issued code, and
//! later the verified address, to its session cookie.

use super::traits::SiteApi;
use super::types::{
    ChatRequest, ChatResponse, ErrorBody, FormPayload, MessageResponse, SendOtpRequest,
    VerifyOtpRequest, VerifyOtpResponse,
};
use crate::gate::{GateError, ValidationError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

const SEND_OTP_PATH: &str = "/api/send-otp";
const VERIFY_OTP_PATH: &str = "/api/verify-otp";
const CHATBOT_PATH: &str = "/api/chatbot";

const SEND_OTP_FALLBACK: &str = "Failed to send OTP.";
const VERIFY_OTP_FALLBACK: &str = "Verification failed.";
const SUBMIT_FALLBACK: &str = "Submission failed.";
const CHAT_FALLBACK: &str = "The assistant is unavailable.";

/// Client for the site's JSON and form endpoints
pub struct SiteClient {
    http: reqwest::Client,
    base_url: String,
}

impl SiteClient {
    /// Create a new client for `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        // Only reached if the TLS backend fails to initialise. The fallback
        // has no cookie store, so verification will not survive to submit.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("Falling back to default HTTP client: {err}");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a path onto the base URL; absolute URLs pass through untouched
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<R, GateError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        interpret(status, &text, fallback)
    }

    async fn build_multipart(payload: FormPayload) -> Result<Form, GateError> {
        let mut form = Form::new();
        for (name, value) in payload.fields {
            form = form.text(name, value);
        }
        for attachment in payload.attachments {
            let bytes = tokio::fs::read(&attachment.path).await.map_err(|err| {
                ValidationError::AttachmentUnreadable(format!(
                    "{} ({err})",
                    attachment.path.display()
                ))
            })?;
            let file_name = attachment
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| attachment.field.clone());
            form = form.part(attachment.field, Part::bytes(bytes).file_name(file_name));
        }
        Ok(form)
    }
}

/// Turn a status and body into the typed reply or a [`GateError`]
pub(crate) fn interpret<R: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> Result<R, GateError> {
    if status.is_success() {
        return serde_json::from_str(body)
            .map_err(|err| GateError::Network(format!("unreadable response: {err}")));
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::text)
        .unwrap_or_else(|| fallback.to_string());
    Err(GateError::ServerRejection {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SiteApi for SiteClient {
    async fn send_otp(&self, email: &str) -> Result<MessageResponse, GateError> {
        let body = SendOtpRequest {
            email: email.to_string(),
        };
        self.post_json(SEND_OTP_PATH, &body, SEND_OTP_FALLBACK).await
    }

    async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<VerifyOtpResponse, GateError> {
        self.post_json(VERIFY_OTP_PATH, &request, VERIFY_OTP_FALLBACK)
            .await
    }

    async fn submit_form(
        &self,
        endpoint: &str,
        payload: FormPayload,
    ) -> Result<MessageResponse, GateError> {
        let form = Self::build_multipart(payload).await?;
        let response = self
            .http
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        interpret(status, &text, SUBMIT_FALLBACK)
    }

    async fn chat(&self, message: &str) -> Result<String, GateError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        let reply: ChatResponse = self.post_json(CHATBOT_PATH, &body, CHAT_FALLBACK).await?;
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> SiteClient {
        SiteClient::new("http://localhost:5000/", Duration::from_secs(1))
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        assert_eq!(client().base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_url_joins_paths() {
        let client = client();
        assert_eq!(client.url("/api/contact"), "http://localhost:5000/api/contact");
        assert_eq!(client.url("api/contact"), "http://localhost:5000/api/contact");
        assert_eq!(
            client.url("https://forms.example.com/apply"),
            "https://forms.example.com/apply"
        );
    }

    #[test]
    fn test_interpret_success() {
        let reply: MessageResponse =
            interpret(StatusCode::OK, r#"{"message": "sent"}"#, SEND_OTP_FALLBACK).unwrap();
        assert_eq!(reply.message, "sent");
    }

    #[test]
    fn test_interpret_rejection_uses_server_text() {
        let err = interpret::<MessageResponse>(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Invalid verification code."}"#,
            VERIFY_OTP_FALLBACK,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GateError::ServerRejection {
                status: 400,
                message: "Invalid verification code.".to_string()
            }
        );
    }

    #[test]
    fn test_interpret_rejection_without_body_uses_fallback() {
        let err = interpret::<MessageResponse>(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>",
            SUBMIT_FALLBACK,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), SUBMIT_FALLBACK);
    }

    #[test]
    fn test_interpret_unreadable_success_is_network_error() {
        let err =
            interpret::<MessageResponse>(StatusCode::OK, "not json", SEND_OTP_FALLBACK).unwrap_err();
        assert!(matches!(err, GateError::Network(_)));
    }

    #[tokio::test]
    async fn test_missing_attachment_is_validation_error() {
        let payload = FormPayload::new()
            .text("email", "user@example.com")
            .attach("resume", "/definitely/not/here/cv.pdf");
        let err = SiteClient::build_multipart(payload).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::Validation(ValidationError::AttachmentUnreadable(_))
        ));
    }
}
