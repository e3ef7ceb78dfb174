//! Trait abstraction for the site backend to enable mocking in tests

use super::types::{FormPayload, MessageResponse, VerifyOtpRequest, VerifyOtpResponse};
use crate::gate::GateError;
use async_trait::async_trait;

/// The collaborators the forms depend on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteApi: Send + Sync {
    /// Ask the backend to email a one-time code to `email`
    async fn send_otp(&self, email: &str) -> Result<MessageResponse, GateError>;

    /// Check a code against the one the backend issued
    async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<VerifyOtpResponse, GateError>;

    /// Post a form as multipart data to `endpoint`
    async fn submit_form(
        &self,
        endpoint: &str,
        payload: FormPayload,
    ) -> Result<MessageResponse, GateError>;

    /// Send one message to the site assistant and return its reply
    async fn chat(&self, message: &str) -> Result<String, GateError>;
}
