//! Error taxonomy for the verification flow
//!
//! The `Display` text of every variant is what the user sees in the form's
//! error banner.

use super::session::GateState;

/// Generic message shown when the transport fails before a response arrives
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Failures caught locally, before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter the full 6-digit code.")]
    IncompleteCode,
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),
    #[error("Could not read attachment: {0}")]
    AttachmentUnreadable(String),
}

/// Everything that can go wrong between a key press and a collaborator reply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport failure or an unreadable response body
    #[error("{}", NETWORK_FAILURE_MESSAGE)]
    Network(String),

    /// Non-2xx reply carrying a message from the server
    #[error("{message}")]
    ServerRejection { status: u16, message: String },

    #[error("Please verify your email address before submitting.")]
    GateNotSatisfied,

    #[error("Verification code has expired. Please request a new one.")]
    CodeExpired,

    #[error("Cannot {action} while {state}.")]
    InvalidTransition {
        state: GateState,
        action: &'static str,
    },
}

impl GateError {
    /// Whether the failure happened locally without touching the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            GateError::Validation(_)
                | GateError::GateNotSatisfied
                | GateError::CodeExpired
                | GateError::InvalidTransition { .. }
        )
    }
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        GateError::Network(err.to_string())
    }
}
