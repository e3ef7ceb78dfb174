//! Per-form verification session

use super::otp::{OtpInputGroup, OTP_LENGTH};
use std::fmt;
use uuid::Uuid;

/// Where a form stands in the verify-then-submit flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    /// Waiting for the code-issuing collaborator
    CodeRequested,
    /// A code was sent and the countdown is running
    CodeEntryPending,
    Verified,
    /// The countdown ran out; a new code must be requested
    Expired,
    Submitting,
}

impl GateState {
    /// Whether a (re-)request for a code may start from this state
    pub fn can_request_code(&self) -> bool {
        matches!(
            self,
            GateState::Idle | GateState::Expired | GateState::CodeEntryPending
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            GateState::Idle => "idle",
            GateState::CodeRequested => "sending a code",
            GateState::CodeEntryPending => "awaiting the code",
            GateState::Verified => "verified",
            GateState::Expired => "the code has expired",
            GateState::Submitting => "submitting",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transient state for one form instance
#[derive(Debug, Clone)]
pub struct FormSession {
    /// Correlates log lines for this form instance
    pub id: Uuid,
    /// Address the outstanding code was sent to
    pub email_address: String,
    pub otp: OtpInputGroup,
    pub verification_token: Option<String>,
    pub state: GateState,
    pub remaining_seconds: u64,
}

impl FormSession {
    pub fn new(digits_only: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            email_address: String::new(),
            otp: OtpInputGroup::new(digits_only),
            verification_token: None,
            state: GateState::Idle,
            remaining_seconds: 0,
        }
    }

    /// The submit control is enabled only in this state
    pub fn submit_enabled(&self) -> bool {
        self.state == GateState::Verified
    }

    /// Back to the initial state, keeping the session id and input policy
    pub fn reset(&mut self) {
        self.email_address.clear();
        self.otp.clear();
        self.otp.visible = false;
        self.verification_token = None;
        self.state = GateState::Idle;
        self.remaining_seconds = 0;
    }

    /// Countdown text shown next to the resend action
    pub fn countdown_label(&self) -> Option<String> {
        match self.state {
            GateState::CodeEntryPending | GateState::CodeRequested
                if self.remaining_seconds > 0 =>
            {
                Some(format_countdown(self.remaining_seconds))
            }
            _ => None,
        }
    }

    /// Label of the request action for the current state
    pub fn request_label(&self) -> &'static str {
        match self.state {
            GateState::CodeRequested => "Sending...",
            GateState::Expired | GateState::CodeEntryPending => "Resend Code",
            _ => "Send Verification Code",
        }
    }

    pub fn code_is_complete(&self) -> bool {
        self.otp.read_code().chars().count() == OTP_LENGTH
    }
}

/// Render remaining seconds as `Resend available in M:SS`
pub fn format_countdown(remaining: u64) -> String {
    format!("Resend available in {}:{:02}", remaining / 60, remaining % 60)
}
