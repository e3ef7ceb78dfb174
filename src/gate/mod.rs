//! Verified-submission gate
//!
//! A form's submit action stays locked until the user proves control of the
//! email address with a one-time code: request a code, type it into the six
//! cells before the countdown runs out, get it checked, then submit.

mod controller;
mod dispatcher;
mod error;
mod otp;
mod session;
mod timer;

pub use controller::{CodeCheck, CodeRequest, GateConfig, TimerSignal, VerificationGate};
pub use dispatcher::{Submission, SubmissionDispatcher};
pub use error::{GateError, ValidationError};
pub use otp::{OtpInputGroup, OTP_LENGTH};
pub use session::GateState;

#[cfg(test)]
pub use dispatcher::TOKEN_FIELD;
#[cfg(test)]
pub use timer::TimerEvent;
#[cfg(test)]
pub use error::NETWORK_FAILURE_MESSAGE;
