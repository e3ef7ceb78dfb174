//! Verification gate: request a code, check it, unlock submission
//!
//! Every network step is split in two. A synchronous `begin_*` validates
//! input, moves the state machine and hands back a ticket; the caller runs
//! the collaborator call wherever it likes (inline, or on a spawned task) and
//! passes the result to the matching `complete_*`, which applies it only if
//! the ticket still matches the gate. Results overtaken by a re-request, an
//! expiry or a reset are dropped.

use super::error::{GateError, ValidationError};
use super::otp::{OtpInputGroup, OTP_LENGTH};
use super::session::{FormSession, GateState};
use super::timer::{CountdownTimer, TimerEvent};
use crate::api::{MessageResponse, SiteApi, VerifyOtpRequest, VerifyOtpResponse};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const CODE_SENT_MESSAGE: &str = "Verification code sent to your email.";
const VERIFIED_MESSAGE: &str = "Email verified successfully!";
const VERIFY_FALLBACK: &str = "Verification failed.";

/// Per-form settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Identifies the form in timer signals and logs
    pub form_id: &'static str,
    /// Sent to the backend as `form_type` when verifying
    pub form_type: &'static str,
    pub otp_ttl_seconds: u64,
    pub digits_only: bool,
}

/// Timer event routed back to the owning form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSignal {
    pub form_id: &'static str,
    pub event: TimerEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Banner shown under the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Proof that a network step was started at a given point in the gate's life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
}

/// An in-flight request for a new code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRequest {
    pub ticket: Ticket,
    pub email: String,
}

/// An in-flight code check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCheck {
    pub ticket: Ticket,
    pub request: VerifyOtpRequest,
}

/// Standard address-syntax check: `non-space+ @ non-space+ . non-space+`
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    email
        .char_indices()
        .filter(|(_, c)| *c == '@')
        .any(|(at, _)| {
            let (local, domain) = (&email[..at], &email[at + 1..]);
            !local.is_empty()
                && domain
                    .char_indices()
                    .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
        })
}

/// A 2xx reply with `verified: false` is still a rejection
fn require_verified(
    result: Result<VerifyOtpResponse, GateError>,
) -> Result<VerifyOtpResponse, GateError> {
    result.and_then(|reply| {
        if reply.is_verified() {
            return Ok(reply);
        }
        let message = if reply.message.is_empty() {
            VERIFY_FALLBACK.to_string()
        } else {
            reply.message
        };
        Err(GateError::ServerRejection {
            status: 200,
            message,
        })
    })
}

/// State machine guarding one form's submit action
#[derive(Debug)]
pub struct VerificationGate {
    config: GateConfig,
    session: FormSession,
    timer: CountdownTimer,
    /// Bumped whenever outstanding network results must stop applying
    epoch: u64,
    status: Option<StatusMessage>,
    signals: mpsc::UnboundedSender<TimerSignal>,
}

impl VerificationGate {
    pub fn new(config: GateConfig, signals: mpsc::UnboundedSender<TimerSignal>) -> Self {
        let session = FormSession::new(config.digits_only);
        Self {
            config,
            session,
            timer: CountdownTimer::new(),
            epoch: 0,
            status: None,
            signals,
        }
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn state(&self) -> GateState {
        self.session.state
    }

    pub fn submit_enabled(&self) -> bool {
        self.session.submit_enabled()
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn otp(&self) -> &OtpInputGroup {
        &self.session.otp
    }

    pub fn otp_mut(&mut self) -> &mut OtpInputGroup {
        &mut self.session.otp
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Record `err` in the status banner and hand it back
    pub(crate) fn fail(&mut self, err: GateError) -> GateError {
        if err.is_local() {
            debug!(form = self.config.form_id, "Rejected locally: {err}");
        }
        self.status = Some(StatusMessage::error(err.to_string()));
        err
    }

    fn ticket(&self) -> Ticket {
        Ticket { epoch: self.epoch }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Validate `email` and move to `CodeRequested`
    pub fn begin_request_code(&mut self, email: &str) -> Result<CodeRequest, GateError> {
        self.status = None;
        let state = self.session.state;
        if !state.can_request_code() {
            return Err(self.fail(GateError::InvalidTransition {
                state,
                action: "request a code",
            }));
        }

        let email = email.trim();
        if !is_valid_email(email) {
            return Err(self.fail(ValidationError::InvalidEmail.into()));
        }

        self.epoch += 1;
        self.session.state = GateState::CodeRequested;
        info!(
            session = %self.session.id,
            form = self.config.form_id,
            "Requesting verification code for {email}"
        );
        Ok(CodeRequest {
            ticket: self.ticket(),
            email: email.to_string(),
        })
    }

    /// Apply the code-issuing collaborator's reply. Returns false if stale.
    pub fn complete_request_code(
        &mut self,
        request: CodeRequest,
        result: Result<MessageResponse, GateError>,
    ) -> bool {
        let state = self.session.state;
        let awaiting = matches!(state, GateState::CodeRequested | GateState::Expired);
        if !self.is_current(&request.ticket) || !awaiting {
            debug!(
                form = self.config.form_id,
                "Dropping stale send-otp reply in state {state:?}"
            );
            return false;
        }

        match result {
            Ok(reply) => {
                self.session.state = GateState::CodeEntryPending;
                self.session.email_address = request.email;
                self.session.verification_token = None;
                self.session.otp.clear();
                self.session.otp.visible = true;
                self.start_countdown();
                let text = if reply.message.is_empty() {
                    CODE_SENT_MESSAGE.to_string()
                } else {
                    reply.message
                };
                self.status = Some(StatusMessage::success(text));
                info!(
                    session = %self.session.id,
                    form = self.config.form_id,
                    "Code sent, entry pending"
                );
            }
            Err(err) => {
                self.session.state = self.fallback_after_failed_request();
                warn!(
                    form = self.config.form_id,
                    "Send-otp failed: {err:?}"
                );
                self.fail(err);
            }
        }
        true
    }

    /// Where a failed (re-)request leaves the gate
    fn fallback_after_failed_request(&self) -> GateState {
        if self.timer.is_active() {
            GateState::CodeEntryPending
        } else if !self.session.email_address.is_empty() {
            GateState::Expired
        } else {
            GateState::Idle
        }
    }

    fn start_countdown(&mut self) {
        let ttl = self.config.otp_ttl_seconds;
        let form_id = self.config.form_id;
        let generation = self.timer.generation() + 1;
        let tick_signals = self.signals.clone();
        let expire_signals = self.signals.clone();

        self.session.remaining_seconds = ttl;
        let started = self.timer.start(
            ttl,
            move |remaining| {
                let _ = tick_signals.send(TimerSignal {
                    form_id,
                    event: TimerEvent::Tick {
                        generation,
                        remaining,
                    },
                });
            },
            move || {
                let _ = expire_signals.send(TimerSignal {
                    form_id,
                    event: TimerEvent::Expired { generation },
                });
            },
        );
        debug_assert_eq!(started, generation);
    }

    /// Feed a countdown event back in. Events from cancelled runs are ignored.
    pub fn on_timer_event(&mut self, event: TimerEvent) {
        if !self.timer.is_current(event.generation()) {
            return;
        }
        match event {
            TimerEvent::Tick { remaining, .. } => {
                self.session.remaining_seconds = remaining;
            }
            TimerEvent::Expired { .. } => {
                self.timer.cancel();
                self.session.remaining_seconds = 0;
                if matches!(
                    self.session.state,
                    GateState::CodeEntryPending | GateState::CodeRequested
                ) {
                    self.session.state = GateState::Expired;
                    self.session.otp.clear();
                    self.session.otp.visible = false;
                    self.fail(GateError::CodeExpired);
                    info!(
                        session = %self.session.id,
                        form = self.config.form_id,
                        "Verification code expired"
                    );
                }
            }
        }
    }

    /// Read the OTP cells and build the code check
    pub fn begin_verify(&mut self) -> Result<CodeCheck, GateError> {
        self.status = None;
        match self.session.state {
            GateState::CodeEntryPending => {}
            GateState::Expired => return Err(self.fail(GateError::CodeExpired)),
            state => {
                return Err(self.fail(GateError::InvalidTransition {
                    state,
                    action: "verify a code",
                }))
            }
        }

        let code = self.session.otp.read_code();
        if code.chars().count() != OTP_LENGTH {
            return Err(self.fail(ValidationError::IncompleteCode.into()));
        }

        Ok(CodeCheck {
            ticket: self.ticket(),
            request: VerifyOtpRequest {
                email: self.session.email_address.clone(),
                otp: code,
                form_type: Some(self.config.form_type.to_string()),
            },
        })
    }

    /// Apply the code-checking collaborator's reply. Returns false if stale.
    pub fn complete_verify(
        &mut self,
        check: CodeCheck,
        result: Result<VerifyOtpResponse, GateError>,
    ) -> bool {
        let state = self.session.state;
        if !self.is_current(&check.ticket) || state != GateState::CodeEntryPending {
            debug!(
                form = self.config.form_id,
                "Dropping stale verify-otp reply in state {state:?}"
            );
            return false;
        }

        match require_verified(result) {
            Ok(reply) => {
                self.timer.cancel();
                self.session.state = GateState::Verified;
                self.session.remaining_seconds = 0;
                self.session.otp.clear();
                self.session.otp.visible = false;
                self.session.verification_token = reply.token;
                let text = if reply.message.is_empty() {
                    VERIFIED_MESSAGE.to_string()
                } else {
                    reply.message
                };
                self.status = Some(StatusMessage::success(text));
                info!(
                    session = %self.session.id,
                    form = self.config.form_id,
                    "Email verified, submit enabled"
                );
            }
            Err(err) => {
                self.session.otp.clear();
                warn!(form = self.config.form_id, "Verify-otp failed: {err:?}");
                self.fail(err);
            }
        }
        true
    }

    /// The email field changed; a code is bound to the address it was sent to
    ///
    /// Any edit while a request is in flight also resets.
    pub fn email_changed(&mut self, email: &str) {
        let unchanged = self.session.email_address == email.trim();
        let reset = match self.session.state {
            GateState::CodeRequested => true,
            GateState::CodeEntryPending | GateState::Verified | GateState::Expired => !unchanged,
            GateState::Idle | GateState::Submitting => false,
        };
        if reset {
            info!(
                session = %self.session.id,
                form = self.config.form_id,
                "Email changed, verification reset"
            );
            self.reset();
        }
    }

    /// Back to `Idle`, dropping every outstanding result
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.epoch += 1;
        self.session.reset();
    }

    /// Move `Verified` to `Submitting`
    pub(crate) fn begin_submission(&mut self) -> Result<Ticket, GateError> {
        self.status = None;
        if self.session.state != GateState::Verified {
            return Err(self.fail(GateError::GateNotSatisfied));
        }
        self.session.state = GateState::Submitting;
        Ok(self.ticket())
    }

    /// Apply the submission reply. Returns false if stale.
    pub(crate) fn finish_submission(
        &mut self,
        ticket: Ticket,
        result: Result<MessageResponse, GateError>,
    ) -> bool {
        if !self.is_current(&ticket) || self.session.state != GateState::Submitting {
            debug!(form = self.config.form_id, "Dropping stale submission reply");
            return false;
        }
        match result {
            Ok(reply) => {
                info!(
                    session = %self.session.id,
                    form = self.config.form_id,
                    "Form submitted"
                );
                self.reset();
                self.status = Some(StatusMessage::success(reply.message));
            }
            Err(err) => {
                warn!(form = self.config.form_id, "Submission failed: {err:?}");
                self.session.state = GateState::Verified;
                self.fail(err);
            }
        }
        true
    }

    /// Request a code and apply the reply inline
    #[allow(dead_code)]
    pub async fn request_code(&mut self, api: &dyn SiteApi, email: &str) -> Result<(), GateError> {
        let request = self.begin_request_code(email)?;
        let result = api.send_otp(&request.email).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.complete_request_code(request, result);
        outcome
    }

    /// Verify the entered code and apply the reply inline
    #[allow(dead_code)]
    pub async fn verify_code(&mut self, api: &dyn SiteApi) -> Result<(), GateError> {
        let check = self.begin_verify()?;
        let result = require_verified(api.verify_otp(check.request.clone()).await);
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.complete_verify(check, result);
        outcome
    }
}
