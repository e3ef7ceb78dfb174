//! Final form submission, allowed only through a verified gate

use super::controller::{Ticket, VerificationGate};
use super::error::GateError;
use super::session::GateState;
use crate::api::{FormPayload, MessageResponse, SiteApi};

const SUBMITTING_LABEL: &str = "Submitting...";

/// Field carrying the verification token in the multipart body
pub const TOKEN_FIELD: &str = "verification_token";

/// A submission on its way to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: Ticket,
    pub endpoint: String,
    pub payload: FormPayload,
}

/// Posts a form to its endpoint once the gate is verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDispatcher {
    endpoint: String,
    submit_label: &'static str,
}

impl SubmissionDispatcher {
    pub fn new(endpoint: impl Into<String>, submit_label: &'static str) -> Self {
        Self {
            endpoint: endpoint.into(),
            submit_label,
        }
    }

    /// Label for the submit control in the gate's current state
    pub fn label(&self, gate: &VerificationGate) -> &'static str {
        if gate.state() == GateState::Submitting {
            SUBMITTING_LABEL
        } else {
            self.submit_label
        }
    }

    /// Lock the gate into `Submitting` and finish the payload
    ///
    /// Fails with [`GateError::GateNotSatisfied`] unless the gate is verified.
    pub fn begin(
        &self,
        gate: &mut VerificationGate,
        mut payload: FormPayload,
    ) -> Result<Submission, GateError> {
        let ticket = gate.begin_submission()?;

        if payload.get("email").is_none() {
            payload = payload.text("email", gate.session().email_address.clone());
        }
        if let Some(token) = gate.session().verification_token.clone() {
            payload = payload.text(TOKEN_FIELD, token);
        }

        Ok(Submission {
            ticket,
            endpoint: self.endpoint.clone(),
            payload,
        })
    }

    /// Apply the endpoint's reply. Returns true when the form was accepted.
    ///
    /// Success resets the gate to `Idle`; failure leaves it `Verified` so
    /// the user can resubmit without verifying again.
    pub fn complete(
        &self,
        gate: &mut VerificationGate,
        submission: Submission,
        result: Result<MessageResponse, GateError>,
    ) -> bool {
        let accepted = result.is_ok();
        gate.finish_submission(submission.ticket, result) && accepted
    }

    /// Submit and apply the reply inline
    #[allow(dead_code)]
    pub async fn submit(
        &self,
        gate: &mut VerificationGate,
        api: &dyn SiteApi,
        payload: FormPayload,
    ) -> Result<MessageResponse, GateError> {
        let submission = self.begin(gate, payload)?;
        let result = api
            .submit_form(&submission.endpoint, submission.payload.clone())
            .await;
        let outcome = result.clone();
        self.complete(gate, submission, result);
        outcome
    }
}
