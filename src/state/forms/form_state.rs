//! Email-verified forms: fields, focus and the gate that guards submission

use super::field::{FieldKind, FormField};
use crate::api::{FormPayload, MessageResponse, SiteApi, VerifyOtpResponse};
use crate::gate::{
    CodeCheck, CodeRequest, GateConfig, GateError, GateState, Submission, SubmissionDispatcher,
    TimerSignal, ValidationError, VerificationGate,
};
use tokio::sync::mpsc;

const POSITIONS: &[&str] = &[
    "AI/ML Engineer",
    "Full-Stack Developer",
    "Cloud Engineer",
    "Cybersecurity Analyst",
    "Project Manager",
];

/// Which of the site's forms this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Contact,
    JobApplication,
}

impl FormKind {
    pub fn id(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::JobApplication => "job",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Contact => "Contact Us",
            FormKind::JobApplication => "Job Application",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            FormKind::Contact => "/api/contact",
            FormKind::JobApplication => "/api/detailed-apply",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormKind::Contact => "Send Message",
            FormKind::JobApplication => "Submit Application",
        }
    }

    fn fields(&self) -> Vec<FormField> {
        match self {
            FormKind::Contact => vec![
                FormField::text("firstName", "First Name").required(),
                FormField::text("lastName", "Last Name").required(),
                FormField::email("email", "Email").required(),
                FormField::text("phone", "Phone"),
                FormField::text("company", "Company"),
                FormField::multiline("message", "Message").required(),
            ],
            FormKind::JobApplication => vec![
                FormField::text("firstName", "First Name").required(),
                FormField::text("lastName", "Last Name").required(),
                FormField::email("email", "Email").required(),
                FormField::text("phone", "Phone").required(),
                FormField::choice("position", "Position", POSITIONS).required(),
                FormField::text("experience", "Years of Experience"),
                FormField::file("resume", "Resume (file path)").required(),
                FormField::multiline("coverLetter", "Cover Letter"),
            ],
        }
    }
}

/// What has keyboard focus inside a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Field(usize),
    /// The six code cells (only reachable while they are visible)
    Otp,
    Submit,
}

/// A form whose submission is gated on email verification
#[derive(Debug)]
pub struct VerifiedForm {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: FormFocus,
    pub gate: VerificationGate,
    pub dispatcher: SubmissionDispatcher,
}

impl VerifiedForm {
    pub fn new(
        kind: FormKind,
        otp_ttl_seconds: u64,
        digits_only: bool,
        signals: mpsc::UnboundedSender<TimerSignal>,
    ) -> Self {
        let config = GateConfig {
            form_id: kind.id(),
            form_type: kind.id(),
            otp_ttl_seconds,
            digits_only,
        };
        Self {
            kind,
            fields: kind.fields(),
            focus: FormFocus::Field(0),
            gate: VerificationGate::new(config, signals),
            dispatcher: SubmissionDispatcher::new(kind.endpoint(), kind.submit_label()),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn email_index(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.kind == FieldKind::Email)
    }

    pub fn email(&self) -> &str {
        self.email_index()
            .map(|i| self.fields[i].as_text())
            .unwrap_or("")
    }

    pub fn is_email_focused(&self) -> bool {
        matches!(self.focus, FormFocus::Field(i) if Some(i) == self.email_index())
    }

    fn focus_order(&self) -> Vec<FormFocus> {
        let mut order: Vec<FormFocus> = (0..self.fields.len()).map(FormFocus::Field).collect();
        if self.gate.otp().visible {
            order.push(FormFocus::Otp);
        }
        order.push(FormFocus::Submit);
        order
    }

    pub fn next_focus(&mut self) {
        let order = self.focus_order();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(current + 1) % order.len()];
    }

    pub fn prev_focus(&mut self) {
        let order = self.focus_order();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = if current == 0 {
            order[order.len() - 1]
        } else {
            order[current - 1]
        };
    }

    /// Move focus off the code cells once they are hidden
    pub fn settle_focus(&mut self) {
        if self.focus == FormFocus::Otp && !self.gate.otp().visible {
            self.focus = match self.email_index() {
                Some(i) if !self.gate.submit_enabled() => FormFocus::Field(i),
                _ => FormFocus::Submit,
            };
        }
    }

    /// Fields are read-only while their payload is being submitted
    pub fn fields_locked(&self) -> bool {
        self.gate.state() == GateState::Submitting
    }

    /// Type into whatever has focus
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            FormFocus::Field(_) if self.fields_locked() => {}
            FormFocus::Field(i) => {
                if let Some(field) = self.fields.get_mut(i) {
                    field.push_char(c);
                }
                self.after_field_edit(i);
            }
            FormFocus::Otp => {
                self.gate.otp_mut().input_char(c);
            }
            FormFocus::Submit => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormFocus::Field(_) if self.fields_locked() => {}
            FormFocus::Field(i) => {
                if let Some(field) = self.fields.get_mut(i) {
                    field.pop_char();
                }
                self.after_field_edit(i);
            }
            FormFocus::Otp => self.gate.otp_mut().backspace(),
            FormFocus::Submit => {}
        }
    }

    /// Newline in a multiline field; returns false if focus is elsewhere
    pub fn newline(&mut self) -> bool {
        if let FormFocus::Field(i) = self.focus {
            let locked = self.fields_locked();
            if let Some(field) = self.fields.get_mut(i) {
                if field.is_multiline() {
                    if locked {
                        return true;
                    }
                    field.push_char('\n');
                    return true;
                }
            }
        }
        false
    }

    /// Paste text into the focused field or code cells
    ///
    /// A paste into a file field replaces the path, with any quotes a
    /// terminal adds to dropped files stripped.
    pub fn paste(&mut self, text: &str) {
        match self.focus {
            FormFocus::Otp => self.gate.otp_mut().paste(text),
            FormFocus::Field(_) if self.fields_locked() => {}
            FormFocus::Field(i)
                if self.fields.get(i).is_some_and(|f| f.kind == FieldKind::File) =>
            {
                let path = text.trim().trim_matches(|c| c == '\'' || c == '"');
                self.fields[i].set_text(path.to_string());
            }
            FormFocus::Field(_) => {
                for c in text.chars() {
                    if c != '\n' && c != '\r' {
                        self.input_char(c);
                    }
                }
            }
            FormFocus::Submit => {}
        }
    }

    fn after_field_edit(&mut self, index: usize) {
        if Some(index) == self.email_index() {
            let email = self.email().to_string();
            self.gate.email_changed(&email);
        }
    }

    /// Collect the fields into a multipart payload, checking required ones
    pub fn payload(&self) -> Result<FormPayload, ValidationError> {
        let mut payload = FormPayload::new();
        for field in &self.fields {
            if field.required && field.is_empty() {
                return Err(ValidationError::MissingField(field.label));
            }
            match field.kind {
                FieldKind::File => {
                    if field.is_empty() {
                        continue;
                    }
                    if !field.file_exists() {
                        return Err(ValidationError::AttachmentUnreadable(
                            field.as_text().trim().to_string(),
                        ));
                    }
                    payload = payload.attach(field.name, field.as_text().trim());
                }
                _ => {
                    payload = payload.text(field.name, field.as_text().trim());
                }
            }
        }
        Ok(payload)
    }

    /// Empty every field and return focus to the top
    pub fn clear_fields(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.focus = FormFocus::Field(0);
    }

    pub fn begin_request_code(&mut self) -> Result<CodeRequest, GateError> {
        let email = self.email().to_string();
        self.gate.begin_request_code(&email)
    }

    pub fn complete_request_code(
        &mut self,
        request: CodeRequest,
        result: Result<MessageResponse, GateError>,
    ) {
        if self.gate.complete_request_code(request, result) && self.gate.otp().visible {
            self.focus = FormFocus::Otp;
        }
    }

    pub fn begin_verify(&mut self) -> Result<CodeCheck, GateError> {
        self.gate.begin_verify()
    }

    pub fn complete_verify(
        &mut self,
        check: CodeCheck,
        result: Result<VerifyOtpResponse, GateError>,
    ) {
        self.gate.complete_verify(check, result);
        if self.gate.submit_enabled() {
            self.focus = FormFocus::Submit;
        }
        self.settle_focus();
    }

    /// Validate the fields and lock the gate for submission
    pub fn begin_submit(&mut self) -> Result<Submission, GateError> {
        if !self.gate.submit_enabled() {
            return Err(self.gate.fail(GateError::GateNotSatisfied));
        }
        let payload = self
            .payload()
            .map_err(|err| self.gate.fail(err.into()))?;
        self.dispatcher.begin(&mut self.gate, payload)
    }

    /// Apply the submission reply; the fields are cleared once accepted
    pub fn complete_submit(
        &mut self,
        submission: Submission,
        result: Result<MessageResponse, GateError>,
    ) -> bool {
        let accepted = self
            .dispatcher
            .complete(&mut self.gate, submission, result);
        if accepted {
            self.clear_fields();
        }
        accepted
    }

    #[allow(dead_code)]
    pub async fn request_code(&mut self, api: &dyn SiteApi) -> Result<(), GateError> {
        let request = self.begin_request_code()?;
        let result = api.send_otp(&request.email).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.complete_request_code(request, result);
        outcome
    }

    #[allow(dead_code)]
    pub async fn verify_code(&mut self, api: &dyn SiteApi) -> Result<(), GateError> {
        let result = self.gate.verify_code(api).await;
        if self.gate.submit_enabled() {
            self.focus = FormFocus::Submit;
        }
        self.settle_focus();
        result
    }

    #[allow(dead_code)]
    pub async fn submit(&mut self, api: &dyn SiteApi) -> Result<MessageResponse, GateError> {
        let submission = self.begin_submit()?;
        let result = api
            .submit_form(&submission.endpoint, submission.payload.clone())
            .await;
        let outcome = result.clone();
        self.complete_submit(submission, result);
        outcome
    }
}
