//! Application state definitions

use super::chat::ChatState;
use super::forms::{FormKind, VerifiedForm};
use crate::config::Settings;
use crate::gate::TimerSignal;
use tokio::sync::mpsc;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Contact,
    JobApplication,
    Assistant,
}

impl View {
    pub const ALL: [View; 3] = [View::Contact, View::JobApplication, View::Assistant];

    pub fn label(&self) -> &'static str {
        match self {
            View::Contact => "Contact",
            View::JobApplication => "Careers",
            View::Assistant => "Assistant",
        }
    }

    /// Function key that switches to this view
    pub fn hotkey(&self) -> u8 {
        match self {
            View::Contact => 2,
            View::JobApplication => 3,
            View::Assistant => 4,
        }
    }

    pub fn from_hotkey(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.hotkey() == n)
    }
}

/// Everything the UI draws from
#[derive(Debug)]
pub struct AppState {
    pub current_view: View,
    pub contact: VerifiedForm,
    pub job: VerifiedForm,
    pub chat: ChatState,
    /// Backend the forms talk to, shown in the status bar
    pub base_url: String,
}

impl AppState {
    pub fn new(settings: &Settings, signals: mpsc::UnboundedSender<TimerSignal>) -> Self {
        Self {
            current_view: View::default(),
            contact: VerifiedForm::new(
                FormKind::Contact,
                settings.otp_ttl_seconds,
                settings.digits_only,
                signals.clone(),
            ),
            job: VerifiedForm::new(
                FormKind::JobApplication,
                settings.otp_ttl_seconds,
                settings.digits_only,
                signals,
            ),
            chat: ChatState::new(),
            base_url: settings.base_url.clone(),
        }
    }

    /// The form on screen, if the current view is a form
    pub fn active_form(&self) -> Option<&VerifiedForm> {
        match self.current_view {
            View::Contact => Some(&self.contact),
            View::JobApplication => Some(&self.job),
            View::Assistant => None,
        }
    }

    pub fn active_form_mut(&mut self) -> Option<&mut VerifiedForm> {
        match self.current_view {
            View::Contact => Some(&mut self.contact),
            View::JobApplication => Some(&mut self.job),
            View::Assistant => None,
        }
    }

    /// Look a form up by the id its gate was configured with
    pub fn form_mut(&mut self, form_id: &str) -> Option<&mut VerifiedForm> {
        if form_id == self.contact.kind.id() {
            Some(&mut self.contact)
        } else if form_id == self.job.kind.id() {
            Some(&mut self.job)
        } else {
            None
        }
    }

    /// Route a countdown event to the form that owns the timer
    pub fn apply_timer_signal(&mut self, signal: TimerSignal) {
        if let Some(form) = self.form_mut(signal.form_id) {
            form.gate.on_timer_event(signal.event);
            form.settle_focus();
        }
    }
}
