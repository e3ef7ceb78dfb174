//! Application state and core logic

use crate::api::{MessageResponse, SiteApi, VerifyOtpResponse};
use crate::config::Settings;
use crate::gate::{CodeCheck, CodeRequest, GateError, Submission, TimerSignal, OTP_LENGTH};
use crate::state::{AppState, FormFocus, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A collaborator reply coming back from a spawned request
#[derive(Debug)]
pub enum AppEvent {
    CodeSent {
        form_id: &'static str,
        request: CodeRequest,
        result: Result<MessageResponse, GateError>,
    },
    CodeChecked {
        form_id: &'static str,
        check: CodeCheck,
        result: Result<VerifyOtpResponse, GateError>,
    },
    Submitted {
        form_id: &'static str,
        submission: Submission,
        result: Result<MessageResponse, GateError>,
    },
    ChatReply(Result<String, GateError>),
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Site backend
    api: Arc<dyn SiteApi>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    timer_rx: mpsc::UnboundedReceiver<TimerSignal>,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance
    ///
    /// Must be called inside a tokio runtime; countdowns run as tasks on it.
    pub fn new(settings: &Settings, api: Arc<dyn SiteApi>) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(settings, timer_tx),
            api,
            events_tx,
            events_rx,
            timer_rx,
            quit: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Apply countdown ticks and collaborator replies that arrived since the last frame
    pub fn process_pending(&mut self) {
        while let Ok(signal) = self.timer_rx.try_recv() {
            self.state.apply_timer_signal(signal);
        }
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CodeSent {
                form_id,
                request,
                result,
            } => {
                if let Some(form) = self.state.form_mut(form_id) {
                    form.complete_request_code(request, result);
                }
            }
            AppEvent::CodeChecked {
                form_id,
                check,
                result,
            } => {
                if let Some(form) = self.state.form_mut(form_id) {
                    form.complete_verify(check, result);
                }
            }
            AppEvent::Submitted {
                form_id,
                submission,
                result,
            } => {
                if let Some(form) = self.state.form_mut(form_id) {
                    form.complete_submit(submission, result);
                }
            }
            AppEvent::ChatReply(result) => self.state.chat.complete(result),
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        if let KeyCode::F(n) = key.code {
            if let Some(view) = View::from_hotkey(n) {
                self.state.current_view = view;
            }
            return;
        }

        match self.state.current_view {
            View::Contact | View::JobApplication => self.handle_form_key(key),
            View::Assistant => self.handle_chat_key(key),
        }
    }

    /// Bracketed paste goes to whatever has focus
    pub fn handle_paste(&mut self, text: &str) {
        match self.state.active_form_mut() {
            Some(form) => form.paste(text),
            None => self
                .state
                .chat
                .input
                .extend(text.chars().filter(|c| !c.is_control())),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.state.active_form_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab => form.next_focus(),
            KeyCode::BackTab => form.prev_focus(),
            KeyCode::Esc => form.gate.clear_status(),
            KeyCode::Left if form.focus == FormFocus::Otp => form.gate.otp_mut().focus_left(),
            KeyCode::Right if form.focus == FormFocus::Otp => form.gate.otp_mut().focus_right(),
            KeyCode::Home if form.focus == FormFocus::Otp => form.gate.otp_mut().set_focus(0),
            KeyCode::End if form.focus == FormFocus::Otp => {
                form.gate.otp_mut().set_focus(OTP_LENGTH - 1)
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if form.is_email_focused() {
                    self.request_code();
                } else {
                    match form.focus {
                        FormFocus::Otp => self.verify_code(),
                        FormFocus::Submit => self.submit(),
                        FormFocus::Field(_) => {
                            if !form.newline() {
                                form.next_focus();
                            }
                        }
                    }
                }
            }
            KeyCode::Char(c) => form.input_char(c),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        let chat = &mut self.state.chat;
        match key.code {
            KeyCode::Enter => self.send_chat(),
            KeyCode::Backspace => {
                chat.input.pop();
            }
            KeyCode::Esc => chat.input.clear(),
            KeyCode::Up => chat.scroll_up(),
            KeyCode::Down => chat.scroll_down(),
            KeyCode::Char(c) => chat.input.push(c),
            _ => {}
        }
    }

    fn request_code(&mut self) {
        let Some(form) = self.state.active_form_mut() else {
            return;
        };
        let form_id = form.kind.id();
        // Refusals are already in the form's status banner
        let Ok(request) = form.begin_request_code() else {
            return;
        };

        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.send_otp(&request.email).await;
            let _ = tx.send(AppEvent::CodeSent {
                form_id,
                request,
                result,
            });
        });
    }

    fn verify_code(&mut self) {
        let Some(form) = self.state.active_form_mut() else {
            return;
        };
        let form_id = form.kind.id();
        let Ok(check) = form.begin_verify() else {
            return;
        };

        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.verify_otp(check.request.clone()).await;
            let _ = tx.send(AppEvent::CodeChecked {
                form_id,
                check,
                result,
            });
        });
    }

    fn submit(&mut self) {
        let Some(form) = self.state.active_form_mut() else {
            return;
        };
        let form_id = form.kind.id();
        let Ok(submission) = form.begin_submit() else {
            return;
        };

        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api
                .submit_form(&submission.endpoint, submission.payload.clone())
                .await;
            let _ = tx.send(AppEvent::Submitted {
                form_id,
                submission,
                result,
            });
        });
    }

    fn send_chat(&mut self) {
        let Some(message) = self.state.chat.begin_send() else {
            return;
        };
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.chat(&message).await;
            let _ = tx.send(AppEvent::ChatReply(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockSiteApi;
    use crate::gate::GateState;
    use crate::state::ChatRole;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Put focus on the named field of the contact form
    fn focus_field(app: &mut App, name: &str) {
        let index = app
            .state
            .contact
            .fields
            .iter()
            .position(|f| f.name == name)
            .unwrap();
        app.state.contact.focus = FormFocus::Field(index);
    }

    fn fill_contact(app: &mut App) {
        for (name, value) in [
            ("firstName", "Ada"),
            ("lastName", "Lovelace"),
            ("message", "Hello there"),
            ("email", "user@example.com"),
        ] {
            focus_field(app, name);
            type_text(app, value);
        }
    }

    async fn next_event(app: &mut App) {
        let event = app.events_rx.recv().await.unwrap();
        app.apply_event(event);
    }

    fn sent() -> MessageResponse {
        MessageResponse {
            message: "sent".to_string(),
        }
    }

    fn app_with(api: MockSiteApi, settings: Settings) -> App {
        App::new(&settings, Arc::new(api))
    }

    mod keys {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_ctrl_c_quits() {
            let mut app = app_with(MockSiteApi::new(), Settings::default());
            assert!(!app.should_quit());
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert!(app.should_quit());
        }

        #[tokio::test]
        async fn test_function_keys_switch_views() {
            let mut app = app_with(MockSiteApi::new(), Settings::default());
            press(&mut app, KeyCode::F(3));
            assert_eq!(app.state.current_view, View::JobApplication);
            press(&mut app, KeyCode::F(4));
            assert_eq!(app.state.current_view, View::Assistant);
            press(&mut app, KeyCode::F(9));
            assert_eq!(app.state.current_view, View::Assistant);
            press(&mut app, KeyCode::F(2));
            assert_eq!(app.state.current_view, View::Contact);
        }

        #[tokio::test]
        async fn test_enter_on_plain_field_moves_on() {
            let mut app = app_with(MockSiteApi::new(), Settings::default());
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.state.contact.focus, FormFocus::Field(1));
        }

        #[tokio::test]
        async fn test_invalid_email_makes_no_request() {
            let mut api = MockSiteApi::new();
            api.expect_send_otp().never();
            let mut app = app_with(api, Settings::default());

            focus_field(&mut app, "email");
            type_text(&mut app, "not-an-email");
            press(&mut app, KeyCode::Enter);

            let status = app.state.contact.gate.status().unwrap();
            assert!(status.is_error());
            assert_eq!(status.text, "Please enter a valid email address.");
            assert_eq!(app.state.contact.gate.state(), GateState::Idle);
            assert!(app.events_rx.try_recv().is_err());
        }
    }

    mod flow {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_contact_form_through_keys() {
            let mut api = MockSiteApi::new();
            api.expect_send_otp()
                .withf(|email| email == "user@example.com")
                .times(1)
                .returning(|_| Ok(sent()));
            api.expect_verify_otp()
                .withf(|req| req.otp == "123456" && req.form_type.as_deref() == Some("contact"))
                .times(1)
                .returning(|_| {
                    Ok(VerifyOtpResponse {
                        verified: Some(true),
                        token: Some("abc".to_string()),
                        message: String::new(),
                    })
                });
            api.expect_submit_form()
                .withf(|endpoint, payload| {
                    endpoint == "/api/contact" && payload.get("verification_token") == Some("abc")
                })
                .times(1)
                .returning(|_, _| {
                    Ok(MessageResponse {
                        message: "Thank you for your message!".to_string(),
                    })
                });
            let mut app = app_with(api, Settings::default());

            fill_contact(&mut app);
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.state.contact.gate.state(), GateState::CodeRequested);
            next_event(&mut app).await;
            assert_eq!(app.state.contact.gate.state(), GateState::CodeEntryPending);
            assert_eq!(app.state.contact.focus, FormFocus::Otp);

            type_text(&mut app, "123456");
            press(&mut app, KeyCode::Enter);
            next_event(&mut app).await;
            assert_eq!(app.state.contact.gate.state(), GateState::Verified);
            assert_eq!(app.state.contact.focus, FormFocus::Submit);

            press(&mut app, KeyCode::Enter);
            assert_eq!(app.state.contact.gate.state(), GateState::Submitting);
            next_event(&mut app).await;

            let form = &app.state.contact;
            assert_eq!(form.gate.state(), GateState::Idle);
            assert_eq!(form.gate.status().unwrap().text, "Thank you for your message!");
            assert!(form.fields.iter().all(|f| f.is_empty()));
        }

        #[tokio::test]
        async fn test_stale_code_reply_after_email_edit_is_dropped() {
            let mut api = MockSiteApi::new();
            api.expect_send_otp().returning(|_| Ok(sent()));
            let mut app = app_with(api, Settings::default());

            fill_contact(&mut app);
            press(&mut app, KeyCode::Enter);
            next_event(&mut app).await;
            assert_eq!(app.state.contact.gate.state(), GateState::CodeEntryPending);

            // Re-request, then change the address before the reply lands
            focus_field(&mut app, "email");
            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Backspace);
            assert_eq!(app.state.contact.gate.state(), GateState::Idle);

            next_event(&mut app).await;
            assert_eq!(app.state.contact.gate.state(), GateState::Idle);
            assert!(!app.state.contact.gate.otp().visible);
        }

        #[tokio::test(start_paused = true)]
        async fn test_countdown_expiry_reaches_the_form() {
            let mut api = MockSiteApi::new();
            api.expect_send_otp().returning(|_| Ok(sent()));
            api.expect_verify_otp().never();
            let settings = Settings {
                otp_ttl_seconds: 3,
                ..Settings::default()
            };
            let mut app = app_with(api, settings);

            fill_contact(&mut app);
            press(&mut app, KeyCode::Enter);
            next_event(&mut app).await;
            type_text(&mut app, "12");

            tokio::time::sleep(Duration::from_millis(1500)).await;
            app.process_pending();
            assert_eq!(app.state.contact.gate.session().remaining_seconds, 2);

            tokio::time::sleep(Duration::from_secs(3)).await;
            app.process_pending();

            let form = &app.state.contact;
            assert_eq!(form.gate.state(), GateState::Expired);
            assert!(!form.gate.otp().visible);
            assert!(form.is_email_focused());

            // Enter now re-requests instead of verifying
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.state.contact.gate.state(), GateState::CodeRequested);
        }

        #[tokio::test]
        async fn test_job_form_is_independent() {
            let mut api = MockSiteApi::new();
            api.expect_send_otp().returning(|_| Ok(sent()));
            let mut app = app_with(api, Settings::default());

            fill_contact(&mut app);
            press(&mut app, KeyCode::Enter);
            next_event(&mut app).await;

            press(&mut app, KeyCode::F(3));
            assert_eq!(app.state.job.gate.state(), GateState::Idle);
            assert_eq!(app.state.contact.gate.state(), GateState::CodeEntryPending);
        }
    }

    mod chat {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_chat_round_trip() {
            let mut api = MockSiteApi::new();
            api.expect_chat()
                .withf(|message| message == "hi")
                .times(1)
                .returning(|_| Ok("Hello!".to_string()));
            let mut app = app_with(api, Settings::default());

            press(&mut app, KeyCode::F(4));
            type_text(&mut app, "hi");
            press(&mut app, KeyCode::Enter);
            assert!(app.state.chat.awaiting_reply);
            next_event(&mut app).await;

            let last = app.state.chat.messages.last().unwrap();
            assert_eq!(last.role, ChatRole::Assistant);
            assert_eq!(last.text, "Hello!");
        }

        #[tokio::test]
        async fn test_paste_goes_to_chat_input() {
            let mut app = app_with(MockSiteApi::new(), Settings::default());
            press(&mut app, KeyCode::F(4));
            app.handle_paste("line one\nline two");
            assert_eq!(app.state.chat.input, "line oneline two");
        }
    }
}
