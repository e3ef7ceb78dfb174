//! Site assistant chat state

use crate::api::SiteApi;
use crate::gate::GateError;
use chrono::{DateTime, Local};

const GREETING: &str = "Hello! I'm the site assistant. How can I help you today?";
const CONNECTION_TROUBLE: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub sent_at: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            sent_at: Local::now(),
        }
    }
}

/// Conversation with the assistant plus the line being typed
#[derive(Debug, Clone)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    /// A reply is on its way; sending is blocked and a typing indicator shows
    pub awaiting_reply: bool,
    /// Rows scrolled up from the bottom of the history
    pub scroll: u16,
    /// Furthest `scroll` can go, as measured by the last render
    pub max_scroll: u16,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::new(ChatRole::Assistant, GREETING)],
            input: String::new(),
            awaiting_reply: false,
            scroll: 0,
            max_scroll: 0,
        }
    }
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the typed line as the next user message
    ///
    /// Returns `None` for blank input or while a reply is pending.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.awaiting_reply {
            return None;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input.clear();
        self.messages.push(ChatMessage::new(ChatRole::User, text.clone()));
        self.awaiting_reply = true;
        self.scroll = 0;
        Some(text)
    }

    /// Append the assistant's reply, or an apology if it never arrived
    pub fn complete(&mut self, result: Result<String, GateError>) {
        self.awaiting_reply = false;
        let text = match result {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!("Assistant request failed: {err:?}");
                CONNECTION_TROUBLE.to_string()
            }
        };
        self.messages.push(ChatMessage::new(ChatRole::Assistant, text));
        self.scroll = 0;
    }

    #[allow(dead_code)]
    pub async fn send(&mut self, api: &dyn SiteApi) -> bool {
        let Some(message) = self.begin_send() else {
            return false;
        };
        let result = api.chat(&message).await;
        self.complete(result);
        true
    }

    pub fn scroll_up(&mut self) {
        if self.scroll < self.max_scroll {
            self.scroll += 1;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Record how far the rendered history can scroll
    pub fn set_max_scroll(&mut self, max: u16) {
        self.max_scroll = max;
        self.scroll = self.scroll.min(max);
    }
}
