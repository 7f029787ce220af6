//! UI-agnostic conversation state
//!
//! The transcript is shared between front ends and doesn't depend on any
//! specific UI framework.

use serde::{Deserialize, Serialize};

/// Who a transcript entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

/// A rendered chat message. Never edited once pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            is_error: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            is_error: false,
        }
    }

    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            is_error: true,
        }
    }

    /// Non-blank lines, one rendered paragraph each.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n').filter(|p| !p.trim().is_empty())
    }
}

/// Append-only list of messages plus the transient "thinking" placeholder.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    loading: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn show_loading(&mut self) {
        self.loading = true;
    }

    pub fn hide_loading(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_skip_blank_lines() {
        let msg = Message::assistant("Bonjour\n\n  \nComment allez-vous ?");
        let paras: Vec<&str> = msg.paragraphs().collect();
        assert_eq!(paras, vec!["Bonjour", "Comment allez-vous ?"]);
    }

    #[test]
    fn test_transcript_keeps_arrival_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("a"));
        transcript.show_loading();
        transcript.push(Message::assistant("b"));
        transcript.hide_loading();

        assert!(!transcript.is_loading());
        let senders: Vec<Sender> = transcript.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Assistant]);
    }
}
