//! Chat message model.

use crate::{ChatError, Result};

/// Kind of chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Regular chat message.
    Chat,
    /// User joined announcement.
    Login,
}

impl MessageKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Chat => "chat",
            MessageKind::Login => "login",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chat message.
///
/// Messages are immutable once built; fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    author: String,
    text: String,
    kind: MessageKind,
}

impl Message {
    /// Create a new message.
    ///
    /// Chat messages must carry a non-empty author.
    pub fn new(
        author: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
    ) -> Result<Self> {
        let author = author.into();
        if kind == MessageKind::Chat && author.is_empty() {
            return Err(ChatError::InvalidMessage(
                "chat message without author".to_string(),
            ));
        }
        Ok(Self {
            author,
            text: text.into(),
            kind,
        })
    }

    /// Create a chat message.
    pub fn chat(author: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        Self::new(author, text, MessageKind::Chat)
    }

    /// Create the announcement published when `name` joins.
    pub fn login(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            text: format!("{name} has joined the chat."),
            author: name,
            kind: MessageKind::Login,
        }
    }

    /// Sender's display name.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Message body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Message kind.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Format the message for line-oriented display.
    pub fn format(&self) -> String {
        match self.kind {
            MessageKind::Chat => format!("<{}> {}", self.author, self.text),
            MessageKind::Login => format!("*** {}", self.text),
        }
    }
}
