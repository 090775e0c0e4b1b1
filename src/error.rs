//! Error types for roomcast.

use thiserror::Error;

use crate::chat::ConnectionId;

/// Common error type for roomcast.
///
/// Every failure is local to the call that produced it; none of these
/// affect delivery to other subscribers.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Join attempted with an empty or whitespace-only name.
    #[error("name cannot be blank")]
    BlankName,

    /// Send attempted by a connection that has not joined.
    #[error("connection has not joined the chat")]
    NotJoined,

    /// Send attempted with an empty message body.
    #[error("message text is empty")]
    EmptyText,

    /// The connection already has a subscriber registered.
    #[error("connection {0} is already subscribed")]
    DuplicateSubscriber(ConnectionId),

    /// A message violated its construction invariant.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Presentation attributes requested for an empty name.
    #[error("name is empty")]
    EmptyName,

    /// Color index requested for a palette with no entries.
    #[error("palette size must be greater than zero")]
    EmptyPalette,

    /// A client sent an input line longer than the server accepts.
    #[error("input line exceeds {0} bytes")]
    LineTooLong(usize),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for roomcast operations.
pub type Result<T> = std::result::Result<T, ChatError>;
