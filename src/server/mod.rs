//! Line-chat TCP server.
//!
//! A thin transport over [`crate::chat::ChatRoom`]: each TCP connection is
//! one participant.

mod connection;
mod listener;

pub use connection::{handle_connection, render_line, BLANK_NAME_REPLY, NAME_PROMPT};
pub use listener::{ChatServer, ConnectionPermit};
