//! roomcast - single-room group chat core
//!
//! Participants join a shared room under a display name and exchange
//! short text messages that are broadcast, in publish order, to every
//! currently subscribed participant.

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use chat::{
    color_index_of, initials_of, AvatarColor, BroadcastHub, ChatRoom, ConnectionId, Message,
    MessageKind, SessionRegistry, Subscriber,
};
pub use config::Config;
pub use error::{ChatError, Result};
pub use server::ChatServer;
