//! Chat module for roomcast.
//!
//! This module provides the broadcast and session core:
//! - Messages (chat and login announcements)
//! - Presentation attributes derived from display names
//! - Session registry (connection -> display name)
//! - Broadcast hub with ordered fan-out
//! - Chat room tying registry and hub together under one lock

mod hub;
mod message;
mod presenter;
mod room;
mod session;

pub use hub::{BroadcastHub, Subscriber};
pub use message::{Message, MessageKind};
pub use presenter::{color_index_of, initials_of, AvatarColor};
pub use room::ChatRoom;
pub use session::{ConnectionId, SessionRegistry};
