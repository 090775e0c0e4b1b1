//! Broadcast hub: ordered fan-out of messages to subscriber callbacks.
//!
//! The hub itself is single-threaded (`&mut self`); `ChatRoom` puts it
//! behind the room lock so publishes are serialized into one total order.

use std::fmt;

use super::message::Message;
use super::session::ConnectionId;
use crate::{ChatError, Result};

/// Callback invoked for every delivered message.
pub type Subscriber = Box<dyn FnMut(&Message) + Send>;

/// Subscriber callbacks in registration order.
#[derive(Default)]
pub struct BroadcastHub {
    subscribers: Vec<(ConnectionId, Subscriber)>,
}

impl BroadcastHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` to receive every message published from now on.
    ///
    /// A connection may hold only one subscription at a time.
    pub fn subscribe(&mut self, connection_id: ConnectionId, callback: Subscriber) -> Result<()> {
        if self.is_subscribed(&connection_id) {
            return Err(ChatError::DuplicateSubscriber(connection_id));
        }
        self.subscribers.push((connection_id, callback));
        Ok(())
    }

    /// Remove the subscription for `connection_id`.
    ///
    /// Returns true if a subscription was removed.
    pub fn unsubscribe(&mut self, connection_id: &ConnectionId) -> bool {
        match self
            .subscribers
            .iter()
            .position(|(id, _)| id == connection_id)
        {
            Some(index) => {
                // remove, not swap_remove: delivery order is registration order
                drop(self.subscribers.remove(index));
                true
            }
            None => false,
        }
    }

    /// Deliver `message` to every subscriber in registration order.
    ///
    /// Returns the number of subscribers the message was delivered to.
    pub fn publish(&mut self, message: &Message) -> usize {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(message);
        }
        self.subscribers.len()
    }

    /// Check whether `connection_id` is subscribed.
    pub fn is_subscribed(&self, connection_id: &ConnectionId) -> bool {
        self.subscribers.iter().any(|(id, _)| id == connection_id)
    }

    /// Get the number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Check whether there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastHub")
            .field(
                "subscribers",
                &self.subscribers.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            )
            .finish()
    }
}
