//! Chat room: the session registry and broadcast hub behind one lock.
//!
//! All operations are synchronous. `publish` holds the room lock while
//! it runs every callback, so concurrent publishes never interleave and
//! every subscriber sees the same total order. Callbacks must not call
//! back into the room they are subscribed to.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::hub::{BroadcastHub, Subscriber};
use super::message::Message;
use super::session::{ConnectionId, SessionRegistry};
use crate::config::RoomConfig;
use crate::{ChatError, Result};

/// Shared mutable state of a room.
#[derive(Debug, Default)]
struct RoomState {
    sessions: SessionRegistry,
    hub: BroadcastHub,
}

/// A single chat room.
///
/// Construct one per room and share it with connection handlers through
/// an `Arc`.
#[derive(Debug)]
pub struct ChatRoom {
    /// Room name.
    name: String,
    state: Mutex<RoomState>,
}

impl ChatRoom {
    /// Create a new empty room.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(RoomState::default()),
        }
    }

    /// Create a room from configuration.
    pub fn from_config(config: &RoomConfig) -> Self {
        Self::new(&config.name)
    }

    /// Get the room name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A callback that panicked mid-delivery poisons the lock; the state
    /// is still consistent, so keep serving the other connections.
    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a display name for a connection.
    pub fn join(&self, connection_id: &ConnectionId, name: &str) -> Result<()> {
        self.lock().sessions.join(connection_id, name)?;
        info!(connection = %connection_id, name = %name, "joined room {}", self.name);
        Ok(())
    }

    /// Forget the display name of a connection. No-op if it never joined.
    pub fn leave(&self, connection_id: &ConnectionId) {
        if let Some(name) = self.lock().sessions.leave(connection_id) {
            info!(connection = %connection_id, name = %name, "left room {}", self.name);
        }
    }

    /// Register a callback for every message published from now on.
    pub fn subscribe<F>(&self, connection_id: &ConnectionId, callback: F) -> Result<()>
    where
        F: FnMut(&Message) + Send + 'static,
    {
        self.subscribe_boxed(connection_id, Box::new(callback))
    }

    fn subscribe_boxed(&self, connection_id: &ConnectionId, callback: Subscriber) -> Result<()> {
        let mut state = self.lock();
        state.hub.subscribe(connection_id.clone(), callback)?;
        debug!(
            connection = %connection_id,
            subscribers = state.hub.len(),
            "subscribed"
        );
        Ok(())
    }

    /// Subscribe through a bounded queue instead of a callback.
    ///
    /// Publishing never waits on the receiver. If the queue is full the
    /// message is dropped for this subscriber only; delivery order of
    /// what does arrive is unchanged.
    pub fn subscribe_channel(
        &self,
        connection_id: &ConnectionId,
        capacity: usize,
    ) -> Result<mpsc::Receiver<Message>> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let id = connection_id.clone();
        self.subscribe(connection_id, move |message: &Message| {
            if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(message.clone()) {
                warn!(connection = %id, "subscriber queue full, message dropped");
            }
        })?;
        Ok(rx)
    }

    /// Remove the subscription of a connection. No-op if absent.
    pub fn unsubscribe(&self, connection_id: &ConnectionId) {
        let mut state = self.lock();
        if state.hub.unsubscribe(connection_id) {
            debug!(
                connection = %connection_id,
                subscribers = state.hub.len(),
                "unsubscribed"
            );
        }
    }

    /// Tear down everything held for a connection.
    pub fn disconnect(&self, connection_id: &ConnectionId) {
        self.unsubscribe(connection_id);
        self.leave(connection_id);
    }

    /// Deliver a message to every current subscriber before returning.
    ///
    /// Returns the number of subscribers it was delivered to.
    pub fn publish(&self, message: Message) -> usize {
        let mut state = self.lock();
        let delivered = state.hub.publish(&message);
        debug!(kind = %message.kind(), delivered, "published");
        delivered
    }

    /// Publish a chat message from a joined connection.
    pub fn send(&self, connection_id: &ConnectionId, text: &str) -> Result<()> {
        let mut state = self.lock();
        let name = state
            .sessions
            .name_of(connection_id)
            .ok_or(ChatError::NotJoined)?;
        if text.trim().is_empty() {
            return Err(ChatError::EmptyText);
        }
        let message = Message::chat(name, text)?;
        let delivered = state.hub.publish(&message);
        debug!(connection = %connection_id, delivered, "chat message sent");
        Ok(())
    }

    /// Publish the login announcement for a joined connection.
    pub fn announce_join(&self, connection_id: &ConnectionId) -> Result<()> {
        let mut state = self.lock();
        let name = state
            .sessions
            .name_of(connection_id)
            .ok_or(ChatError::NotJoined)?;
        let message = Message::login(name);
        let delivered = state.hub.publish(&message);
        debug!(connection = %connection_id, delivered, "join announced");
        Ok(())
    }

    /// Check whether a connection has joined.
    pub fn is_joined(&self, connection_id: &ConnectionId) -> bool {
        self.lock().sessions.contains(connection_id)
    }

    /// Get the display name of a connection.
    pub fn name_of(&self, connection_id: &ConnectionId) -> Option<String> {
        self.lock()
            .sessions
            .name_of(connection_id)
            .map(str::to_string)
    }

    /// Get the number of joined participants.
    pub fn participant_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Get the names of joined participants, sorted.
    pub fn participant_names(&self) -> Vec<String> {
        self.lock().sessions.names()
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().hub.len()
    }
}

impl Default for ChatRoom {
    fn default() -> Self {
        Self::from_config(&RoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MessageKind;
    use std::sync::Arc;

    fn id(s: &str) -> ConnectionId {
        ConnectionId::new(s)
    }

    fn collector(room: &ChatRoom, conn: &str) -> Arc<Mutex<Vec<Message>>> {
        let inbox: Arc<Mutex<Vec<Message>>> = Arc::default();
        let sink = Arc::clone(&inbox);
        room.subscribe(&id(conn), move |msg: &Message| {
            sink.lock().unwrap().push(msg.clone())
        })
        .unwrap();
        inbox
    }

    #[test]
    fn test_chat_room_new() {
        let room = ChatRoom::new("Lobby");
        assert_eq!(room.name(), "Lobby");
        assert_eq!(room.participant_count(), 0);
        assert_eq!(room.subscriber_count(), 0);
    }

    #[test]
    fn test_chat_room_default_uses_config_name() {
        let room = ChatRoom::default();
        assert_eq!(room.name(), RoomConfig::default().name);
    }

    #[test]
    fn test_join_and_announce() {
        let room = ChatRoom::new("Lobby");
        let inbox = collector(&room, "c1");

        room.join(&id("c1"), "Alice").unwrap();
        room.announce_join(&id("c1")).unwrap();

        let inbox = inbox.lock().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0], Message::login("Alice"));
    }

    #[test]
    fn test_join_blank_name_creates_no_session() {
        let room = ChatRoom::new("Lobby");
        assert!(matches!(room.join(&id("c1"), ""), Err(ChatError::BlankName)));
        assert!(!room.is_joined(&id("c1")));
    }

    #[test]
    fn test_announce_join_not_joined() {
        let room = ChatRoom::new("Lobby");
        let inbox = collector(&room, "c1");
        assert!(matches!(room.announce_join(&id("c1")), Err(ChatError::NotJoined)));
        assert!(inbox.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_stamps_author() {
        let room = ChatRoom::new("Lobby");
        let inbox = collector(&room, "c2");
        room.join(&id("c1"), "Alice").unwrap();

        room.send(&id("c1"), "hi").unwrap();

        let inbox = inbox.lock().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].author(), "Alice");
        assert_eq!(inbox[0].text(), "hi");
        assert_eq!(inbox[0].kind(), MessageKind::Chat);
    }

    #[test]
    fn test_send_empty_text() {
        let room = ChatRoom::new("Lobby");
        let inbox = collector(&room, "c1");
        room.join(&id("c1"), "Alice").unwrap();

        assert!(matches!(room.send(&id("c1"), ""), Err(ChatError::EmptyText)));
        assert!(matches!(room.send(&id("c1"), "   "), Err(ChatError::EmptyText)));
        assert!(inbox.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_not_joined_checked_before_empty_text() {
        let room = ChatRoom::new("Lobby");
        assert!(matches!(room.send(&id("c9"), ""), Err(ChatError::NotJoined)));
    }

    #[test]
    fn test_leave_then_send() {
        let room = ChatRoom::new("Lobby");
        room.join(&id("c1"), "Alice").unwrap();
        room.leave(&id("c1"));
        assert!(matches!(
            room.send(&id("c1"), "still here?"),
            Err(ChatError::NotJoined)
        ));
    }

    #[test]
    fn test_leave_never_joined_is_noop() {
        let room = ChatRoom::new("Lobby");
        room.leave(&id("ghost"));
        assert_eq!(room.participant_count(), 0);
    }

    #[test]
    fn test_disconnect_removes_both() {
        let room = ChatRoom::new("Lobby");
        let _inbox = collector(&room, "c1");
        room.join(&id("c1"), "Alice").unwrap();

        // Disconnect without an explicit leave
        room.disconnect(&id("c1"));

        assert_eq!(room.subscriber_count(), 0);
        assert_eq!(room.participant_count(), 0);
    }

    #[test]
    fn test_participant_names_allow_duplicates() {
        let room = ChatRoom::new("Lobby");
        room.join(&id("c1"), "Bob").unwrap();
        room.join(&id("c2"), "Alice").unwrap();
        room.join(&id("c3"), "Alice").unwrap();
        assert_eq!(room.participant_names(), vec!["Alice", "Alice", "Bob"]);
        assert_eq!(room.name_of(&id("c1")), Some("Bob".to_string()));
    }

    #[test]
    fn test_publish_returns_delivery_count() {
        let room = ChatRoom::new("Lobby");
        let _a = collector(&room, "c1");
        let _b = collector(&room, "c2");
        assert_eq!(room.publish(Message::login("Carol")), 2);
    }

    #[test]
    fn test_panicking_subscriber_does_not_wedge_room() {
        let room = Arc::new(ChatRoom::new("Lobby"));
        room.subscribe(&id("bad"), |_: &Message| panic!("subscriber failure")).unwrap();

        // Publish on another thread; the callback panics while holding the lock
        let r = Arc::clone(&room);
        let outcome = std::thread::spawn(move || r.publish(Message::login("Alice"))).join();
        assert!(outcome.is_err());

        // The room is still usable afterwards
        room.unsubscribe(&id("bad"));
        let inbox = collector(&room, "good");
        room.publish(Message::login("Bob"));
        assert_eq!(inbox.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_channel_receives_in_order() {
        let room = ChatRoom::new("Lobby");
        let mut rx = room.subscribe_channel(&id("c1"), 8).unwrap();
        room.join(&id("c1"), "Alice").unwrap();
        room.announce_join(&id("c1")).unwrap();
        room.send(&id("c1"), "one").unwrap();
        room.send(&id("c1"), "two").unwrap();

        assert_eq!(rx.recv().await.unwrap().kind(), MessageKind::Login);
        assert_eq!(rx.recv().await.unwrap().text(), "one");
        assert_eq!(rx.recv().await.unwrap().text(), "two");
    }

    #[tokio::test]
    async fn test_subscribe_channel_full_drops_for_that_subscriber_only() {
        let room = ChatRoom::new("Lobby");
        let mut slow = room.subscribe_channel(&id("slow"), 1).unwrap();
        let fast = collector(&room, "fast");

        // Second message overflows the slow queue
        room.publish(Message::login("A"));
        room.publish(Message::login("B"));

        assert_eq!(fast.lock().unwrap().len(), 2);
        assert_eq!(slow.recv().await.unwrap().author(), "A");
        assert!(slow.try_recv().is_err());
    }

    #[test]
    fn test_subscribe_channel_closed_receiver() {
        let room = ChatRoom::new("Lobby");
        let rx = room.subscribe_channel(&id("c1"), 4).unwrap();
        drop(rx);
        assert_eq!(room.publish(Message::login("Alice")), 1);
    }
}
