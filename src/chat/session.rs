//! Connection identity and the session registry.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{ChatError, Result};

/// Opaque identifier of one live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Mapping from connection to chosen display name.
///
/// Display names are not unique: two connections may join with the
/// same name.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, String>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for `connection_id`.
    ///
    /// Joining again replaces the previously registered name.
    pub fn join(&mut self, connection_id: &ConnectionId, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ChatError::BlankName);
        }
        self.sessions.insert(connection_id.clone(), name.to_string());
        Ok(())
    }

    /// Get the name registered for `connection_id`.
    pub fn name_of(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.sessions.get(connection_id).map(String::as_str)
    }

    /// Remove the session for `connection_id`.
    ///
    /// Returns the name that was registered, if any.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<String> {
        self.sessions.remove(connection_id)
    }

    /// Check whether `connection_id` has joined.
    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.sessions.contains_key(connection_id)
    }

    /// Get the number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Get all registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.values().cloned().collect();
        names.sort();
        names
    }
}
