//! Per-session entity store.
//!
//! Thread-safe and designed for concurrent access from multiple tasks.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::chat::Chat;
use crate::error::ClientError;
use crate::types::RawUser;
use crate::user::User;

/// Canonical store of the entities known to one client session.
///
/// For any cached id there is exactly one `Arc<User>`, and every
/// relationship view points at that object. Entries are never evicted: the
/// store grows with the session and is cleared at client shutdown.
pub struct EntityStore {
    /// Cached users by id.
    users: DashMap<String, Arc<User>>,
    /// Cached conversations by thread id.
    chats: DashMap<String, Arc<Chat>>,
}

impl EntityStore {
    /// Create a new empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            users: DashMap::new(),
            chats: DashMap::new(),
        })
    }

    /// Insert or update the canonical user for a payload.
    ///
    /// A known id keeps its entity object and gets the profile overwritten;
    /// an unknown id gets a fresh entity. The entry API makes the
    /// check-and-insert atomic, so two tasks racing on one id cannot both
    /// insert: profile fields are last-writer-wins, the entity object is
    /// created exactly once.
    pub async fn upsert_user(&self, raw: &RawUser) -> Result<Arc<User>, ClientError> {
        use dashmap::mapref::entry::Entry;

        if raw.pk.is_empty() {
            return Err(ClientError::InvalidPayload("missing user pk".to_string()));
        }

        let (user, existed) = match self.users.entry(raw.pk.clone()) {
            Entry::Occupied(entry) => (entry.get().clone(), true),
            Entry::Vacant(entry) => {
                let user = Arc::new(User::from_raw(raw)?);
                entry.insert(user.clone());
                (user, false)
            }
        };

        // The shard lock is released before patching; the patch itself is
        // atomic under the entity's own lock.
        if existed {
            user.patch(raw).await?;
        }

        trace!(id = %user.id(), existed, "cache: user upserted");
        Ok(user)
    }

    /// Get the canonical user for an id.
    pub fn user(&self, id: &str) -> Option<Arc<User>> {
        self.users.get(id).map(|r| r.value().clone())
    }

    /// List all cached users.
    pub fn users(&self) -> Vec<Arc<User>> {
        self.users.iter().map(|r| r.value().clone()).collect()
    }

    /// Number of cached users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Insert a conversation, replacing any previous entry for its thread.
    pub fn insert_chat(&self, chat: Chat) -> Arc<Chat> {
        let chat = Arc::new(chat);
        self.chats.insert(chat.id().to_string(), chat.clone());
        trace!(id = %chat.id(), "cache: chat inserted");
        chat
    }

    /// Get a conversation by thread id.
    pub fn chat(&self, id: &str) -> Option<Arc<Chat>> {
        self.chats.get(id).map(|r| r.value().clone())
    }

    /// Number of cached conversations.
    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    /// Find the cached private 1:1 conversation with a user.
    pub fn private_chat_with(&self, user_id: &str) -> Option<Arc<Chat>> {
        self.chats
            .iter()
            .find(|r| r.value().is_private_with(user_id))
            .map(|r| r.value().clone())
    }

    /// Drop all cached entities.
    ///
    /// Relationship views hold `Arc` back-references between users; they
    /// are detached first so mutually referencing entities can free.
    pub fn clear(&self) {
        for entry in self.users.iter() {
            entry.value().clear_views();
        }
        self.users.clear();
        self.chats.clear();
        debug!("entity store cleared");
    }
}
