//! Client wiring: one store plus the collaborator handles.

use std::sync::Arc;

use tracing::debug;

use crate::api::{DirectApi, FeedApi, FriendshipApi};
use crate::cache::EntityStore;
use crate::error::ClientError;
use crate::types::{Message, RawUser};
use crate::user::User;

/// Owner of the entity store and the provider collaborators.
///
/// The store lives exactly as long as the client: created here, cleared by
/// [`Client::shutdown`]. Entity methods take their collaborators
/// explicitly; the pass-throughs below wire in the ones this client owns.
pub struct Client {
    store: Arc<EntityStore>,
    friendships: Arc<dyn FriendshipApi>,
    feed: Arc<dyn FeedApi>,
    direct: Arc<dyn DirectApi>,
}

impl Client {
    /// Create a client around the given collaborators, with a fresh store.
    pub fn new(
        friendships: Arc<dyn FriendshipApi>,
        feed: Arc<dyn FeedApi>,
        direct: Arc<dyn DirectApi>,
    ) -> Self {
        Self {
            store: EntityStore::new(),
            friendships,
            feed,
            direct,
        }
    }

    /// The store owned by this client.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// The friendship-management collaborator.
    pub fn friendships(&self) -> &dyn FriendshipApi {
        self.friendships.as_ref()
    }

    /// The relationship-feed collaborator.
    pub fn feed(&self) -> &dyn FeedApi {
        self.feed.as_ref()
    }

    /// The direct-message collaborator.
    pub fn direct(&self) -> &dyn DirectApi {
        self.direct.as_ref()
    }

    /// Upsert a payload into the store and return the canonical entity.
    pub async fn upsert_user(&self, raw: &RawUser) -> Result<Arc<User>, ClientError> {
        self.store.upsert_user(raw).await
    }

    /// Populate a user's followers view.
    pub async fn fetch_followers(&self, user: &User) -> Result<Vec<Arc<User>>, ClientError> {
        user.fetch_followers(&self.store, self.feed.as_ref()).await
    }

    /// Populate a user's following view.
    pub async fn fetch_following(&self, user: &User) -> Result<Vec<Arc<User>>, ClientError> {
        user.fetch_following(&self.store, self.feed.as_ref()).await
    }

    /// Send a direct message to a user over the cached 1:1 thread.
    pub async fn send_to(&self, user: &User, text: &str) -> Result<Message, ClientError> {
        user.send(&self.store, self.direct.as_ref(), text).await
    }

    /// Tear down the session cache.
    pub fn shutdown(&self) {
        self.store.clear();
        debug!("client shut down");
    }
}
