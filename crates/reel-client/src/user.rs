//! The canonical user entity and its operations.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::api::{DirectApi, FeedApi, FriendshipApi};
use crate::cache::EntityStore;
use crate::error::ClientError;
use crate::types::{Message, RawUser};

/// Mutable profile attributes of a user.
///
/// Replaced wholesale on every patch; there is no field-level merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub is_private: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_business: Option<bool>,
    pub media_count: Option<i64>,
    pub avatar_url: Option<String>,
    pub follower_count: Option<i64>,
    pub following_count: Option<i64>,
    pub total_igtv_videos: Option<i64>,
}

impl UserProfile {
    fn from_raw(raw: &RawUser) -> Self {
        Self {
            username: raw.username.clone(),
            full_name: raw.full_name.clone(),
            biography: raw.biography.clone(),
            is_private: raw.is_private,
            is_verified: raw.is_verified,
            is_business: raw.is_business,
            media_count: raw.media_count,
            avatar_url: raw.profile_pic_url.clone(),
            follower_count: raw.follower_count,
            following_count: raw.following_count,
            total_igtv_videos: raw.total_igtv_videos,
        }
    }
}

/// A user account as known to this client.
///
/// The store-held `Arc<User>` is the canonical object for an id; a copy
/// held outside the store does not receive future patches. The
/// `followers`/`following` views start empty, are filled by the fetch
/// methods, and go silently stale afterwards; callers re-fetch to refresh.
pub struct User {
    id: String,
    profile: RwLock<UserProfile>,
    followers: DashMap<String, Arc<User>>,
    following: DashMap<String, Arc<User>>,
}

impl User {
    pub(crate) fn from_raw(raw: &RawUser) -> Result<Self, ClientError> {
        if raw.pk.is_empty() {
            return Err(ClientError::InvalidPayload("missing user pk".to_string()));
        }
        Ok(Self {
            id: raw.pk.clone(),
            profile: RwLock::new(UserProfile::from_raw(raw)),
            followers: DashMap::new(),
            following: DashMap::new(),
        })
    }

    /// The id of the user. Stable for the entity's whole lifetime.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the current profile attributes.
    pub async fn profile(&self) -> UserProfile {
        self.profile.read().await.clone()
    }

    /// Overwrite all profile attributes from a fresh payload.
    ///
    /// The id never changes; a payload keyed to a different id is rejected
    /// before any field is touched. The whole profile is swapped under one
    /// write section, so a reader observes either the old or the new
    /// attributes, never a mix.
    pub async fn patch(&self, raw: &RawUser) -> Result<(), ClientError> {
        if raw.pk.is_empty() {
            return Err(ClientError::InvalidPayload("missing user pk".to_string()));
        }
        if raw.pk != self.id {
            return Err(ClientError::IdentityMismatch {
                expected: self.id.clone(),
                got: raw.pk.clone(),
            });
        }

        *self.profile.write().await = UserProfile::from_raw(raw);
        trace!(id = %self.id, "patched user profile");
        Ok(())
    }

    /// Snapshot of the followers view.
    pub fn followers(&self) -> Vec<Arc<User>> {
        self.followers
            .iter()
            .map(|r| r.value().clone())
            .collect()
    }

    /// Snapshot of the following view.
    pub fn following(&self) -> Vec<Arc<User>> {
        self.following
            .iter()
            .map(|r| r.value().clone())
            .collect()
    }

    /// Look up a user in the followers view.
    pub fn follower(&self, id: &str) -> Option<Arc<User>> {
        self.followers.get(id).map(|r| r.value().clone())
    }

    /// Look up a user in the following view.
    pub fn followee(&self, id: &str) -> Option<Arc<User>> {
        self.following.get(id).map(|r| r.value().clone())
    }

    /// Detach the relationship views. The views hold `Arc` back-references
    /// between users, so this runs at store teardown to break the cycles.
    pub(crate) fn clear_views(&self) {
        self.followers.clear();
        self.following.clear();
    }

    /// Fetch the accounts following this user and populate the followers
    /// view.
    ///
    /// Each record is upserted into the store and the canonical entity is
    /// inserted into the view. Previous view contents are kept: repeated
    /// calls accumulate and overwrite by id, and entries that disappeared
    /// server-side are never removed.
    pub async fn fetch_followers(
        &self,
        store: &EntityStore,
        feed: &dyn FeedApi,
    ) -> Result<Vec<Arc<User>>, ClientError> {
        let mut cursor: Option<String> = None;
        loop {
            let page = feed.account_followers(&self.id, cursor.as_deref()).await?;
            for raw in &page.items {
                let user = store.upsert_user(raw).await?;
                self.followers.insert(user.id().to_string(), user);
            }
            match page.next_max_id {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(id = %self.id, count = self.followers.len(), "fetched followers");
        Ok(self.followers())
    }

    /// Fetch the accounts this user follows and populate the following
    /// view. Same accumulation contract as [`User::fetch_followers`].
    pub async fn fetch_following(
        &self,
        store: &EntityStore,
        feed: &dyn FeedApi,
    ) -> Result<Vec<Arc<User>>, ClientError> {
        let mut cursor: Option<String> = None;
        loop {
            let page = feed.account_following(&self.id, cursor.as_deref()).await?;
            for raw in &page.items {
                let user = store.upsert_user(raw).await?;
                self.following.insert(user.id().to_string(), user);
            }
            match page.next_max_id {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(id = %self.id, count = self.following.len(), "fetched following");
        Ok(self.following())
    }

    /// Start following this user.
    pub async fn follow(&self, friendships: &dyn FriendshipApi) -> Result<(), ClientError> {
        friendships.create(&self.id).await?;
        debug!(id = %self.id, "followed user");
        Ok(())
    }

    /// Stop following this user.
    pub async fn unfollow(&self, friendships: &dyn FriendshipApi) -> Result<(), ClientError> {
        friendships.destroy(&self.id).await?;
        debug!(id = %self.id, "unfollowed user");
        Ok(())
    }

    /// Block this user.
    pub async fn block(&self, friendships: &dyn FriendshipApi) -> Result<(), ClientError> {
        friendships.block(&self.id).await?;
        debug!(id = %self.id, "blocked user");
        Ok(())
    }

    /// Unblock this user.
    pub async fn unblock(&self, friendships: &dyn FriendshipApi) -> Result<(), ClientError> {
        friendships.unblock(&self.id).await?;
        debug!(id = %self.id, "unblocked user");
        Ok(())
    }

    /// Approve this user's follow request.
    pub async fn approve_follow(&self, friendships: &dyn FriendshipApi) -> Result<(), ClientError> {
        friendships.approve(&self.id).await?;
        Ok(())
    }

    /// Reject this user's follow request.
    pub async fn deny_follow(&self, friendships: &dyn FriendshipApi) -> Result<(), ClientError> {
        friendships.deny(&self.id).await?;
        Ok(())
    }

    /// Remove this user from the account's followers.
    pub async fn remove_follower(&self, friendships: &dyn FriendshipApi) -> Result<(), ClientError> {
        friendships.remove_follower(&self.id).await?;
        Ok(())
    }

    /// Send a direct message to this user.
    ///
    /// The private 1:1 conversation must already be cached; this layer
    /// never creates threads. Without one, no provider call is made.
    pub async fn send(
        &self,
        store: &EntityStore,
        direct: &dyn DirectApi,
        text: &str,
    ) -> Result<Message, ClientError> {
        let chat = store
            .private_chat_with(&self.id)
            .ok_or_else(|| ClientError::ConversationNotFound(self.id.clone()))?;
        chat.send(direct, text).await
    }
}

impl fmt::Debug for User {
    // Views hold Arc back-references between users; printing them would
    // recurse through the graph.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("followers", &self.followers.len())
            .field("following", &self.following.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
