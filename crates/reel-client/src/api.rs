//! Narrow interfaces to the external provider client.
//!
//! The heavy lifting (HTTP session, auth, wire pagination, rate limiting)
//! lives behind these traits. This crate only consumes the results and
//! passes failures through unchanged.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApiError;
use crate::types::{FeedPage, Message};

/// Friendship management operations. Each method is exactly one provider
/// call keyed by the target user's id.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FriendshipApi: Send + Sync {
    /// Start following the user.
    async fn create(&self, user_id: &str) -> Result<(), ApiError>;
    /// Stop following the user.
    async fn destroy(&self, user_id: &str) -> Result<(), ApiError>;
    /// Block the user.
    async fn block(&self, user_id: &str) -> Result<(), ApiError>;
    /// Unblock the user.
    async fn unblock(&self, user_id: &str) -> Result<(), ApiError>;
    /// Approve the user's pending follow request.
    async fn approve(&self, user_id: &str) -> Result<(), ApiError>;
    /// Reject the user's pending follow request.
    async fn deny(&self, user_id: &str) -> Result<(), ApiError>;
    /// Remove the user from the account's followers.
    async fn remove_follower(&self, user_id: &str) -> Result<(), ApiError>;
}

/// Paginated relationship feeds.
///
/// A cursor is only meaningful within one fetch pass; every pass restarts
/// from the first page.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// One page of the accounts following `user_id`.
    async fn account_followers(
        &self,
        user_id: &str,
        max_id: Option<&str>,
    ) -> Result<FeedPage, ApiError>;

    /// One page of the accounts `user_id` follows.
    async fn account_following(
        &self,
        user_id: &str,
        max_id: Option<&str>,
    ) -> Result<FeedPage, ApiError>;
}

/// Direct-message thread operations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectApi: Send + Sync {
    /// Send a text message to an existing thread.
    async fn send_text(&self, thread_id: &str, text: &str) -> Result<Message, ApiError>;
}
