//! Wire-facing types for provider payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A raw user record as returned by the provider.
///
/// Only `pk` is required. Which of the remaining fields are present depends
/// on the endpoint that produced the payload: feed pages and search results
/// carry fewer fields than a full profile fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    /// Provider-side primary key, used as the entity id.
    pub pk: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub is_private: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_business: Option<bool>,
    pub media_count: Option<i64>,
    pub profile_pic_url: Option<String>,
    pub follower_count: Option<i64>,
    pub following_count: Option<i64>,
    pub total_igtv_videos: Option<i64>,
}

impl RawUser {
    /// Parse an untyped provider payload.
    ///
    /// A payload without a usable `pk` never becomes an entity.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ClientError> {
        let raw: RawUser = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidPayload(e.to_string()))?;
        if raw.pk.is_empty() {
            return Err(ClientError::InvalidPayload("empty pk".to_string()));
        }
        Ok(raw)
    }
}

/// One page of a paginated relationship feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    /// Raw user records on this page.
    pub items: Vec<RawUser>,
    /// Cursor for the next page; `None` on the last page.
    pub next_max_id: Option<String>,
}

/// A direct message produced by a send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message id.
    pub id: String,
    /// Conversation thread this message belongs to.
    pub thread_id: String,
    /// Text content.
    pub text: String,
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
}
