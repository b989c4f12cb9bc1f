//! Conversation stub used for direct sends.

use tracing::debug;

use crate::api::DirectApi;
use crate::error::ClientError;
use crate::types::Message;

/// A cached conversation thread.
///
/// Only what sending needs is modeled here: the thread id and the members
/// other than the client's own account.
#[derive(Debug, Clone)]
pub struct Chat {
    id: String,
    recipient_ids: Vec<String>,
}

impl Chat {
    /// Create a conversation from its thread id and recipients.
    pub fn new(id: impl Into<String>, recipient_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            recipient_ids,
        }
    }

    /// The thread id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ids of the members other than the client's own account.
    pub fn recipient_ids(&self) -> &[String] {
        &self.recipient_ids
    }

    /// Whether this is the private 1:1 thread with the given user.
    pub fn is_private_with(&self, user_id: &str) -> bool {
        self.recipient_ids.len() == 1 && self.recipient_ids[0] == user_id
    }

    /// Send a text message to this thread.
    pub async fn send(&self, direct: &dyn DirectApi, text: &str) -> Result<Message, ClientError> {
        let message = direct.send_text(&self.id, text).await?;
        debug!(thread_id = %self.id, message_id = %message.id, "sent direct message");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_thread_has_exactly_one_matching_recipient() {
        let dm = Chat::new("t1", vec!["9".to_string()]);
        assert!(dm.is_private_with("9"));
        assert!(!dm.is_private_with("8"));

        let group = Chat::new("t2", vec!["9".to_string(), "8".to_string()]);
        assert!(!group.is_private_with("9"));

        let empty = Chat::new("t3", vec![]);
        assert!(!empty.is_private_with("9"));
    }
}
