use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Wire-format role name for the chat endpoint
    pub fn as_role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// A single conversation entry. Immutable once created; ordering is
/// insertion order in the storage, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(Sender::User.as_role(), "user");
        assert_eq!(Sender::Assistant.as_role(), "assistant");
    }

    #[test]
    fn test_messages_get_distinct_ids() {
        let a = Message::new(Sender::User, "hi");
        let b = Message::new(Sender::User, "hi");
        assert_ne!(a.id, b.id);
    }
}
