//! Chat transcript types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry in a session transcript
///
/// Bot messages may carry attached product records; the text may be
/// empty when products are attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub products: Vec<Product>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A user message; never carries products
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            products: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// A plain-text bot message
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            products: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// A bot message with attached products
    pub fn bot_with_products(text: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            products,
            created_at: Utc::now(),
        }
    }
}

/// Summary counts over a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub bot_messages: usize,
}

impl TranscriptStats {
    /// Compute counts from a transcript slice
    pub fn from_messages(messages: &[ChatMessage]) -> Self {
        let user_messages = messages.iter().filter(|m| m.sender == Sender::User).count();
        Self {
            total_messages: messages.len(),
            user_messages,
            bot_messages: messages.len() - user_messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("hi");
        assert_eq!(user.sender, Sender::User);
        assert!(user.products.is_empty());

        let bot = ChatMessage::bot("hello");
        assert_eq!(bot.sender, Sender::Bot);
        assert_eq!(bot.text, "hello");
    }

    #[test]
    fn test_transcript_stats() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::bot("hello"),
            ChatMessage::user("black tees"),
            ChatMessage::bot_with_products("", vec![]),
        ];
        let stats = TranscriptStats::from_messages(&messages);
        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.user_messages, 2);
        assert_eq!(stats.bot_messages, 2);
    }
}
