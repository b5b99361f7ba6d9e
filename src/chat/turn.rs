use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::pipeline::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub products: Option<Vec<Product>>,
    pub is_loading: bool,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content.into(), None)
    }

    pub fn with_products(content: impl Into<String>, products: Vec<Product>) -> Self {
        Self::new(Sender::Assistant, content.into(), Some(products))
    }

    /// Assistant placeholder shown while a query is in flight.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::new(Sender::Assistant, String::new(), None)
        }
    }

    fn new(sender: Sender, content: String, products: Option<Vec<Product>>) -> Self {
        Self {
            id: generate_id(),
            content,
            sender,
            timestamp: Utc::now(),
            products,
            is_loading: false,
        }
    }

    pub fn product_count(&self) -> usize {
        self.products.as_ref().map(Vec::len).unwrap_or(0)
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(13)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct() {
        let a = ConversationTurn::user("hi");
        let b = ConversationTurn::user("hi");
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 13);
    }

    #[test]
    fn test_loading_turn_is_empty_assistant_placeholder() {
        let turn = ConversationTurn::loading();
        assert!(turn.is_loading);
        assert_eq!(turn.sender, Sender::Assistant);
        assert!(turn.content.is_empty());
        assert_eq!(turn.product_count(), 0);
    }
}
