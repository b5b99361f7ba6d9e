use std::collections::HashSet;

use super::turn::ConversationTurn;
use crate::config::COLLAPSED_PRODUCT_COUNT;
use crate::error::Result;
use crate::pipeline::{Product, Recommendation};

pub const GREETING: &str = "Hi there! I'm your shop assistant powered by AI. I can help you find products using natural language. Try asking me something like \"I need a red dress for a summer wedding under $100\" or \"Do you have eco-friendly sneakers?\"";

pub const ERROR_REPLY: &str =
    "I'm sorry, I encountered an error while searching for products. Please try again.";

/// State of one chat widget: open/closed, the turn list, the input line and
/// the single in-flight query.
///
/// Turns are only appended. The one exception is the loading placeholder,
/// which `resolve` removes by id before appending the real reply.
#[derive(Debug)]
pub struct ChatSession {
    open: bool,
    turns: Vec<ConversationTurn>,
    input: String,
    /// Id of the placeholder turn while a query is in flight
    pending: Option<String>,
    /// Turns whose product list is expanded
    expanded: HashSet<String>,
    input_focused: bool,
    scroll_requested: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            open: false,
            turns: vec![ConversationTurn::assistant(GREETING)],
            input: String::new(),
            pending: None,
            expanded: HashSet::new(),
            input_focused: false,
            scroll_requested: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Open or close the widget. Opening moves focus to the input line.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.input_focused = self.open;
        if self.open {
            self.scroll_requested = true;
        }
        self.open
    }

    /// Input is disabled while closed or while a query is in flight.
    pub fn accepts_input(&self) -> bool {
        self.open && !self.is_awaiting()
    }

    pub fn type_char(&mut self, c: char) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.input.push(c);
        true
    }

    pub fn backspace(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.input.pop().is_some()
    }

    pub fn set_input(&mut self, text: &str) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.input = text.to_string();
        true
    }

    /// Move the input into a user turn, add the loading placeholder and
    /// return the query to run. Returns `None` and changes nothing when the
    /// widget is closed, a query is already in flight, or the input is blank.
    pub fn submit(&mut self) -> Option<String> {
        if !self.accepts_input() || self.input.trim().is_empty() {
            return None;
        }

        let content = std::mem::take(&mut self.input);
        let query = content.trim().to_string();

        let placeholder = ConversationTurn::loading();
        self.pending = Some(placeholder.id.clone());
        self.turns.push(ConversationTurn::user(content));
        self.turns.push(placeholder);
        self.scroll_requested = true;

        Some(query)
    }

    /// Replace the placeholder with the reply, or with the error turn when
    /// the query failed. Returns `false` if nothing was in flight.
    pub fn resolve(&mut self, outcome: Result<Recommendation>) -> bool {
        let Some(placeholder_id) = self.pending.take() else {
            return false;
        };

        let reply = match outcome {
            Ok(rec) => ConversationTurn::with_products(rec.message, rec.products),
            Err(e) => {
                tracing::warn!(error = %e, "product search failed");
                ConversationTurn::assistant(ERROR_REPLY)
            }
        };

        self.turns.retain(|t| t.id != placeholder_id);
        self.turns.push(reply);
        self.scroll_requested = true;
        true
    }

    pub fn is_expanded(&self, turn_id: &str) -> bool {
        self.expanded.contains(turn_id)
    }

    /// Products to draw for a turn: the first few, or all once expanded.
    pub fn visible_products<'a>(&self, turn: &'a ConversationTurn) -> &'a [Product] {
        let products = turn.products.as_deref().unwrap_or(&[]);
        if self.is_expanded(&turn.id) {
            products
        } else {
            &products[..products.len().min(COLLAPSED_PRODUCT_COUNT)]
        }
    }

    /// Products not drawn while collapsed.
    pub fn hidden_product_count(&self, turn: &ConversationTurn) -> usize {
        turn.product_count() - self.visible_products(turn).len()
    }

    pub fn has_more_products(turn: &ConversationTurn) -> bool {
        turn.product_count() > COLLAPSED_PRODUCT_COUNT
    }

    /// Flip show-more for a turn. Only turns with more products than the
    /// collapsed view can show are toggleable.
    pub fn toggle_products(&mut self, turn_id: &str) -> bool {
        let toggleable = self
            .turns
            .iter()
            .any(|t| t.id == turn_id && Self::has_more_products(t));
        if !toggleable {
            return false;
        }
        if !self.expanded.remove(turn_id) {
            self.expanded.insert(turn_id.to_string());
        }
        true
    }

    /// True once after every change to the turn list.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}
