pub mod session;
pub mod turn;

pub use session::ChatSession;
pub use turn::{ConversationTurn, Sender};
