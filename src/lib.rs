// Library interface for shopwhisper

pub mod auth;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod renderer;
pub mod tui;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, ShopError};
