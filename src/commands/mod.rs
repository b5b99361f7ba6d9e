pub mod ask;
pub mod auth;
pub mod chat;
