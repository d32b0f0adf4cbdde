//! REST client for the chat platform. Implements both the mirror webhook
//! surface and the bot's own channel operations.

pub mod client;
pub mod wire;

pub use client::DiscordClient;
