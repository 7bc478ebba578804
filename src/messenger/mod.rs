//! Facebook Messenger bot adapter.

pub mod client;
pub mod handler;
pub mod signature;

pub use client::{MessengerClient, WebhookPayload};
pub use handler::MessengerBot;
