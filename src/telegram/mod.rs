//! Telegram bot adapter.

pub mod client;
pub mod handler;

pub use client::TelegramClient;
pub use handler::TelegramBot;
