//! Common types and errors shared across the application.

pub mod error;
pub mod types;
