//! Web API and webhook endpoints.

pub mod search;
pub mod server;

pub use server::{start_http_server, AppState};
