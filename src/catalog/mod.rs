//! Video catalog access.

pub mod client;
#[cfg(test)]
pub mod stub;

pub use client::{CatalogClient, CatalogVideo, DbpCatalog};
