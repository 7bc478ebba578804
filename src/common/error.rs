//! Error types for the application.

use std::fmt;

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Malformed static book data. Always fatal at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Alias '{alias}' is claimed by both {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Book {title} has no aliases")]
    NoAliases { title: String },

    #[error("Alias '{alias}' of {title} is not normalized")]
    UnnormalizedAlias { alias: String, title: String },

    #[error("Citation pattern failed to compile: {message}")]
    Pattern { message: String },
}

/// Errors talking to the video catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Catalog answered with HTTP {status}")]
    Status { status: u16 },

    #[error("Catalog response could not be decoded: {message}")]
    Decode { message: String },
}

/// Errors talking to a chat platform.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("{platform} request failed: {source}")]
    Transport {
        platform: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{platform} method '{method}' answered with HTTP {status}")]
    Api {
        platform: &'static str,
        method: String,
        status: u16,
    },

    #[error("{platform} rejected '{method}': {description}")]
    Rejected {
        platform: &'static str,
        method: String,
        description: String,
    },

    #[error("Webhook signature mismatch")]
    BadSignature,
}

/// Why a passage could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No citation and no book alias in the input.
    NoReferenceFound,
    /// A book-shaped token matched no registry alias.
    UnknownBook,
    /// Transport failure or non-200 from the catalog.
    CatalogUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoReferenceFound => "no reference found",
            Self::UnknownBook => "unknown book",
            Self::CatalogUnavailable => "catalog unavailable",
        };
        f.write_str(name)
    }
}

/// Resolution failure. Recovered inside the resolver, never returned to adapters.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No reference or book alias in '{input}'")]
    NoReferenceFound { input: String },

    #[error("Unknown book '{alias}'")]
    UnknownBook { alias: String },

    #[error("Catalog unavailable for {book}: {source}")]
    CatalogUnavailable {
        book: String,
        #[source]
        source: CatalogError,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoReferenceFound { .. } => ErrorKind::NoReferenceFound,
            Self::UnknownBook { .. } => ErrorKind::UnknownBook,
            Self::CatalogUnavailable { .. } => ErrorKind::CatalogUnavailable,
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Result type alias for chat platform operations.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;
