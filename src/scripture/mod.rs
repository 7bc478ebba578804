//! Scripture citation recognition and passage resolution.
//!
//! - `books`: canonical book table and alias lookup
//! - `matcher`: finds a citation inside free-form text
//! - `reference`: splits a citation into book, chapter and verse
//! - `resolver`: turns text into catalog videos

pub mod books;
pub mod matcher;
pub mod reference;
pub mod resolver;

pub use books::BookRegistry;
pub use resolver::{CollectionSettings, PassageResolver};
