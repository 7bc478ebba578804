//! Shared types used across the application.

use serde::Serialize;

/// Which half of the canon a book belongs to. Selects the catalog collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Testament {
    Old,
    New,
}

/// Catalog lookup built from a parsed reference and its book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageQuery {
    pub book_code: String,
    /// Collection (DBP "dam_id") for the book's testament.
    pub collection_id: String,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
}

/// One video segment returned for a passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoItem {
    pub book_id: String,
    pub book_title: String,
    pub chapter_start: u32,
    pub chapter_end: Option<u32>,
    pub verse_start: u32,
    pub verse_end: Option<u32>,
    pub segment_order: u32,
    /// Fully qualified media URL.
    pub media_path: String,
    pub title: String,
}

/// Normalized outcome of a passage lookup.
///
/// Adapters branch on `videos.len()` and `available`:
/// - `available == None`: nothing recognizable in the input
/// - `available == Some(false)` with no videos: book not yet translated
/// - otherwise: found (or nothing found for a translated book)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassageResult {
    pub book: Option<String>,
    pub available: Option<bool>,
    pub videos: Vec<VideoItem>,
}

impl PassageResult {
    /// Result for input with no recognizable reference.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Result for an identified book with no videos to show.
    pub fn book_only(title: impl Into<String>, available: bool) -> Self {
        Self {
            book: Some(title.into()),
            available: Some(available),
            videos: Vec::new(),
        }
    }
}

/// Resolver result plus whether any reference or book alias was recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub result: PassageResult,
    pub valid_match: bool,
}
