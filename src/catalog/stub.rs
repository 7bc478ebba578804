//! In-memory catalog for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::{CatalogClient, CatalogVideo};
use crate::common::error::{CatalogError, CatalogResult};
use crate::common::types::PassageQuery;

/// Catalog stub returning canned videos and recording queries.
#[derive(Default)]
pub struct StubCatalog {
    pub videos: Vec<CatalogVideo>,
    pub fail: bool,
    pub queries: Mutex<Vec<PassageQuery>>,
}

impl StubCatalog {
    pub fn with_videos(videos: Vec<CatalogVideo>) -> Self {
        Self {
            videos,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn video_paths(&self, query: &PassageQuery) -> CatalogResult<Vec<CatalogVideo>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(CatalogError::Status { status: 503 });
        }
        Ok(self.videos.clone())
    }
}

/// Single-verse catalog entry.
pub fn video(book_id: &str, chapter: u32, verse: u32, path: &str) -> CatalogVideo {
    CatalogVideo {
        book_id: book_id.to_string(),
        segment_order: 1,
        chapter_start: chapter,
        chapter_end: None,
        verse_start: verse,
        verse_end: None,
        title: format!("{} {}", book_id, chapter),
        path: path.to_string(),
    }
}
