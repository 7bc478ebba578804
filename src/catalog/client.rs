//! Digital Bible Platform video catalog client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::common::error::{CatalogError, CatalogResult};
use crate::common::types::{PassageQuery, VideoItem};
use crate::config::types::CatalogConfig;

/// Lookup of video segments for a passage.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the video segments covering a passage. An empty list means the
    /// catalog has nothing for it.
    async fn video_paths(&self, query: &PassageQuery) -> CatalogResult<Vec<CatalogVideo>>;
}

/// One entry of the catalog's `video/videopath` response.
///
/// The catalog sends numbers as JSON numbers or as strings depending on the
/// field and collection, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogVideo {
    pub book_id: String,
    #[serde(deserialize_with = "number")]
    pub segment_order: u32,
    #[serde(deserialize_with = "number")]
    pub chapter_start: u32,
    #[serde(default, deserialize_with = "optional_number")]
    pub chapter_end: Option<u32>,
    #[serde(deserialize_with = "number")]
    pub verse_start: u32,
    #[serde(default, deserialize_with = "optional_number")]
    pub verse_end: Option<u32>,
    #[serde(default)]
    pub title: String,
    /// Path relative to the video host.
    pub path: String,
}

impl CatalogVideo {
    /// Build the outbound item, qualifying the relative path with `video_base_url`.
    pub fn into_item(self, book_title: &str, video_base_url: &str) -> VideoItem {
        VideoItem {
            media_path: format!("{}{}", video_base_url, self.path),
            book_id: self.book_id,
            book_title: book_title.to_string(),
            chapter_start: self.chapter_start,
            chapter_end: self.chapter_end,
            verse_start: self.verse_start,
            verse_end: self.verse_end,
            segment_order: self.segment_order,
            title: self.title,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u32),
    Text(String),
}

fn number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{}'", s))),
    }
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// HTTP client for the catalog's JSON API.
#[derive(Debug, Clone)]
pub struct DbpCatalog {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DbpCatalog {
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Query string for a passage lookup.
    fn query_params(&self, query: &PassageQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", self.api_key.clone()),
            ("book_id", query.book_code.clone()),
            ("dam_id", query.collection_id.clone()),
            ("encoding", "mp4".to_string()),
            ("v", "2".to_string()),
        ];
        if let Some(chapter) = query.chapter {
            params.push(("chapter_id", chapter.to_string()));
        }
        if let Some(verse) = query.verse {
            params.push(("verse_id", verse.to_string()));
        }
        params
    }
}

#[async_trait]
impl CatalogClient for DbpCatalog {
    async fn video_paths(&self, query: &PassageQuery) -> CatalogResult<Vec<CatalogVideo>> {
        let url = format!("{}video/videopath", self.base_url);
        debug!(
            "Catalog lookup: book={} collection={} chapter={:?} verse={:?}",
            query.book_code, query.collection_id, query.chapter, query.verse
        );

        let response = self
            .http
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_videos(&body)
    }
}

/// Decode a `video/videopath` body. A blank body means no videos.
pub fn parse_videos(body: &str) -> CatalogResult<Vec<CatalogVideo>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body).map_err(|e| CatalogError::Decode {
        message: e.to_string(),
    })
}
