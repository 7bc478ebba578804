//! JSON shape of the passage search API.

use serde::Serialize;

use crate::common::types::{SearchOutcome, VideoItem};
use crate::reply::{capitalize_words, passage_label};

/// One video in a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub book_id: String,
    pub book_name: String,
    pub chapter_start: u32,
    pub chapter_end: Option<u32>,
    pub verse_start: u32,
    pub verse_end: Option<u32>,
    pub full_passage: String,
    pub title: String,
    pub url: String,
}

impl From<&VideoItem> for SearchResult {
    fn from(video: &VideoItem) -> Self {
        Self {
            book_id: video.book_id.clone(),
            book_name: capitalize_words(&video.book_title),
            chapter_start: video.chapter_start,
            chapter_end: video.chapter_end,
            verse_start: video.verse_start,
            verse_end: video.verse_end,
            full_passage: capitalize_words(&passage_label(video)),
            title: capitalize_words(&video.title),
            url: video.media_path.clone(),
        }
    }
}

/// Body of `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub available: bool,
    pub valid_match: bool,
}

impl From<&SearchOutcome> for SearchResponse {
    fn from(outcome: &SearchOutcome) -> Self {
        Self {
            results: outcome.result.videos.iter().map(SearchResult::from).collect(),
            available: outcome.valid_match && outcome.result.available.unwrap_or(false),
            valid_match: outcome.valid_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::PassageResult;

    fn video() -> VideoItem {
        VideoItem {
            book_id: "Song".to_string(),
            book_title: "The Song of Solomon".to_string(),
            chapter_start: 2,
            chapter_end: None,
            verse_start: 1,
            verse_end: Some(7),
            segment_order: 1,
            media_path: "http://video.dbt.io/song/2.mp4".to_string(),
            title: "MY BELOVED".to_string(),
        }
    }

    #[test]
    fn test_result_fields_are_capitalized() {
        let result = SearchResult::from(&video());

        assert_eq!(result.book_name, "The Song Of Solomon");
        assert_eq!(result.full_passage, "The Song Of Solomon 2:1-7");
        assert_eq!(result.title, "My Beloved");
        assert_eq!(result.url, "http://video.dbt.io/song/2.mp4");
    }

    #[test]
    fn test_response_json_keys() {
        let mut result = PassageResult::book_only("The Song of Solomon", true);
        result.videos.push(video());
        let outcome = SearchOutcome {
            result,
            valid_match: true,
        };

        let json = serde_json::to_value(SearchResponse::from(&outcome)).unwrap();

        assert_eq!(json["validMatch"], true);
        assert_eq!(json["available"], true);
        assert_eq!(json["results"][0]["bookId"], "Song");
        assert_eq!(json["results"][0]["chapterStart"], 2);
        assert_eq!(json["results"][0]["chapterEnd"], serde_json::Value::Null);
        assert_eq!(json["results"][0]["verseEnd"], 7);
        assert_eq!(json["results"][0]["fullPassage"], "The Song Of Solomon 2:1-7");
    }

    #[test]
    fn test_no_match_is_unavailable() {
        let outcome = SearchOutcome {
            result: PassageResult::empty(),
            valid_match: false,
        };
        let response = SearchResponse::from(&outcome);

        assert!(response.results.is_empty());
        assert!(!response.available);
        assert!(!response.valid_match);
    }
}
