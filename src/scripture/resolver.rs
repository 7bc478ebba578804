//! Passage resolution: free text in, catalog videos out.
//!
//! Every failure is recovered here. Callers get a [`PassageResult`] and branch
//! on `available` and `videos`, never on an error.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CatalogClient;
use crate::common::error::{RegistryError, ResolveError};
use crate::common::types::{PassageQuery, PassageResult, SearchOutcome, Testament};
use crate::config::types::CatalogConfig;
use crate::scripture::books::{BookRecord, BookRegistry};
use crate::scripture::matcher::ReferenceMatcher;
use crate::scripture::reference;

/// Chapter used when only a book name is given to [`PassageResolver::resolve_book`].
pub const DEFAULT_CHAPTER: u32 = 1;

/// Catalog collections and media host for building queries and links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSettings {
    pub old_testament_collection: String,
    pub new_testament_collection: String,
    /// Prefix for the relative paths the catalog returns.
    pub video_base_url: String,
}

impl CollectionSettings {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            old_testament_collection: config.old_testament_collection.clone(),
            new_testament_collection: config.new_testament_collection.clone(),
            video_base_url: config.video_url.clone(),
        }
    }

    fn collection_for(&self, testament: Testament) -> &str {
        match testament {
            Testament::Old => &self.old_testament_collection,
            Testament::New => &self.new_testament_collection,
        }
    }
}

/// Resolves citations and book names to catalog videos.
pub struct PassageResolver {
    registry: Arc<BookRegistry>,
    matcher: ReferenceMatcher,
    catalog: Arc<dyn CatalogClient>,
    settings: CollectionSettings,
}

impl PassageResolver {
    pub fn new(
        registry: Arc<BookRegistry>,
        catalog: Arc<dyn CatalogClient>,
        settings: CollectionSettings,
    ) -> Result<Self, RegistryError> {
        let matcher = ReferenceMatcher::new(&registry)?;
        Ok(Self {
            registry,
            matcher,
            catalog,
            settings,
        })
    }

    /// Whether a message contains a citation.
    pub fn contains_reference(&self, text: &str) -> bool {
        self.matcher.contains_reference(text)
    }

    /// Resolve the first citation in `text`, or the whole text as a book name.
    pub async fn resolve(&self, text: &str) -> PassageResult {
        self.search(text).await.result
    }

    /// Like [`resolve`](Self::resolve), also reporting whether anything in
    /// the input was recognized.
    pub async fn search(&self, text: &str) -> SearchOutcome {
        match self.try_resolve(text).await {
            Ok(result) => SearchOutcome {
                result,
                valid_match: true,
            },
            Err(e) => {
                debug!("Resolve failed ({}): {}", e.kind(), e);
                SearchOutcome {
                    result: PassageResult::empty(),
                    valid_match: false,
                }
            }
        }
    }

    /// Resolve a bare book name, defaulting to its first chapter.
    pub async fn resolve_book(&self, alias: &str, chapter: Option<u32>) -> PassageResult {
        let Some(book) = self.registry.find_by_alias(alias) else {
            let e = ResolveError::UnknownBook {
                alias: alias.to_string(),
            };
            debug!("Resolve failed ({}): {}", e.kind(), e);
            return PassageResult::empty();
        };

        self.lookup(book, Some(chapter.unwrap_or(DEFAULT_CHAPTER)), None)
            .await
    }

    async fn try_resolve(&self, text: &str) -> Result<PassageResult, ResolveError> {
        if let Some(span) = self.matcher.find_reference(text) {
            let parsed = reference::parse(&span.text);
            let book = self.registry.find_by_alias(&parsed.book_alias).ok_or_else(|| {
                ResolveError::UnknownBook {
                    alias: parsed.book_alias.clone(),
                }
            })?;

            debug!("Matched '{}' as {}", span.text, book.title);
            return Ok(self
                .lookup(book, parsed.chapter_start, parsed.verse_start)
                .await);
        }

        // No citation: the whole input may still name a book.
        match self.registry.find_by_alias(text) {
            Some(book) => Ok(self.lookup(book, None, None).await),
            None => Err(ResolveError::NoReferenceFound {
                input: text.to_string(),
            }),
        }
    }

    /// Query the catalog for a known book, recovering catalog failures.
    async fn lookup(
        &self,
        book: &BookRecord,
        chapter: Option<u32>,
        verse: Option<u32>,
    ) -> PassageResult {
        let query = self.build_query(book, chapter, verse);

        match self.catalog.video_paths(&query).await {
            Ok(videos) => {
                info!(
                    "Catalog returned {} video(s) for {} (chapter {:?}, verse {:?})",
                    videos.len(),
                    book.title,
                    query.chapter,
                    query.verse
                );
                PassageResult {
                    book: Some(book.title.to_string()),
                    available: Some(book.available),
                    videos: videos
                        .into_iter()
                        .map(|v| v.into_item(book.title, &self.settings.video_base_url))
                        .collect(),
                }
            }
            Err(source) => {
                let e = ResolveError::CatalogUnavailable {
                    book: book.title.to_string(),
                    source,
                };
                warn!("Resolve failed ({}): {}", e.kind(), e);
                // Availability still comes from the registry, not null, so a
                // translated book gets the "try again later" reply.
                PassageResult::book_only(book.title, book.available)
            }
        }
    }

    pub fn build_query(
        &self,
        book: &BookRecord,
        chapter: Option<u32>,
        verse: Option<u32>,
    ) -> PassageQuery {
        PassageQuery {
            book_code: book.code.to_string(),
            collection_id: self.settings.collection_for(book.testament).to_string(),
            chapter,
            // A verse without a chapter has nothing to anchor to.
            verse: chapter.and(verse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::stub::{video, StubCatalog};

    fn settings() -> CollectionSettings {
        CollectionSettings {
            old_testament_collection: "OT_DAM".to_string(),
            new_testament_collection: "NT_DAM".to_string(),
            video_base_url: "http://video.dbt.io/".to_string(),
        }
    }

    fn resolver(catalog: Arc<StubCatalog>) -> PassageResolver {
        let registry = Arc::new(BookRegistry::new().unwrap());
        PassageResolver::new(registry, catalog, settings()).unwrap()
    }

    #[tokio::test]
    async fn test_citation_builds_query_and_links() {
        let catalog = Arc::new(StubCatalog::with_videos(vec![video(
            "John",
            3,
            16,
            "asl/John_3_16.mp4",
        )]));
        let resolver = resolver(catalog.clone());

        let result = resolver.resolve("what does John 3:16 say?").await;
        assert_eq!(result.book.as_deref(), Some("John"));
        assert_eq!(result.available, Some(true));
        assert_eq!(result.videos.len(), 1);
        assert_eq!(result.videos[0].book_title, "John");
        assert_eq!(
            result.videos[0].media_path,
            "http://video.dbt.io/asl/John_3_16.mp4"
        );

        let queries = catalog.queries.lock().unwrap();
        assert_eq!(
            queries[0],
            PassageQuery {
                book_code: "John".to_string(),
                collection_id: "NT_DAM".to_string(),
                chapter: Some(3),
                verse: Some(16),
            }
        );
    }

    #[tokio::test]
    async fn test_old_testament_uses_old_collection() {
        let catalog = Arc::new(StubCatalog::default());
        let resolver = resolver(catalog.clone());

        resolver.resolve("II Kings 2:11").await;
        let queries = catalog.queries.lock().unwrap();
        assert_eq!(queries[0].book_code, "2Kgs");
        assert_eq!(queries[0].collection_id, "OT_DAM");
    }

    #[tokio::test]
    async fn test_unavailable_book_with_no_videos() {
        let resolver = resolver(Arc::new(StubCatalog::default()));

        let result = resolver.resolve("leviticus 1:1").await;
        assert_eq!(
            result,
            PassageResult {
                book: Some("Leviticus".to_string()),
                available: Some(false),
                videos: Vec::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_gibberish_is_empty_result() {
        let catalog = Arc::new(StubCatalog::default());
        let resolver = resolver(catalog.clone());

        let outcome = resolver.search("gibberish text").await;
        assert_eq!(outcome.result, PassageResult::empty());
        assert_eq!(outcome.result.available, None);
        assert!(!outcome.valid_match);
        assert!(catalog.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_book_name_alone_queries_whole_book() {
        let catalog = Arc::new(StubCatalog::default());
        let resolver = resolver(catalog.clone());

        let outcome = resolver.search("  Genesis ").await;
        assert!(outcome.valid_match);
        assert_eq!(outcome.result.book.as_deref(), Some("Genesis"));

        let queries = catalog.queries.lock().unwrap();
        assert_eq!(queries[0].book_code, "Gen");
        assert_eq!(queries[0].chapter, None);
        assert_eq!(queries[0].verse, None);
    }

    #[tokio::test]
    async fn test_resolve_book_defaults_to_first_chapter() {
        let catalog = Arc::new(StubCatalog::default());
        let resolver = resolver(catalog.clone());

        let result = resolver.resolve_book("1 cor", None).await;
        assert_eq!(result.book.as_deref(), Some("1 Corinthians"));
        resolver.resolve_book("mark", Some(4)).await;

        let queries = catalog.queries.lock().unwrap();
        assert_eq!(queries[0].chapter, Some(DEFAULT_CHAPTER));
        assert_eq!(queries[1].chapter, Some(4));
    }

    #[tokio::test]
    async fn test_resolve_book_unknown_alias() {
        let catalog = Arc::new(StubCatalog::default());
        let resolver = resolver(catalog.clone());

        let result = resolver.resolve_book("hezekiah", None).await;
        assert_eq!(result, PassageResult::empty());
        assert!(catalog.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_is_recovered() {
        let resolver = resolver(Arc::new(StubCatalog::failing()));

        let outcome = resolver.search("Matthew 28:16-20").await;
        assert!(outcome.valid_match);
        assert_eq!(outcome.result.book.as_deref(), Some("Matthew"));
        assert_eq!(outcome.result.available, Some(true));
        assert!(outcome.result.videos.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let catalog = Arc::new(StubCatalog::with_videos(vec![
            video("Matt", 28, 16, "asl/Matt_28_16.mp4"),
            video("Matt", 28, 18, "asl/Matt_28_18.mp4"),
        ]));
        let resolver = resolver(catalog);

        let first = resolver.resolve("Matthew 28:16-20").await;
        let second = resolver.resolve("Matthew 28:16-20").await;
        assert_eq!(first, second);
        for item in &second.videos {
            assert_eq!(item.media_path.matches("http://video.dbt.io/").count(), 1);
        }
    }

    #[test]
    fn test_list_resolves_first_item() {
        let catalog = Arc::new(StubCatalog::default());
        let resolver = resolver(catalog.clone());

        tokio_test::block_on(resolver.resolve("read Romans 8:28, 31 today"));
        let queries = catalog.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].book_code, "Rom");
        assert_eq!(queries[0].chapter, Some(8));
        assert_eq!(queries[0].verse, Some(28));
    }

    #[test]
    fn test_verse_needs_chapter() {
        let resolver = resolver(Arc::new(StubCatalog::default()));
        let book = resolver.registry.find_by_alias("john").unwrap();

        let query = resolver.build_query(book, None, Some(3));
        assert_eq!(query.verse, None);
    }
}
