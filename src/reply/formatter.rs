//! Reply formatting for chat platforms.
//!
//! Handles placeholder substitution in reply templates.
//! Supports placeholders: %user, %book, %passage, %title, %url, %count

use crate::common::types::{PassageResult, VideoItem};

/// Credit line shown with every video reply.
pub const ATTRIBUTION: &str =
    "Provided by the Deaf Bible Society, Deaf Missions & Faith Comes by Hearing.";

/// Telegram `sendMessage` text limit.
pub const TELEGRAM_MAX_LEN: usize = 4096;

/// Messenger text message limit.
pub const MESSENGER_MAX_LEN: usize = 2000;

pub const DEFAULT_GREETING_FORMAT: &str = "Hello <b>%user</b>!  It is good to meet you!  \
     I can help you find Bible passages in American Sign Language.  Are you ready to start?";

pub const DEFAULT_HTML_VIDEO_FORMAT: &str = "<b>%passage</b> %title\n%url";
pub const DEFAULT_PLAIN_VIDEO_FORMAT: &str = "%passage %title\n%url";

pub const DEFAULT_LIST_HEADER_FORMAT: &str = "I found %count videos for %book:";

pub const DEFAULT_NOT_AVAILABLE_FORMAT: &str =
    "Sorry, %book is not yet available in American Sign Language.";

pub const DEFAULT_NOT_FOUND_FORMAT: &str =
    "Sorry, I could not find a Bible passage in that.  Try something like John 3:16.";

pub const DEFAULT_CATALOG_TROUBLE_FORMAT: &str =
    "Sorry, I could not find any videos for %book right now.  Please try again later.";

/// Reply template that substitutes placeholders.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    format: String,
}

impl MessageFormatter {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    /// Format a reply with the given context.
    ///
    /// Substitutes the following placeholders:
    /// - `%user` - Sender's username
    /// - `%book` - Book title
    /// - `%passage` - Passage label such as "John 3:16-18"
    /// - `%title` - Video title from the catalog
    /// - `%url` - Video URL
    /// - `%count` - Number of videos
    pub fn format(&self, ctx: &ReplyContext) -> String {
        self.format
            .replace("%user", &ctx.user)
            .replace("%book", &ctx.book)
            .replace("%passage", &ctx.passage)
            .replace("%title", &ctx.title)
            .replace("%url", &ctx.url)
            .replace("%count", &ctx.count.to_string())
    }
}

/// Values available to a reply template.
#[derive(Debug, Clone, Default)]
pub struct ReplyContext {
    pub user: String,
    pub book: String,
    pub passage: String,
    pub title: String,
    pub url: String,
    pub count: usize,
}

impl ReplyContext {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn for_book(book: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            ..Self::default()
        }
    }

    pub fn for_video(video: &VideoItem) -> Self {
        Self {
            book: video.book_title.clone(),
            passage: passage_label(video),
            title: video.title.clone(),
            url: video.media_path.clone(),
            ..Self::default()
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Escape every text value for Telegram's HTML parse mode.
    fn escaped(self) -> Self {
        Self {
            user: escape_html(&self.user),
            book: escape_html(&self.book),
            passage: escape_html(&self.passage),
            title: escape_html(&self.title),
            url: escape_html(&self.url),
            count: self.count,
        }
    }
}

/// How a platform renders reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// Telegram `parse_mode=HTML`.
    Html,
    Plain,
}

/// Which reply a lookup result calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Nothing recognizable in the message.
    NotFound,
    /// Book recognized but not yet translated.
    NotAvailable,
    /// Translated book, but the catalog returned nothing.
    NoVideos,
    Single,
    List,
}

impl ReplyKind {
    pub fn of(result: &PassageResult) -> Self {
        match (result.videos.len(), result.available) {
            (0, None) => ReplyKind::NotFound,
            (0, Some(false)) => ReplyKind::NotAvailable,
            (0, Some(true)) => ReplyKind::NoVideos,
            (1, _) => ReplyKind::Single,
            _ => ReplyKind::List,
        }
    }
}

/// Builds the reply text for a lookup result on one platform.
#[derive(Debug, Clone)]
pub struct ReplyComposer {
    markup: Markup,
    greeting: MessageFormatter,
    video: MessageFormatter,
    list_header: MessageFormatter,
    not_available: MessageFormatter,
    not_found: MessageFormatter,
    catalog_trouble: MessageFormatter,
}

impl ReplyComposer {
    pub fn new(markup: Markup) -> Self {
        let video = match markup {
            Markup::Html => DEFAULT_HTML_VIDEO_FORMAT,
            Markup::Plain => DEFAULT_PLAIN_VIDEO_FORMAT,
        };
        Self {
            markup,
            greeting: MessageFormatter::new(DEFAULT_GREETING_FORMAT),
            video: MessageFormatter::new(video),
            list_header: MessageFormatter::new(DEFAULT_LIST_HEADER_FORMAT),
            not_available: MessageFormatter::new(DEFAULT_NOT_AVAILABLE_FORMAT),
            not_found: MessageFormatter::new(DEFAULT_NOT_FOUND_FORMAT),
            catalog_trouble: MessageFormatter::new(DEFAULT_CATALOG_TROUBLE_FORMAT),
        }
    }

    pub fn telegram() -> Self {
        Self::new(Markup::Html)
    }

    pub fn messenger() -> Self {
        Self::new(Markup::Plain)
    }

    fn render(&self, formatter: &MessageFormatter, ctx: ReplyContext) -> String {
        match self.markup {
            Markup::Html => formatter.format(&ctx.escaped()),
            Markup::Plain => formatter.format(&ctx),
        }
    }

    /// Welcome message for `/start`.
    pub fn greeting(&self, user: &str) -> String {
        self.render(&self.greeting, ReplyContext::for_user(user))
    }

    /// One line block for a single video.
    pub fn video(&self, video: &VideoItem) -> String {
        self.render(&self.video, ReplyContext::for_video(video))
    }

    /// Caption sent after a video attachment.
    pub fn caption(&self, video: &VideoItem) -> String {
        format!("{}\n\n\"{}\"", passage_label(video), ATTRIBUTION)
    }

    /// Full reply for a lookup result.
    pub fn compose(&self, result: &PassageResult) -> String {
        let book = result.book.clone().unwrap_or_default();
        match ReplyKind::of(result) {
            ReplyKind::NotFound => self.render(&self.not_found, ReplyContext::default()),
            ReplyKind::NotAvailable => {
                self.render(&self.not_available, ReplyContext::for_book(book))
            }
            ReplyKind::NoVideos => {
                self.render(&self.catalog_trouble, ReplyContext::for_book(book))
            }
            ReplyKind::Single | ReplyKind::List => {
                let mut lines = Vec::with_capacity(result.videos.len() + 2);
                if result.videos.len() > 1 {
                    lines.push(self.render(
                        &self.list_header,
                        ReplyContext::for_book(book).with_count(result.videos.len()),
                    ));
                }
                lines.extend(result.videos.iter().map(|v| self.video(v)));
                lines.push(format!("\"{}\"", ATTRIBUTION));
                lines.join("\n\n")
            }
        }
    }
}

/// Human label for the passage a video covers.
///
/// A `verse_start` of 0 marks a whole-chapter video.
pub fn passage_label(video: &VideoItem) -> String {
    let book = &video.book_title;
    let chapter = video.chapter_start;
    let chapter_end = video.chapter_end.filter(|&c| c != chapter);

    if video.verse_start == 0 {
        return match chapter_end {
            Some(end) => format!("{} {}-{}", book, chapter, end),
            None => format!("{} {}", book, chapter),
        };
    }

    let verse = video.verse_start;
    match (chapter_end, video.verse_end) {
        (Some(end_chapter), Some(end_verse)) => {
            format!("{} {}:{}-{}:{}", book, chapter, verse, end_chapter, end_verse)
        }
        (Some(end_chapter), None) => format!("{} {}:{}-{}", book, chapter, verse, end_chapter),
        (None, Some(end_verse)) if end_verse != verse => {
            format!("{} {}:{}-{}", book, chapter, verse, end_verse)
        }
        (None, _) => format!("{} {}:{}", book, chapter, verse),
    }
}

/// Capitalize the first letter of each word and lowercase the rest.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Find the last UTF-8 char boundary at or before `byte_index` in `s`.
fn floor_char_boundary(s: &str, byte_index: usize) -> usize {
    if byte_index >= s.len() {
        return s.len();
    }
    let mut i = byte_index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Split a reply into chunks that fit within the max length (in bytes).
///
/// Prefers line breaks, then spaces. Never splits in the middle of a
/// multi-byte UTF-8 character.
pub fn split_message(message: &str, max_len: usize) -> Vec<String> {
    if message.len() <= max_len {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = message;

    while !remaining.is_empty() {
        remaining = remaining.trim_start();
        if remaining.is_empty() {
            break;
        }

        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let split_at = floor_char_boundary(remaining, max_len);

        // max_len smaller than the first character: take one character.
        if split_at == 0 {
            let first_char_end = remaining
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(remaining.len());
            chunks.push(remaining[..first_char_end].to_string());
            remaining = &remaining[first_char_end..];
            continue;
        }

        let chunk = &remaining[..split_at];
        let break_at = chunk
            .rfind('\n')
            .filter(|&i| i > 0)
            .or_else(|| chunk.rfind(' ').filter(|&i| i > 0));

        match break_at {
            Some(idx) => {
                chunks.push(remaining[..idx].trim_end().to_string());
                remaining = &remaining[idx + 1..];
            }
            None => {
                chunks.push(chunk.to_string());
                remaining = &remaining[split_at..];
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(chapter: u32, chapter_end: Option<u32>, verse: u32, verse_end: Option<u32>) -> VideoItem {
        VideoItem {
            book_id: "John".to_string(),
            book_title: "John".to_string(),
            chapter_start: chapter,
            chapter_end,
            verse_start: verse,
            verse_end,
            segment_order: 1,
            media_path: "http://video.dbt.io/john/3.mp4".to_string(),
            title: "God So Loved the World".to_string(),
        }
    }

    #[test]
    fn test_basic_format() {
        let formatter = MessageFormatter::new("%passage: %url");
        let ctx = ReplyContext::for_video(&video(3, None, 16, None));

        assert_eq!(formatter.format(&ctx), "John 3:16: http://video.dbt.io/john/3.mp4");
    }

    #[test]
    fn test_count_placeholder() {
        let formatter = MessageFormatter::new(DEFAULT_LIST_HEADER_FORMAT);
        let ctx = ReplyContext::for_book("Ruth").with_count(4);

        assert_eq!(formatter.format(&ctx), "I found 4 videos for Ruth:");
    }

    #[test]
    fn test_passage_labels() {
        assert_eq!(passage_label(&video(3, None, 16, None)), "John 3:16");
        assert_eq!(passage_label(&video(3, None, 16, Some(16))), "John 3:16");
        assert_eq!(passage_label(&video(3, Some(3), 16, Some(21))), "John 3:16-21");
        assert_eq!(passage_label(&video(3, Some(4), 16, Some(2))), "John 3:16-4:2");
        assert_eq!(passage_label(&video(3, None, 0, None)), "John 3");
        assert_eq!(passage_label(&video(3, Some(5), 0, None)), "John 3-5");
    }

    #[test]
    fn test_reply_kind_branches() {
        assert_eq!(ReplyKind::of(&PassageResult::empty()), ReplyKind::NotFound);
        assert_eq!(
            ReplyKind::of(&PassageResult::book_only("Leviticus", false)),
            ReplyKind::NotAvailable
        );
        assert_eq!(
            ReplyKind::of(&PassageResult::book_only("John", true)),
            ReplyKind::NoVideos
        );

        let mut result = PassageResult::book_only("John", true);
        result.videos.push(video(3, None, 16, None));
        assert_eq!(ReplyKind::of(&result), ReplyKind::Single);
        result.videos.push(video(3, None, 17, None));
        assert_eq!(ReplyKind::of(&result), ReplyKind::List);
    }

    #[test]
    fn test_greeting_escapes_username() {
        let composer = ReplyComposer::telegram();
        let text = composer.greeting("a<b>");

        assert!(text.starts_with("Hello <b>a&lt;b&gt;</b>!"));
        assert!(text.contains("American Sign Language"));
    }

    #[test]
    fn test_compose_not_available() {
        let composer = ReplyComposer::messenger();
        let text = composer.compose(&PassageResult::book_only("Leviticus", false));

        assert_eq!(text, "Sorry, Leviticus is not yet available in American Sign Language.");
    }

    #[test]
    fn test_compose_not_found() {
        let text = ReplyComposer::telegram().compose(&PassageResult::empty());
        assert!(text.contains("could not find a Bible passage"));
    }

    #[test]
    fn test_compose_list_has_header_and_attribution() {
        let mut result = PassageResult::book_only("John", true);
        result.videos.push(video(3, None, 16, None));
        result.videos.push(video(3, None, 17, Some(21)));

        let text = ReplyComposer::telegram().compose(&result);

        assert!(text.starts_with("I found 2 videos for John:"));
        assert!(text.contains("<b>John 3:16</b> God So Loved the World"));
        assert!(text.contains("<b>John 3:17-21</b>"));
        assert!(text.ends_with(&format!("\"{}\"", ATTRIBUTION)));
    }

    #[test]
    fn test_caption() {
        let caption = ReplyComposer::messenger().caption(&video(3, None, 16, None));
        assert_eq!(
            caption,
            "John 3:16\n\n\"Provided by the Deaf Bible Society, Deaf Missions & Faith Comes by Hearing.\""
        );
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("the song of solomon"), "The Song Of Solomon");
        assert_eq!(capitalize_words("JOHN 3:16"), "John 3:16");
        assert_eq!(capitalize_words("(god) so  loved"), "(God) So  Loved");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Q&A <tag>"), "Q&amp;A &lt;tag&gt;");
    }

    #[test]
    fn test_split_message_short() {
        let chunks = split_message("Hello world", 50);
        assert_eq!(chunks, vec!["Hello world"]);
    }

    #[test]
    fn test_split_message_prefers_newline() {
        let chunks = split_message("John 3:16\nhttp://a b\nJohn 3:17", 20);
        assert_eq!(chunks, vec!["John 3:16", "http://a b\nJohn 3:17"]);
    }

    #[test]
    fn test_split_message_on_space() {
        let chunks = split_message("Hello beautiful world", 15);
        assert_eq!(chunks, vec!["Hello", "beautiful world"]);
    }

    #[test]
    fn test_split_message_no_space() {
        let chunks = split_message("HelloBeautifulWorld", 10);
        assert_eq!(chunks, vec!["HelloBeaut", "ifulWorld"]);
    }

    #[test]
    fn test_split_message_multibyte_utf8() {
        // max_len=4 lands inside 'é'
        let chunks = split_message("café rest", 4);
        assert_eq!(chunks, vec!["caf", "é", "rest"]);
    }

    #[test]
    fn test_split_message_respects_platform_limit() {
        let long = "John 3:16 ".repeat(500);
        for chunk in split_message(&long, MESSENGER_MAX_LEN) {
            assert!(chunk.len() <= MESSENGER_MAX_LEN);
        }
    }
}
