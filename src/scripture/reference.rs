//! Decomposition of a citation into book, chapter and verse parts.

/// Characters that separate the two ends of a range.
const DASHES: [char; 7] = ['-', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}'];

/// A citation split into its parts. Absent parts mean "unbounded".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReference {
    /// The text that was parsed.
    pub raw_text: String,
    /// Book name as written, including any ordinal prefix.
    pub book_alias: String,
    pub chapter_start: Option<u32>,
    pub chapter_end: Option<u32>,
    pub verse_start: Option<u32>,
    pub verse_end: Option<u32>,
}

/// Split a citation such as `"1 John 3:16-4:2, 7"` into its parts.
///
/// Only the first sub-reference of a comma or semicolon list is read. Range
/// ends are passed through as written, even when they run backwards.
pub fn parse(span: &str) -> ParsedReference {
    let raw = span.trim();
    let book_end = book_end(raw);
    let book_alias = raw[..book_end].trim().to_string();

    let locator = &raw[book_end..];
    let first = locator.split([',', ';']).next().unwrap_or_default();

    let (head, tail) = match first.split_once(DASHES) {
        Some((head, tail)) => (head, Some(tail)),
        None => (first, None),
    };
    let (chapter_start, verse_start) = chapter_and_verse(head);

    let mut parsed = ParsedReference {
        raw_text: span.to_string(),
        book_alias,
        chapter_start,
        chapter_end: None,
        verse_start,
        verse_end: None,
    };

    if let Some(tail) = tail {
        if tail.contains([':', '.']) {
            let (chapter_end, verse_end) = chapter_and_verse(tail);
            parsed.chapter_end = chapter_end;
            parsed.verse_end = verse_end;
        } else if verse_start.is_some() {
            parsed.verse_end = number(tail);
        } else {
            parsed.chapter_end = number(tail);
        }
    }

    parsed
}

/// Byte index where the book name ends and the chapter begins.
///
/// A leading digit run is an ordinal ("1 John", "2nd Kings") only when a
/// letter follows it, possibly after spaces or a hyphen.
fn book_end(text: &str) -> usize {
    let mut start = 0;

    let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = text[digits..].trim_start_matches([' ', '\t', '-']);
        if rest.starts_with(|c: char| c.is_alphabetic()) {
            start = digits;
        } else {
            return 0;
        }
    }

    text[start..]
        .find(|c: char| c.is_ascii_digit())
        .map(|idx| start + idx)
        .unwrap_or(text.len())
}

/// `"3:16"` -> (3, 16), `"3"` -> (3, None).
fn chapter_and_verse(text: &str) -> (Option<u32>, Option<u32>) {
    match text.split_once([':', '.']) {
        Some((chapter, verse)) => (number(chapter), number(verse)),
        None => (number(text), None),
    }
}

fn number(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}
