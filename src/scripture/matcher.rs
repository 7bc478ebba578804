//! Citation recognition inside free-form chat text.
//!
//! The grammar is assembled from the book table:
//!
//! ```text
//! citation := book name-end locator
//! book     := ordinal name | name
//! ordinal  := (word | roman | digit-suffix) (sep | ws+) | digit ws* "-"? ws*
//! name-end := "." | word boundary
//! locator  := range ((","|";") range)*
//! range    := segment (dash segment)?
//! segment  := num ((":"|".") num)?
//! num      := 1-3 digits, not followed by another digit
//! ```
//!
//! A locator may not be followed by a further `:`/`.` and digit.
//!
//! Each book's names are ordered longest first, and the whole citation sits in
//! an atomic group, so once "2 Corinthians 5:17" matches the engine cannot back
//! off to "2 Co" or to a shorter locator. The anchor check runs after the
//! atomic group and rejects citations that are already link text.

use fancy_regex::Regex;
use tracing::warn;

use crate::common::error::RegistryError;
use crate::scripture::books::{BookRecord, BookRegistry};

/// Dash characters accepted between range endpoints.
const DASHES: &str = "\\-\u{2010}\u{2011}\u{2012}\u{2013}\u{2014}\u{2015}";

/// A citation found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSpan {
    pub text: String,
    /// Byte offset of the span in the searched text.
    pub start: usize,
    pub end: usize,
}

/// Alternatives for one book in the citation grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BookAlternative {
    ordinal: Option<u8>,
    /// Names without ordinal prefix or trailing period, longest first.
    names: Vec<String>,
}

impl BookAlternative {
    fn from_record(record: &BookRecord) -> Self {
        let ordinal = record.ordinal();
        let mut names: Vec<String> = Vec::new();

        for alias in record.aliases {
            let mut name = alias.trim_end_matches('.');
            if let Some(n) = ordinal {
                let digit = char::from(b'0' + n);
                if let Some(rest) = name.strip_prefix(digit) {
                    name = rest.trim_start_matches([' ', '-']);
                }
            }
            if !name.is_empty() && !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }

        // Stable, so equal-length names keep table order.
        names.sort_by(|a, b| b.len().cmp(&a.len()));

        Self { ordinal, names }
    }

    fn pattern(&self) -> String {
        let names = self
            .names
            .iter()
            .map(|name| name.split(' ').collect::<Vec<_>>().join(r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        match self.ordinal {
            Some(n) => format!("{}(?:{})", ordinal_pattern(n), names),
            None => format!("(?:{})", names),
        }
    }
}

/// Accepted spellings of a book number, with the separator that follows.
fn ordinal_pattern(n: u8) -> String {
    let (word, suffixed, roman) = match n {
        1 => ("first", "1st", "i"),
        2 => ("second", "2nd", "ii"),
        _ => ("third", "3rd", "iii"),
    };
    format!(
        r"(?:(?:{}|{}|{})(?:\s*-\s*|\s+)|{}\s*-?\s*)",
        word, suffixed, roman, n
    )
}

fn locator_pattern() -> String {
    let num = r"\d{1,3}(?!\d)";
    let segment = format!(r"{num}(?:\s*[:.]\s*{num})?");
    let range = format!(r"{segment}(?:\s*[{DASHES}]\s*{segment})?");
    // A dangling ":1234" glued to the last segment voids the whole locator.
    format!(r"{range}(?:\s*[,;]\s*{range})*(?![:.]\d)")
}

/// Finds the first scripture citation in a message.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher {
    pattern: Regex,
}

impl ReferenceMatcher {
    /// Compile the citation grammar for every book in the registry.
    pub fn new(registry: &BookRegistry) -> Result<Self, RegistryError> {
        // Numbered books first so "1 John" is tried as a unit.
        let mut alternatives: Vec<BookAlternative> = registry
            .books()
            .iter()
            .map(BookAlternative::from_record)
            .collect();
        alternatives.sort_by_key(|alt| alt.ordinal.is_none());

        let books = alternatives
            .iter()
            .map(BookAlternative::pattern)
            .collect::<Vec<_>>()
            .join("|");

        let source = format!(
            r"(?i)\b(?>(?:{books})(?:\.|\b)\s*{locator})(?!\s*</a\s*>)",
            books = books,
            locator = locator_pattern(),
        );

        let pattern = Regex::new(&source).map_err(|e| RegistryError::Pattern {
            message: e.to_string(),
        })?;

        Ok(Self { pattern })
    }

    /// Return the first citation in `text`, if any.
    pub fn find_reference(&self, text: &str) -> Option<MatchedSpan> {
        match self.pattern.find(text) {
            Ok(found) => found.map(|m| MatchedSpan {
                text: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            }),
            Err(e) => {
                warn!("Citation match error: {}", e);
                None
            }
        }
    }

    pub fn contains_reference(&self, text: &str) -> bool {
        self.find_reference(text).is_some()
    }
}
