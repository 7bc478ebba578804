//! Canonical book table and alias lookup.
//!
//! Every accepted spelling of a book name lives in exactly one record's alias
//! list. Aliases are stored already normalized (lowercase, single spaces), so
//! lookups are a single hash probe after normalizing the input the same way.

use std::collections::HashMap;

use crate::common::error::RegistryError;
use crate::common::types::Testament;

use Testament::{New, Old};

/// One canonical book of the Bible.
#[derive(Debug, PartialEq, Eq)]
pub struct BookRecord {
    /// Display name.
    pub title: &'static str,
    /// Catalog book id.
    pub code: &'static str,
    pub testament: Testament,
    /// Whether a signed translation exists yet.
    pub available: bool,
    /// Accepted input spellings, longest forms first.
    pub aliases: &'static [&'static str],
}

impl BookRecord {
    /// Leading book number for "1 Samuel", "2 Corinthians", "3 John".
    pub fn ordinal(&self) -> Option<u8> {
        self.title
            .split_whitespace()
            .next()
            .and_then(|first| first.parse().ok())
    }
}

const fn book(
    title: &'static str,
    code: &'static str,
    testament: Testament,
    available: bool,
    aliases: &'static [&'static str],
) -> BookRecord {
    BookRecord {
        title,
        code,
        testament,
        available,
        aliases,
    }
}

/// The 66 books, in canonical order.
pub static BOOKS: [BookRecord; 66] = [
    book("Genesis", "Gen", Old, true, &["genesis", "gen", "gen."]),
    book("Exodus", "Exod", Old, false, &["exodus", "exod", "exo", "exo."]),
    book("Leviticus", "Lev", Old, false, &["leviticus", "lev", "lev."]),
    book("Numbers", "Num", Old, false, &["numbers", "num", "num."]),
    book("Deuteronomy", "Deut", Old, false, &["deuteronomy", "deut", "deu", "deu."]),
    book("Joshua", "Josh", Old, false, &["joshua", "josh", "jos", "jos."]),
    book("Judges", "Judg", Old, false, &["judges", "judge", "judg", "jdg", "jdg."]),
    book("Ruth", "Ruth", Old, true, &["ruth", "rut", "rut."]),
    book(
        "1 Samuel",
        "1Sam",
        Old,
        false,
        &["1 samuel", "1samuel", "1-samuel", "1 sam", "1sam", "1sa", "1sa."],
    ),
    book(
        "2 Samuel",
        "2Sam",
        Old,
        false,
        &["2 samuel", "2samuel", "2-samuel", "2 sam", "2sam", "2sa", "2sa."],
    ),
    book(
        "1 Kings",
        "1Kgs",
        Old,
        false,
        &["1 kings", "1kings", "1-kings", "1 kgs", "1kgs", "1ki", "1ki."],
    ),
    book(
        "2 Kings",
        "2Kgs",
        Old,
        false,
        &["2 kings", "2kings", "2-kings", "2 kgs", "2kgs", "2ki", "2ki."],
    ),
    book(
        "1 Chronicles",
        "1Chr",
        Old,
        false,
        &["1 chronicles", "1chronicles", "1-chronicles", "1 chr", "1chr", "1ch", "1ch."],
    ),
    book(
        "2 Chronicles",
        "2Chr",
        Old,
        false,
        &["2 chronicles", "2chronicles", "2-chronicles", "2 chr", "2chr", "2ch", "2ch."],
    ),
    book("Ezra", "Ezra", Old, false, &["ezra", "ezr", "ezr."]),
    book("Nehemiah", "Neh", Old, false, &["nehemiah", "neh", "neh."]),
    book("Esther", "Esth", Old, false, &["esther", "esth", "est", "est."]),
    book("Job", "Job", Old, false, &["job", "job."]),
    book(
        "Psalms",
        "Ps",
        Old,
        false,
        &["book of psalms", "psalms", "psalm", "psa", "psa.", "ps", "ps."],
    ),
    book("Proverbs", "Prov", Old, false, &["proverbs", "proverb", "prov", "pro", "pro."]),
    book(
        "Ecclesiastes",
        "Eccl",
        Old,
        false,
        &["ecclesiastes", "ecclesiaste", "eccl", "ecc", "ecc."],
    ),
    book(
        "The Song of Solomon",
        "Song",
        Old,
        false,
        &[
            "the song of solomon",
            "song of solomon",
            "song of songs",
            "solomon",
            "song",
            "sng",
            "sng.",
        ],
    ),
    book("Isaiah", "Isa", Old, false, &["isaiah", "isa", "isa."]),
    book("Jeremiah", "Jer", Old, false, &["jeremiah", "jer", "jer."]),
    book(
        "Lamentations",
        "Lam",
        Old,
        false,
        &["lamentations", "lamentation", "lam", "lam."],
    ),
    book("Ezekiel", "Ezek", Old, false, &["ezekiel", "ezek", "ezk", "ezk."]),
    book("Daniel", "Dan", Old, false, &["daniel", "dan", "dan."]),
    book("Hosea", "Hos", Old, false, &["hosea", "hos", "hos."]),
    book("Joel", "Joel", Old, false, &["joel", "jol", "jol."]),
    book("Amos", "Amos", Old, false, &["amos", "amo", "amo."]),
    book("Obadiah", "Obad", Old, false, &["obadiah", "obad", "oba", "oba."]),
    book("Jonah", "Jonah", Old, true, &["jonah", "jon", "jon."]),
    book("Micah", "Mic", Old, false, &["micah", "mic", "mic."]),
    book("Nahum", "Nah", Old, false, &["nahum", "nah", "nam", "nam."]),
    book("Habakkuk", "Hab", Old, false, &["habakkuk", "hab", "hab."]),
    book("Zephaniah", "Zeph", Old, false, &["zephaniah", "zeph", "zep", "zep."]),
    book("Haggai", "Hag", Old, false, &["haggai", "hag", "hag."]),
    book("Zechariah", "Zech", Old, false, &["zechariah", "zech", "zec", "zec."]),
    book("Malachi", "Mal", Old, false, &["malachi", "mal", "mal."]),
    book("Matthew", "Matt", New, true, &["matthew", "matt", "mat", "mat."]),
    book("Mark", "Mark", New, true, &["mark", "mrk", "mrk."]),
    book("Luke", "Luke", New, true, &["luke", "luk", "luk."]),
    book("John", "John", New, true, &["john", "jhn", "jhn."]),
    book("Acts", "Acts", New, true, &["acts", "act", "act."]),
    book("Romans", "Rom", New, true, &["romans", "rom", "rom."]),
    book(
        "1 Corinthians",
        "1Cor",
        New,
        true,
        &[
            "1 corinthians",
            "1corinthians",
            "1-corinthians",
            "1 corinthian",
            "1 cor",
            "1cor",
            "1co",
            "1co.",
        ],
    ),
    book(
        "2 Corinthians",
        "2Cor",
        New,
        true,
        &[
            "2 corinthians",
            "2corinthians",
            "2-corinthians",
            "2 corinthian",
            "2 cor",
            "2cor",
            "2co",
            "2co.",
        ],
    ),
    book("Galatians", "Gal", New, true, &["galatians", "galatian", "gal", "gal."]),
    book("Ephesians", "Eph", New, true, &["ephesians", "ephesian", "eph", "eph."]),
    book(
        "Philippians",
        "Phil",
        New,
        true,
        &["philippians", "phillipians", "phillippians", "philippian", "phil", "php", "php."],
    ),
    book("Colossians", "Col", New, true, &["colossians", "colossian", "col", "col."]),
    book(
        "1 Thessalonians",
        "1Thess",
        New,
        true,
        &[
            "1 thessalonians",
            "1thessalonians",
            "1-thessalonians",
            "1 thessalonian",
            "1 thess",
            "1th",
            "1th.",
        ],
    ),
    book(
        "2 Thessalonians",
        "2Thess",
        New,
        true,
        &[
            "2 thessalonians",
            "2thessalonians",
            "2-thessalonians",
            "2 thessalonian",
            "2 thess",
            "2th",
            "2th.",
        ],
    ),
    book(
        "1 Timothy",
        "1Tim",
        New,
        true,
        &["1 timothy", "1timothy", "1-timothy", "1 tim", "1tim", "1ti", "1ti."],
    ),
    book(
        "2 Timothy",
        "2Tim",
        New,
        true,
        &["2 timothy", "2timothy", "2-timothy", "2 tim", "2tim", "2ti", "2ti."],
    ),
    book("Titus", "Titus", New, true, &["titus", "tit", "tit."]),
    book("Philemon", "Phlm", New, true, &["philemon", "phlm", "phm", "phm."]),
    book("Hebrews", "Heb", New, true, &["hebrews", "heb", "heb."]),
    book("James", "Jas", New, true, &["james", "jame", "jas", "jas."]),
    book(
        "1 Peter",
        "1Pet",
        New,
        true,
        &["1 peter", "1peter", "1-peter", "1 pet", "1pet", "1pe", "1pe."],
    ),
    book(
        "2 Peter",
        "2Pet",
        New,
        true,
        &["2 peter", "2peter", "2-peter", "2 pet", "2pet", "2pe", "2pe."],
    ),
    book(
        "1 John",
        "1John",
        New,
        true,
        &["1 john", "1john", "1-john", "1jn", "1jn."],
    ),
    book(
        "2 John",
        "2John",
        New,
        true,
        &["2 john", "2john", "2-john", "2jn", "2jn."],
    ),
    book(
        "3 John",
        "3John",
        New,
        true,
        &["3 john", "3john", "3-john", "3jn", "3jn."],
    ),
    book("Jude", "Jude", New, true, &["jude", "jud", "jud."]),
    book(
        "Revelation",
        "Rev",
        New,
        true,
        &[
            "book of revelations",
            "book of revelation",
            "revelations",
            "revelation",
            "rev",
            "rev.",
        ],
    ),
];

/// Lowercase, trim, collapse whitespace runs, and rewrite a spelled-out or
/// roman ordinal prefix to its digit ("First John", "II Kings", "3rd John").
pub fn normalize_alias(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut words: Vec<&str> = lowered.split_whitespace().collect();

    let mut joined = String::new();
    if words.len() > 1 {
        if let Some(digit) = ordinal_digit(words[0]) {
            words.remove(0);
            joined.push_str(digit);
            joined.push(' ');
        }
    } else if let Some((head, rest)) = words.first().and_then(|w| w.split_once('-')) {
        // "ii-kings"
        if let Some(digit) = ordinal_digit(head) {
            return format!("{}-{}", digit, rest);
        }
    }

    joined.push_str(&words.join(" "));
    joined
}

/// Map an ordinal word to its digit.
pub fn ordinal_digit(word: &str) -> Option<&'static str> {
    match word {
        "1" | "1st" | "i" | "first" => Some("1"),
        "2" | "2nd" | "ii" | "second" => Some("2"),
        "3" | "3rd" | "iii" | "third" => Some("3"),
        _ => None,
    }
}

/// Read-only alias index over the book table.
#[derive(Debug)]
pub struct BookRegistry {
    books: &'static [BookRecord],
    by_alias: HashMap<&'static str, usize>,
}

impl BookRegistry {
    /// Build the registry over the standard 66-book table.
    pub fn new() -> Result<Self, RegistryError> {
        Self::from_records(&BOOKS)
    }

    /// Build the registry over an arbitrary table, rejecting malformed data.
    pub fn from_records(books: &'static [BookRecord]) -> Result<Self, RegistryError> {
        let mut by_alias = HashMap::new();

        for (idx, record) in books.iter().enumerate() {
            if record.aliases.is_empty() {
                return Err(RegistryError::NoAliases {
                    title: record.title.to_string(),
                });
            }

            for &alias in record.aliases {
                if normalize_alias(alias) != alias {
                    return Err(RegistryError::UnnormalizedAlias {
                        alias: alias.to_string(),
                        title: record.title.to_string(),
                    });
                }
                if let Some(prev) = by_alias.insert(alias, idx) {
                    return Err(RegistryError::DuplicateAlias {
                        alias: alias.to_string(),
                        first: books[prev].title.to_string(),
                        second: record.title.to_string(),
                    });
                }
            }
        }

        Ok(Self { books, by_alias })
    }

    /// Exact alias lookup after normalization.
    ///
    /// A trailing period and the separator after a numeric prefix are
    /// retried without, so "2 Co." finds the "2co." spelling.
    pub fn find_by_alias(&self, text: &str) -> Option<&BookRecord> {
        let normalized = normalize_alias(text);
        if normalized.is_empty() {
            return None;
        }

        let compact = compact_ordinal(&normalized);
        let candidates = [
            Some(normalized.as_str()),
            normalized.strip_suffix('.'),
            compact.as_deref(),
            compact.as_deref().and_then(|c| c.strip_suffix('.')),
        ];

        for candidate in candidates.into_iter().flatten() {
            if let Some(&idx) = self.by_alias.get(candidate) {
                return Some(&self.books[idx]);
            }
        }
        None
    }

    pub fn books(&self) -> &'static [BookRecord] {
        self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }
}

/// "2 co" / "2-co" -> "2co"
fn compact_ordinal(normalized: &str) -> Option<String> {
    let mut chars = normalized.chars();
    let first = chars.next()?;
    if !first.is_ascii_digit() {
        return None;
    }
    let rest = chars.as_str();
    let trimmed = rest.trim_start_matches([' ', '-']);
    if trimmed.len() == rest.len() {
        return None;
    }
    Some(format!("{}{}", first, trimmed))
}
