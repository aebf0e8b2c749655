//! Reference lookup and keyword search over a loaded corpus.
//!
//! Everything here is a pure function of the corpus (and, for single-word
//! search, an optional prebuilt [`SearchIndex`]). Results are
//! `Result<SearchResult, BibleError>` so fallbacks compose as values; see
//! [`with_keyword_fallback`].
//!
//! # Keyword search
//!
//! 1. Trim and lowercase; blank input is [`BibleError::EmptySearch`].
//! 2. Input containing whitespace is a phrase: scan every verse for the
//!    substring, in corpus order, stopping at `max_matches`.
//! 3. A single word goes through the index: exact token, then fuzzy
//!    expansion (at most `max_expanded_tokens` tokens), union of postings,
//!    stopping at `max_matches`. Without an index the phrase scan is used.
//! 4. Truncate to `display_limit`; `total` keeps the pre-truncation count.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::books::resolve_book;
use crate::error::BibleError;
use crate::index::SearchIndex;
use crate::models::{Corpus, ResolvedVerse, SearchResult};
use crate::reference::parse_reference;

/// Well-known references rotated by [`popular_reference`].
pub const POPULAR_REFERENCES: [&str; 20] = [
    "John 3:16",
    "Philippians 4:13",
    "Jeremiah 29:11",
    "Romans 8:28",
    "Proverbs 3:5-6",
    "Isaiah 41:10",
    "Matthew 6:33",
    "Psalm 23:1",
    "Joshua 1:9",
    "Romans 12:2",
    "Galatians 5:22-23",
    "Ephesians 2:8-9",
    "Colossians 3:23",
    "Hebrews 11:1",
    "James 1:2-3",
    "Psalm 46:1",
    "Matthew 11:28",
    "John 14:6",
    "Romans 5:8",
    "Psalm 119:105",
];

/// Result-size caps for keyword search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Matches collected before the search stops.
    pub max_matches: usize,
    /// Matches returned for display.
    pub display_limit: usize,
    /// Tokens a single-word query may expand to.
    pub max_expanded_tokens: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_matches: 100,
            display_limit: 50,
            max_expanded_tokens: 20,
        }
    }
}

/// Resolve a typed reference like `John 3:16`, `Romans 8:28-30` or `Psalm 23`.
pub fn resolve_reference(corpus: &Corpus, raw: &str) -> Result<SearchResult, BibleError> {
    let locator = parse_reference(raw).ok_or(BibleError::InvalidFormat)?;
    let book = resolve_book(corpus, &locator.book).ok_or(BibleError::BookNotFound)?;
    let chapter = book
        .chapter(locator.chapter)
        .ok_or(BibleError::ChapterNotFound)?;

    let verses: Vec<ResolvedVerse> = match locator.verse_start {
        Some(start) => {
            let end = locator.verse_end.unwrap_or(start);
            let selected: Vec<ResolvedVerse> = chapter
                .verses
                .iter()
                .filter(|v| v.number >= start && v.number <= end)
                .map(|v| ResolvedVerse::new(book, chapter, v))
                .collect();
            if selected.is_empty() {
                return Err(BibleError::VerseNotFound);
            }
            selected
        }
        None => chapter
            .verses
            .iter()
            .map(|v| ResolvedVerse::new(book, chapter, v))
            .collect(),
    };

    let total = verses.len();
    Ok(SearchResult::new(
        locator.label(&book.name),
        verses,
        &corpus.version,
        total,
    ))
}

/// Keyword or phrase search. See the module docs for the strategy.
pub fn search(
    corpus: &Corpus,
    index: Option<&SearchIndex>,
    keyword: &str,
    limits: &SearchLimits,
) -> Result<SearchResult, BibleError> {
    let normalized = keyword.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(BibleError::EmptySearch);
    }

    let matches = if normalized.contains(char::is_whitespace) {
        scan(corpus, &normalized, limits.max_matches)
    } else {
        match index {
            Some(index) => indexed(corpus, index, &normalized, limits),
            None => scan(corpus, &normalized, limits.max_matches),
        }
    };

    if matches.is_empty() {
        return Err(BibleError::NoResults);
    }

    let total = matches.len();
    let shown: Vec<ResolvedVerse> = matches.into_iter().take(limits.display_limit).collect();
    let label = if total > shown.len() {
        format!(
            "Search results for \"{}\" ({} of {} verses)",
            keyword.trim(),
            shown.len(),
            total
        )
    } else {
        format!("Search results for \"{}\" ({} verses)", keyword.trim(), total)
    };

    Ok(SearchResult::new(label, shown, &corpus.version, total))
}

/// Direct substring scan over every verse in corpus order.
fn scan(corpus: &Corpus, needle: &str, max_matches: usize) -> Vec<ResolvedVerse> {
    let mut seen: HashSet<(&str, u32, u32)> = HashSet::new();
    let mut out = Vec::new();

    for book in &corpus.books {
        for chapter in &book.chapters {
            for verse in &chapter.verses {
                if !verse.text.to_lowercase().contains(needle) {
                    continue;
                }
                if seen.insert((book.name.as_str(), chapter.number, verse.number)) {
                    out.push(ResolvedVerse::new(book, chapter, verse));
                    if out.len() >= max_matches {
                        return out;
                    }
                }
            }
        }
    }
    out
}

fn indexed(
    corpus: &Corpus,
    index: &SearchIndex,
    keyword: &str,
    limits: &SearchLimits,
) -> Vec<ResolvedVerse> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    'tokens: for token in index.matching_tokens(keyword, limits.max_expanded_tokens) {
        for pos in index.positions(token) {
            if !seen.insert(*pos) {
                continue;
            }
            if let Some((book, chapter, verse)) = pos.resolve(corpus) {
                out.push(ResolvedVerse::new(book, chapter, verse));
            }
            if out.len() >= limits.max_matches {
                break 'tokens;
            }
        }
    }
    out
}

/// Fall back to `fallback` when `first` failed with a reference miss.
///
/// If the fallback also fails, the first (more specific) error is kept.
/// Other errors, and successes, pass through untouched.
pub fn with_keyword_fallback<F>(
    first: Result<SearchResult, BibleError>,
    fallback: F,
) -> Result<SearchResult, BibleError>
where
    F: FnOnce() -> Result<SearchResult, BibleError>,
{
    first.or_else(|err| {
        if err.is_reference_miss() {
            fallback().map_err(|_| err)
        } else {
            Err(err)
        }
    })
}

/// Uniform book, then uniform chapter, then uniform verse.
///
/// Not uniform over verses: short books and chapters are over-represented.
pub fn random_verse<R: Rng + ?Sized>(
    corpus: &Corpus,
    rng: &mut R,
) -> Result<SearchResult, BibleError> {
    let book = corpus.books.choose(rng).ok_or(BibleError::BookNotFound)?;
    let chapter = book.chapters.choose(rng).ok_or(BibleError::ChapterNotFound)?;
    let verse = chapter.verses.choose(rng).ok_or(BibleError::VerseNotFound)?;

    let resolved = ResolvedVerse::new(book, chapter, verse);
    Ok(SearchResult::new(
        resolved.reference(),
        vec![resolved],
        &corpus.version,
        1,
    ))
}

/// Popular reference for any index, wrapping negatives and overflow.
pub fn popular_reference(index: i64) -> &'static str {
    let len = POPULAR_REFERENCES.len() as i64;
    POPULAR_REFERENCES[index.rem_euclid(len) as usize]
}
