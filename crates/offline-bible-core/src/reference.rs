//! Verse reference parsing.
//!
//! Accepts `<book> <chapter>[:<verse>[-<verse>]]`, where the book is one or
//! more whitespace-separated word tokens (`1 Samuel`, `Song of Solomon`).
//! Anything else parses to `None`, which lets keyword queries fall through
//! to search.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Locator;

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w\s]+?)\s+(\d+)(?::(\d+)(?:-(\d+))?)?$").expect("reference pattern is valid")
});

/// Parse a typed reference into a [`Locator`].
///
/// `verse_end` defaults to `verse_start` for a single verse; both are `None`
/// for a whole chapter. Numbers too large for `u32` do not parse.
pub fn parse_reference(raw: &str) -> Option<Locator> {
    let caps = REFERENCE_RE.captures(raw.trim())?;

    let book = caps.get(1)?.as_str().trim().to_string();
    let chapter = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let verse_start = match caps.get(3) {
        Some(m) => Some(m.as_str().parse::<u32>().ok()?),
        None => None,
    };
    let verse_end = match caps.get(4) {
        Some(m) => Some(m.as_str().parse::<u32>().ok()?),
        None => verse_start,
    };

    Some(Locator {
        book,
        chapter,
        verse_start,
        verse_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_verse() {
        let loc = parse_reference("John 3:16").unwrap();
        assert_eq!(loc.book, "John");
        assert_eq!(loc.chapter, 3);
        assert_eq!(loc.verse_start, Some(16));
        assert_eq!(loc.verse_end, Some(16));
    }

    #[test]
    fn test_range() {
        let loc = parse_reference("Romans 8:28-30").unwrap();
        assert_eq!(loc.verse_start, Some(28));
        assert_eq!(loc.verse_end, Some(30));
    }

    #[test]
    fn test_whole_chapter() {
        let loc = parse_reference("Psalm 23").unwrap();
        assert_eq!(loc.book, "Psalm");
        assert_eq!(loc.chapter, 23);
        assert_eq!(loc.verse_start, None);
        assert_eq!(loc.verse_end, None);
    }

    #[test]
    fn test_numbered_and_multi_word_books() {
        let loc = parse_reference("  1 Samuel 17:45 ").unwrap();
        assert_eq!(loc.book, "1 Samuel");
        assert_eq!(loc.chapter, 17);

        let loc = parse_reference("Song of Solomon 2:4").unwrap();
        assert_eq!(loc.book, "Song of Solomon");
    }

    #[test]
    fn test_keywords_do_not_parse() {
        assert_eq!(parse_reference("faith"), None);
        assert_eq!(parse_reference("love your neighbor"), None);
        assert_eq!(parse_reference(""), None);
        assert_eq!(parse_reference("3:16"), None);
        assert_eq!(parse_reference("John 3:16-"), None);
        assert_eq!(parse_reference("John. 3:16"), None);
    }

    #[test]
    fn test_overflowing_numbers_do_not_parse() {
        assert_eq!(parse_reference("John 99999999999:1"), None);
        assert_eq!(parse_reference("John 3:99999999999"), None);
    }

    proptest! {
        #[test]
        fn prop_parses_generated_references(
            book in "[A-Za-z]{2,12}( [A-Za-z]{2,8})?",
            chapter in 1u32..200,
            start in 1u32..180,
            span in 0u32..10,
        ) {
            let raw = format!("{} {}:{}-{}", book, chapter, start, start + span);
            let loc = parse_reference(&raw).unwrap();
            prop_assert_eq!(loc.book, book);
            prop_assert_eq!(loc.chapter, chapter);
            prop_assert_eq!(loc.verse_start, Some(start));
            prop_assert_eq!(loc.verse_end, Some(start + span));
        }

        #[test]
        fn prop_never_panics(raw in "\\PC{0,40}") {
            let _ = parse_reference(&raw);
        }
    }
}
