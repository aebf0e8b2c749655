//! Token and prefix indexes over a loaded corpus.
//!
//! The token index maps every normalized token (lowercased, punctuation
//! stripped, longer than two characters) to the verses containing it, as
//! positional triples into the corpus arrays. The prefix index maps each
//! 3..=8 character prefix to the tokens sharing it.
//!
//! Tokens are numbered in first-seen corpus order, so fuzzy expansion over
//! the vocabulary is deterministic.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{Book, Chapter, Corpus, Verse};

/// Tokens must be longer than this many characters to be indexed.
const MIN_TOKEN_CHARS: usize = 3;
const PREFIX_MIN_CHARS: usize = 3;
const PREFIX_MAX_CHARS: usize = 8;
/// Keywords at least this long also match tokens that merely contain them.
const CONTAINS_MIN_CHARS: usize = 4;

/// Position of a verse inside the corpus arrays (not chapter/verse numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersePosition {
    pub book: u16,
    pub chapter: u16,
    pub verse: u16,
}

impl VersePosition {
    pub fn new(book: usize, chapter: usize, verse: usize) -> Result<Self, IndexBuildError> {
        let overflow = || IndexBuildError::PositionOverflow {
            book,
            chapter,
            verse,
        };
        Ok(Self {
            book: u16::try_from(book).map_err(|_| overflow())?,
            chapter: u16::try_from(chapter).map_err(|_| overflow())?,
            verse: u16::try_from(verse).map_err(|_| overflow())?,
        })
    }

    pub fn resolve<'a>(&self, corpus: &'a Corpus) -> Option<(&'a Book, &'a Chapter, &'a Verse)> {
        let book = corpus.books.get(self.book as usize)?;
        let chapter = book.chapters.get(self.chapter as usize)?;
        let verse = chapter.verses.get(self.verse as usize)?;
        Some((book, chapter, verse))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexBuildError {
    #[error("corpus position {book}/{chapter}/{verse} does not fit the index")]
    PositionOverflow {
        book: usize,
        chapter: usize,
        verse: usize,
    },
}

/// Lowercase, replace non-word characters with spaces, keep tokens longer
/// than two characters.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
        .map(|word| word.to_lowercase())
}

#[derive(Debug, Default)]
pub struct SearchIndex {
    vocabulary: Vec<String>,
    token_ids: HashMap<String, u32>,
    postings: Vec<Vec<VersePosition>>,
    prefixes: HashMap<String, Vec<u32>>,
}

impl SearchIndex {
    pub fn build(corpus: &Corpus) -> Result<SearchIndex, IndexBuildError> {
        let mut index = SearchIndex::default();

        for (bi, book) in corpus.books.iter().enumerate() {
            for (ci, chapter) in book.chapters.iter().enumerate() {
                for (vi, verse) in chapter.verses.iter().enumerate() {
                    let pos = VersePosition::new(bi, ci, vi)?;
                    for token in tokenize(&verse.text) {
                        let id = index.intern(token);
                        let list = &mut index.postings[id as usize];
                        if list.last() != Some(&pos) {
                            list.push(pos);
                        }
                    }
                }
            }
        }

        Ok(index)
    }

    fn intern(&mut self, token: String) -> u32 {
        if let Some(&id) = self.token_ids.get(&token) {
            return id;
        }
        let id = self.vocabulary.len() as u32;
        for prefix in prefixes_of(&token) {
            self.prefixes.entry(prefix.to_string()).or_default().push(id);
        }
        self.token_ids.insert(token.clone(), id);
        self.vocabulary.push(token);
        self.postings.push(Vec::new());
        id
    }

    /// Number of distinct tokens.
    pub fn token_count(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn prefix_count(&self) -> usize {
        self.prefixes.len()
    }

    /// Verses containing exactly `token`.
    pub fn positions(&self, token: &str) -> &[VersePosition] {
        self.token_ids
            .get(token)
            .map(|&id| self.postings[id as usize].as_slice())
            .unwrap_or(&[])
    }

    /// Tokens sharing a 3..=8 character prefix, in first-seen order.
    pub fn tokens_with_prefix(&self, prefix: &str) -> impl Iterator<Item = &str> + '_ {
        self.prefixes
            .get(prefix)
            .into_iter()
            .flatten()
            .map(|&id| self.vocabulary[id as usize].as_str())
    }

    /// Tokens a single-word keyword expands to, at most `max_tokens`.
    ///
    /// The exact token comes first when indexed. Expansion runs when there
    /// is no exact hit or the keyword has 3+ characters: tokens starting
    /// with the keyword, or for 4+ characters tokens containing it.
    pub fn matching_tokens(&self, keyword: &str, max_tokens: usize) -> Vec<&str> {
        let mut matched: Vec<&str> = Vec::new();
        let exact = self.token_ids.get_key_value(keyword).map(|(t, _)| t.as_str());
        if let Some(token) = exact {
            matched.push(token);
        }

        let len = keyword.chars().count();
        if matched.len() >= max_tokens || !(matched.is_empty() || len >= PREFIX_MIN_CHARS) {
            return matched;
        }

        let candidates: Box<dyn Iterator<Item = &str> + '_> = if len >= CONTAINS_MIN_CHARS {
            Box::new(
                self.vocabulary
                    .iter()
                    .map(String::as_str)
                    .filter(move |t| t.contains(keyword)),
            )
        } else if len >= PREFIX_MIN_CHARS {
            Box::new(self.tokens_with_prefix(keyword))
        } else {
            Box::new(
                self.vocabulary
                    .iter()
                    .map(String::as_str)
                    .filter(move |t| t.starts_with(keyword)),
            )
        };

        for token in candidates {
            if Some(token) == exact {
                continue;
            }
            matched.push(token);
            if matched.len() >= max_tokens {
                break;
            }
        }
        matched
    }
}

fn prefixes_of(token: &str) -> impl Iterator<Item = &str> + '_ {
    token
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .enumerate()
        .filter(|(n, _)| (PREFIX_MIN_CHARS - 1..PREFIX_MAX_CHARS).contains(n))
        .map(move |(_, end)| &token[..end])
}
