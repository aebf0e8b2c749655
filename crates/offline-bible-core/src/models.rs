//! Core data models.
//!
//! The corpus types mirror the on-disk corpus document
//! (`{ version, books: [{ name, testament, chapters: [{ chapter, verses: [{ verse, text }] }] }] }`).
//! Result types are fully denormalized copies so they can be cached or
//! serialized independently of the loaded corpus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BibleError;

/// Number of books in a complete KJV-equivalent corpus.
pub const CANONICAL_BOOK_COUNT: usize = 66;

/// The complete scripture dataset, books in canonical order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub testament: Testament,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Testament {
    #[serde(
        rename = "OLD",
        alias = "Old",
        alias = "old",
        alias = "OT",
        alias = "Old Testament"
    )]
    Old,
    #[serde(
        rename = "NEW",
        alias = "New",
        alias = "new",
        alias = "NT",
        alias = "New Testament"
    )]
    New,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "chapter")]
    pub number: u32,
    #[serde(default)]
    pub verses: Vec<Verse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
    #[serde(rename = "verse")]
    pub number: u32,
    pub text: String,
}

impl Corpus {
    /// Parse and validate a corpus document.
    ///
    /// This is the only way a corpus enters the engine: malformed JSON, an
    /// empty `version` or an empty `books` array all fail with
    /// [`BibleError::InvalidCorpus`].
    pub fn from_json(payload: &str) -> Result<Corpus, BibleError> {
        let corpus: Corpus = serde_json::from_str(payload)
            .map_err(|e| BibleError::InvalidCorpus(format!("malformed corpus document: {}", e)))?;
        corpus.validate()?;
        Ok(corpus)
    }

    pub fn validate(&self) -> Result<(), BibleError> {
        if self.version.trim().is_empty() {
            return Err(BibleError::InvalidCorpus(
                "version must not be empty".to_string(),
            ));
        }
        if self.books.is_empty() {
            return Err(BibleError::InvalidCorpus(
                "books must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Count books, chapters and verses by walking the whole corpus.
    pub fn stats(&self) -> CorpusStats {
        let chapters = self.books.iter().map(|b| b.chapters.len()).sum();
        let verses = self
            .books
            .iter()
            .flat_map(|b| b.chapters.iter())
            .map(|c| c.verses.len())
            .sum();
        CorpusStats {
            books: self.books.len(),
            chapters,
            verses,
        }
    }

    /// Whether the corpus has the canonical 66 books. Not enforced.
    pub fn is_complete(&self) -> bool {
        self.books.len() == CANONICAL_BOOK_COUNT
    }
}

impl Book {
    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadStatus {
    pub is_loading: bool,
    pub is_ready: bool,
}

/// A parsed but unresolved reference such as `Romans 8:28-30`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    /// Book name as typed.
    pub book: String,
    pub chapter: u32,
    pub verse_start: Option<u32>,
    /// Equals `verse_start` when a single verse was given.
    pub verse_end: Option<u32>,
}

impl Locator {
    /// Display label using the resolved book name.
    pub fn label(&self, book_name: &str) -> String {
        match (self.verse_start, self.verse_end) {
            (Some(start), Some(end)) if end != start => {
                format!("{} {}:{}-{}", book_name, self.chapter, start, end)
            }
            (Some(start), _) => format!("{} {}:{}", book_name, self.chapter, start),
            (None, _) => format!("{} {}", book_name, self.chapter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVerse {
    pub book_name: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl ResolvedVerse {
    pub fn new(book: &Book, chapter: &Chapter, verse: &Verse) -> Self {
        Self {
            book_name: book.name.clone(),
            chapter: chapter.number,
            verse: verse.number,
            text: verse.text.clone(),
        }
    }

    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book_name, self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Human-readable reference, or a summary line for keyword searches.
    pub reference: String,
    pub verses: Vec<ResolvedVerse>,
    /// Verse texts joined with single spaces.
    pub text: String,
    pub translation_id: String,
    /// Matches found before display truncation.
    pub total: usize,
}

impl SearchResult {
    pub fn new(
        reference: String,
        verses: Vec<ResolvedVerse>,
        translation_id: &str,
        total: usize,
    ) -> Self {
        let text = verses
            .iter()
            .map(|v| v.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            reference,
            verses,
            text,
            translation_id: translation_id.to_string(),
            total,
        }
    }
}

/// Deterministic favorite identity: `"{book}-{chapter}-{verse}"`.
pub fn favorite_id(book_name: &str, chapter: u32, verse: u32) -> String {
    format!("{}-{}-{}", book_name, chapter, verse)
}

/// A saved verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub book_name: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub reference: String,
    pub date_added: DateTime<Utc>,
}

/// A favorite as submitted by a caller, before it is stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub book_name: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub reference: String,
}

impl NewFavorite {
    pub fn from_verse(verse: &ResolvedVerse) -> Self {
        Self {
            book_name: verse.book_name.clone(),
            chapter: verse.chapter,
            verse: verse.verse,
            text: verse.text.clone(),
            reference: verse.reference(),
        }
    }

    pub fn id(&self) -> String {
        favorite_id(&self.book_name, self.chapter, self.verse)
    }

    pub fn stamp(self, date_added: DateTime<Utc>) -> Favorite {
        Favorite {
            id: self.id(),
            book_name: self.book_name,
            chapter: self.chapter,
            verse: self.verse,
            text: self.text,
            reference: self.reference,
            date_added,
        }
    }
}
