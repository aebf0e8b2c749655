//! Error taxonomy shared by every consumer-facing operation.
//!
//! Each variant maps to a stable upper-snake code (see [`BibleError::code`])
//! that UI layers translate into display text. Serializing a `BibleError`
//! yields just that code string.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BibleError {
    /// The corpus document failed schema validation.
    #[error("INVALID_CORPUS: {0}")]
    InvalidCorpus(String),

    /// No corpus could be fetched and no durable cache exists.
    #[error("CORPUS_UNAVAILABLE")]
    CorpusUnavailable,

    #[error("INVALID_FORMAT")]
    InvalidFormat,

    #[error("BOOK_NOT_FOUND")]
    BookNotFound,

    #[error("CHAPTER_NOT_FOUND")]
    ChapterNotFound,

    #[error("VERSE_NOT_FOUND")]
    VerseNotFound,

    #[error("EMPTY_SEARCH")]
    EmptySearch,

    #[error("NO_RESULTS")]
    NoResults,
}

impl BibleError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BibleError::InvalidCorpus(_) => "INVALID_CORPUS",
            BibleError::CorpusUnavailable => "CORPUS_UNAVAILABLE",
            BibleError::InvalidFormat => "INVALID_FORMAT",
            BibleError::BookNotFound => "BOOK_NOT_FOUND",
            BibleError::ChapterNotFound => "CHAPTER_NOT_FOUND",
            BibleError::VerseNotFound => "VERSE_NOT_FOUND",
            BibleError::EmptySearch => "EMPTY_SEARCH",
            BibleError::NoResults => "NO_RESULTS",
        }
    }

    /// True for the failures a reference lookup can produce once the corpus
    /// is loaded. These are the errors a keyword search may recover from.
    pub fn is_reference_miss(&self) -> bool {
        matches!(
            self,
            BibleError::InvalidFormat
                | BibleError::BookNotFound
                | BibleError::ChapterNotFound
                | BibleError::VerseNotFound
        )
    }
}

impl serde::Serialize for BibleError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}
