//! # Offline Bible Core
//!
//! Runtime-agnostic logic for the offline Bible engine: the corpus model,
//! reference parsing, book name resolution, the token/prefix search index,
//! pure lookup functions, and the favorites store abstraction.
//!
//! This crate contains no tokio, sqlx, filesystem or network I/O. The
//! native `offline-bible` crate supplies corpus sources, caching,
//! persistence and the CLI / HTTP surfaces on top of it.

pub mod books;
pub mod error;
pub mod index;
pub mod lookup;
pub mod models;
pub mod reference;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use error::BibleError;
pub use index::{SearchIndex, VersePosition};
pub use lookup::SearchLimits;
