//! # Offline Bible
//!
//! An offline-first Bible reading engine: a load-once corpus with a durable
//! cache, reference lookup, keyword and phrase search, and saved favorites.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ CorpusSource │──▶│ CorpusStore  │──▶│ QueryEngine  │──┐
//! │  file / URL  │   │ SQLite cache │   │ lazy index   │  │
//! └──────────────┘   └──────────────┘   └──────────────┘  │
//!                                                          ├──▶ CLI (bible)
//!                    ┌──────────────┐   ┌──────────────┐  │    HTTP (serve)
//!                    │ SQLite store │──▶│  Favorites   │──┘
//!                    │ JSON backup  │   │              │
//!                    └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! bible init                    # create database
//! bible load                    # fetch and cache the corpus
//! bible ref "John 3:16"
//! bible search "love thy neighbour"
//! bible serve                   # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`corpus`] | Corpus sources, durable cache, load-once store |
//! | [`engine`] | Query engine over the loaded corpus |
//! | [`sqlite_store`] | SQLite favorites store |
//! | [`backup`] | JSON snapshot favorites store |
//! | [`favorites`] | Favorites service with backup degradation |
//! | [`app`] | Service wiring from a config |
//! | [`server`] | JSON HTTP API |

pub mod app;
pub mod backup;
pub mod config;
pub mod corpus;
pub mod db;
pub mod engine;
pub mod favorites;
pub mod migrate;
pub mod server;
pub mod sqlite_store;

