//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use offline_bible::config::{parse_config, Config};
use chrono::{DateTime, Utc};
use offline_bible::corpus::{CachedCorpus, CorpusCache, CorpusSource};
use serde_json::{json, Value};
use tempfile::TempDir;

fn verses(pairs: &[(u32, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(n, text)| json!({ "verse": n, "text": text }))
            .collect(),
    )
}

/// A one-chapter book.
fn book(name: &str, testament: &str, chapter: u32, pairs: &[(u32, &str)]) -> Value {
    json!({
        "name": name,
        "testament": testament,
        "chapters": [{ "chapter": chapter, "verses": verses(pairs) }]
    })
}

/// A ten-book KJV excerpt. Hebrews 11 has 60 verses mentioning faith.
pub fn corpus_value() -> Value {
    let hebrews_11: Vec<Value> = (1..=60)
        .map(|n| {
            let text = if n == 1 {
                "Now faith is the substance of things hoped for, the evidence of things not seen."
                    .to_string()
            } else {
                format!("By faith the elders obtained a good report, witness {}.", n)
            };
            json!({ "verse": n, "text": text })
        })
        .collect();

    json!({
        "version": "KJV",
        "books": [
            book("Genesis", "OLD", 1, &[
                (1, "In the beginning God created the heaven and the earth."),
                (2, "And the earth was without form, and void; and darkness was upon the face of the deep."),
                (3, "And God said, Let there be light: and there was light."),
            ]),
            book("Leviticus", "OLD", 19, &[
                (17, "Thou shalt not hate thy brother in thine heart."),
                (18, "Thou shalt not avenge, nor bear any grudge against the children of thy people, but thou shalt love thy neighbour as thyself: I am the LORD."),
            ]),
            book("Joshua", "OLD", 1, &[
                (8, "This book of the law shall not depart out of thy mouth."),
                (9, "Have not I commanded thee? Be strong and of a good courage; be not afraid, neither be thou dismayed: for the LORD thy God is with thee whithersoever thou goest."),
            ]),
            book("Psalms", "OLD", 23, &[
                (1, "The LORD is my shepherd; I shall not want."),
                (2, "He maketh me to lie down in green pastures: he leadeth me beside the still waters."),
                (3, "He restoreth my soul: he leadeth me in the paths of righteousness for his name's sake."),
                (4, "Yea, though I walk through the valley of the shadow of death, I will fear no evil."),
            ]),
            book("Proverbs", "OLD", 3, &[
                (5, "Trust in the LORD with all thine heart; and lean not unto thine own understanding."),
                (6, "In all thy ways acknowledge him, and he shall direct thy paths."),
            ]),
            book("Matthew", "NEW", 22, &[
                (37, "Jesus said unto him, Thou shalt love the Lord thy God with all thy heart."),
                (38, "This is the first and great commandment."),
                (39, "And the second is like unto it, Thou shalt love thy neighbour as thyself."),
            ]),
            book("John", "NEW", 3, &[
                (16, "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life."),
                (17, "For God sent not his Son into the world to condemn the world; but that the world through him might be saved."),
            ]),
            book("Romans", "NEW", 8, &[
                (28, "And we know that all things work together for good to them that love God."),
            ]),
            json!({
                "name": "Hebrews",
                "testament": "NEW",
                "chapters": [{ "chapter": 11, "verses": hebrews_11 }]
            }),
            book("1 John", "NEW", 4, &[
                (8, "He that loveth not knoweth not God; for God is love."),
            ]),
        ]
    })
}

pub fn corpus_json() -> String {
    corpus_value().to_string()
}

/// Write the fixture corpus to `dir/bible-data.json`.
pub fn write_corpus(dir: &Path) -> PathBuf {
    let path = dir.join("bible-data.json");
    std::fs::write(&path, corpus_json()).unwrap();
    path
}

pub fn test_config(tmp: &TempDir, source: &str) -> Config {
    test_config_with_port(tmp, source, 7340)
}

pub fn test_config_with_port(tmp: &TempDir, source: &str, port: u16) -> Config {
    let root = tmp.path();
    let content = format!(
        r#"[db]
path = "{}/data/bible.sqlite"

[corpus]
source = "{}"

[favorites]
backup_path = "{}/data/favorites_backup.json"

[server]
bind = "127.0.0.1:{}"
"#,
        root.display(),
        source,
        root.display(),
        port
    );
    parse_config(&content).unwrap()
}

/// Serves a fixed payload and counts fetches.
pub struct CountingSource {
    payload: String,
    delay: Duration,
    fetches: AtomicUsize,
}

impl CountingSource {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusSource for CountingSource {
    fn describe(&self) -> String {
        "counting".to_string()
    }

    async fn fetch(&self) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.payload.clone())
    }
}

/// Fails the first `failures` fetches, then serves the fixture corpus.
pub struct FlakySource {
    failures: usize,
    delay: Duration,
    fetches: AtomicUsize,
}

impl FlakySource {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn always_failing() -> Self {
        Self::new(usize::MAX)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusSource for FlakySource {
    fn describe(&self) -> String {
        "flaky".to_string()
    }

    async fn fetch(&self) -> Result<String> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if attempt < self.failures {
            anyhow::bail!("network unreachable");
        }
        Ok(corpus_json())
    }
}

/// A cache whose disk is gone: reads and writes both fail.
#[derive(Default)]
pub struct BrokenCache {
    writes: AtomicUsize,
}

impl BrokenCache {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusCache for BrokenCache {
    async fn read(&self) -> Result<Option<CachedCorpus>> {
        anyhow::bail!("disk I/O error")
    }

    async fn write(&self, _version: &str, _payload: &str, _cached_at: DateTime<Utc>) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("disk I/O error")
    }

    async fn clear(&self) -> Result<()> {
        anyhow::bail!("disk I/O error")
    }
}
