//! Query engine behavior over the fixture corpus.

mod common;

use std::sync::Arc;

use common::{corpus_json, CountingSource};
use offline_bible::corpus::CorpusStore;
use offline_bible::engine::QueryEngine;
use offline_bible_core::lookup::POPULAR_REFERENCES;
use offline_bible_core::{BibleError, SearchLimits};

const TTL: std::time::Duration = std::time::Duration::from_secs(86_400);

fn engine_with_source(source: Arc<CountingSource>) -> QueryEngine {
    QueryEngine::new(
        CorpusStore::new(source, None, TTL),
        SearchLimits::default(),
    )
}

fn engine() -> QueryEngine {
    engine_with_source(Arc::new(CountingSource::new(corpus_json())))
}

#[tokio::test]
async fn test_operations_load_on_demand() {
    let engine = engine();
    assert!(!engine.is_loaded());
    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.books, 10);
    assert_eq!(stats.chapters, 10);
    assert!(engine.is_loaded());
    assert!(engine.load_status().is_ready);
}

#[tokio::test]
async fn test_single_verse_reference() {
    let result = engine().resolve_reference("John 3:16").await.unwrap();
    assert_eq!(result.verses.len(), 1);
    let verse = &result.verses[0];
    assert_eq!(
        (verse.book_name.as_str(), verse.chapter, verse.verse),
        ("John", 3, 16)
    );
    assert_eq!(result.reference, "John 3:16");
    assert_eq!(result.translation_id, "KJV");
}

#[tokio::test]
async fn test_range_reference_is_inclusive_and_ordered() {
    let result = engine().resolve_reference("Psalm 23:2-4").await.unwrap();
    let numbers: Vec<u32> = result.verses.iter().map(|v| v.verse).collect();
    assert_eq!(numbers, vec![2, 3, 4]);
    assert_eq!(result.reference, "Psalms 23:2-4");
}

#[tokio::test]
async fn test_reference_errors() {
    let engine = engine();
    assert_eq!(
        engine.resolve_reference("NotARealBook 1:1").await.unwrap_err(),
        BibleError::BookNotFound
    );
    assert_eq!(
        engine.resolve_reference("John 999:1").await.unwrap_err(),
        BibleError::ChapterNotFound
    );
    assert_eq!(
        engine.resolve_reference("John 3:9999").await.unwrap_err(),
        BibleError::VerseNotFound
    );
    assert_eq!(
        engine.resolve_reference("grace").await.unwrap_err(),
        BibleError::InvalidFormat
    );
}

#[tokio::test]
async fn test_search_errors() {
    let engine = engine();
    assert_eq!(engine.search("").await.unwrap_err(), BibleError::EmptySearch);
    assert_eq!(
        engine.search("zzzznotaword").await.unwrap_err(),
        BibleError::NoResults
    );
}

#[tokio::test]
async fn test_phrase_search() {
    let result = engine().search("Love Thy Neighbour").await.unwrap();
    assert_eq!(result.verses.len(), 2);
    for verse in &result.verses {
        assert!(verse.text.to_lowercase().contains("love thy neighbour"));
    }
}

#[tokio::test]
async fn test_phrase_search_does_not_build_index() {
    let engine = engine();
    let result = engine.search("the world").await.unwrap();
    assert_eq!(result.verses.len(), 2);
    assert!(!engine.has_index());
}

#[tokio::test]
async fn test_single_word_search_caps_display() {
    let engine = engine();
    let result = engine.search("faith").await.unwrap();
    assert_eq!(result.verses.len(), 50);
    assert_eq!(result.total, 60);
    assert!(result.reference.contains("50 of 60"));
    assert!(engine.has_index());
}

#[tokio::test]
async fn test_single_word_search_expands_partial_words() {
    let result = engine().search("love").await.unwrap();
    let refs: Vec<String> = result
        .verses
        .iter()
        .map(|v| format!("{} {}:{}", v.book_name, v.chapter, v.verse))
        .collect();
    // exact "love"
    assert!(refs.contains(&"Leviticus 19:18".to_string()));
    assert!(refs.contains(&"Romans 8:28".to_string()));
    // "loved" and "loveth"
    assert!(refs.contains(&"John 3:16".to_string()));
    assert!(refs.contains(&"1 John 4:8".to_string()));
}

#[tokio::test]
async fn test_concurrent_searches_share_one_index() {
    let engine = Arc::new(engine());
    let mut handles = Vec::new();
    for word in ["faith", "love", "shepherd", "light", "world", "heart"] {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.search(word).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert!(engine.has_index());
    assert_eq!(engine.index_builds(), 1);

    engine.search("pastures").await.unwrap();
    assert_eq!(engine.index_builds(), 1);
}

/// The fixture plus a chapter too long for the index's position encoding.
fn unindexable_corpus_json() -> String {
    let mut corpus = common::corpus_value();
    let verses: Vec<serde_json::Value> = (1..=u32::from(u16::MAX) + 2)
        .map(|n| serde_json::json!({ "verse": n, "text": "selah" }))
        .collect();
    corpus["books"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({
            "name": "Appendix",
            "testament": "OLD",
            "chapters": [{ "chapter": 1, "verses": verses }]
        }));
    corpus.to_string()
}

#[tokio::test]
async fn test_failed_index_build_falls_back_to_scan() {
    let engine = engine_with_source(Arc::new(CountingSource::new(unindexable_corpus_json())));

    let result = engine.search("shepherd").await.unwrap();
    assert_eq!(result.verses.len(), 1);
    assert_eq!(result.verses[0].book_name, "Psalms");
    assert!(!engine.has_index());

    // the failure is remembered, not rebuilt per search
    let result = engine.search("righteousness").await.unwrap();
    assert_eq!(result.verses[0].book_name, "Psalms");
    assert_eq!(engine.index_builds(), 1);
}

#[tokio::test]
async fn test_book_content_prefers_reference() {
    let engine = engine();
    assert_eq!(
        engine.book_content("John 3:16").await.unwrap(),
        engine.resolve_reference("John 3:16").await.unwrap()
    );
}

#[tokio::test]
async fn test_book_content_falls_back_to_search() {
    let engine = engine();
    assert_eq!(
        engine.book_content("faith").await.unwrap(),
        engine.search("faith").await.unwrap()
    );
    // no Exodus here, and the phrase search finds nothing either
    assert_eq!(
        engine.book_content("Exodus 1:1").await.unwrap_err(),
        BibleError::BookNotFound
    );
}

#[tokio::test]
async fn test_random_verse_exists() {
    let engine = engine();
    for _ in 0..25 {
        let result = engine.random_verse().await.unwrap();
        assert_eq!(result.verses.len(), 1);
        let again = engine.resolve_reference(&result.reference).await.unwrap();
        assert_eq!(again.verses[0], result.verses[0]);
    }
}

#[tokio::test]
async fn test_popular_verse_never_fails() {
    let engine = engine();
    for i in [0, 1, 5, 19, 20, -1, -21, i64::MAX, i64::MIN, 1_000_000_007] {
        let result = engine.popular_verse(i).await.unwrap();
        assert!(!result.verses.is_empty());
    }
}

#[tokio::test]
async fn test_popular_verse_resolves_known_reference() {
    let engine = engine();
    let result = engine.popular_verse(0).await.unwrap();
    assert_eq!(result.reference, POPULAR_REFERENCES[0]);
    let wrapped = engine.popular_verse(20).await.unwrap();
    assert_eq!(wrapped, result);
}

#[tokio::test]
async fn test_daily_verse() {
    let result = engine().daily_verse().await.unwrap();
    assert!(!result.verses.is_empty());
}

#[tokio::test]
async fn test_unavailable_corpus_surfaces_everywhere() {
    let engine = QueryEngine::new(
        CorpusStore::new(Arc::new(common::FlakySource::always_failing()), None, TTL),
        SearchLimits::default(),
    );
    assert_eq!(
        engine.search("faith").await.unwrap_err(),
        BibleError::CorpusUnavailable
    );
    assert_eq!(
        engine.book_content("John 3:16").await.unwrap_err(),
        BibleError::CorpusUnavailable
    );
    assert_eq!(
        engine.popular_verse(0).await.unwrap_err(),
        BibleError::CorpusUnavailable
    );
}

#[tokio::test]
async fn test_one_fetch_for_many_operations() {
    let source = Arc::new(CountingSource::new(corpus_json()));
    let engine = engine_with_source(source.clone());
    engine.stats().await.unwrap();
    engine.search("faith").await.unwrap();
    engine.resolve_reference("John 3:16").await.unwrap();
    assert_eq!(source.fetches(), 1);
}
