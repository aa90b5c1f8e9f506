use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use design_qa::text::embedding::{
    EmbeddingCache, EmbeddingError, EmbeddingProvider, HashedEmbedder, OllamaEmbedder,
    SemanticScorer, TextSimilarity, cosine,
};
use design_qa::text::normalize::{dice_similarity, edit_similarity, normalize};

// ============================================================================
// Normalisation and edit similarity
// ============================================================================

#[test]
fn test_normalize_strips_punctuation_and_case() {
    assert_eq!(normalize("  Hello,   World! "), "hello world");
    assert_eq!(normalize("snake_case-word"), "snake_caseword");
    assert_eq!(normalize("!!!"), "");
}

#[test]
fn test_edit_similarity_identical_after_normalisation() {
    assert_eq!(edit_similarity("Sign Up!", "sign up"), 1.0);
}

#[test]
fn test_edit_similarity_empty_side_is_zero() {
    assert_eq!(edit_similarity("", "anything"), 0.0);
    assert_eq!(edit_similarity("anything", ""), 0.0);
    assert_eq!(edit_similarity("", ""), 0.0);
}

#[test]
fn test_edit_similarity_punctuation_only_texts_are_equal() {
    // Both normalise to "", which compares equal.
    assert_eq!(edit_similarity("!!", "??"), 1.0);
}

#[test]
fn test_edit_similarity_partial() {
    let score = edit_similarity("kitten", "sitting");
    assert!((score - (1.0 - 3.0 / 7.0)).abs() < 1e-9, "score = {}", score);
}

#[test]
fn test_dice_similarity_bounds() {
    assert_eq!(dice_similarity("Night", "night"), 1.0);
    assert_eq!(dice_similarity("", "night"), 0.0);
    assert_eq!(dice_similarity("a", "b"), 0.0);

    let score = dice_similarity("night", "nacht");
    assert!((score - 0.25).abs() < 1e-9, "score = {}", score);
}

// ============================================================================
// Hashed embeddings
// ============================================================================

#[test]
fn test_hashed_embedding_is_deterministic() {
    let embedder = HashedEmbedder::default();
    let a = embedder.embed_sync("Welcome back").unwrap();
    let b = embedder.embed_sync("welcome   BACK!").unwrap();
    assert_eq!(a.len(), 384);
    assert_eq!(a, b);
    assert!((cosine(&a, &b) - 1.0).abs() < 1e-6);
}

#[test]
fn test_hashed_embedding_rejects_empty_text() {
    let embedder = HashedEmbedder::default();
    assert!(matches!(
        embedder.embed_sync("  ?? "),
        Err(EmbeddingError::EmptyText)
    ));
}

#[test]
fn test_hashed_embedding_related_texts_score_higher() {
    let embedder = HashedEmbedder::default();
    let base = embedder.embed_sync("Book a day workshop").unwrap();
    let close = embedder.embed_sync("Book a workshop").unwrap();
    let far = embedder.embed_sync("Privacy policy").unwrap();
    assert!(cosine(&base, &close) > cosine(&base, &far));
}

#[test]
fn test_cosine_degenerate_vectors() {
    assert_eq!(cosine(&[], &[]), 0.0);
    assert_eq!(cosine(&[1.0, 0.0], &[1.0]), 0.0);
    assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert!((cosine(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_cache_tracks_hits_and_misses() {
    let cache = EmbeddingCache::unbounded();
    assert!(cache.get("a").is_none());
    cache.insert("a", Arc::new(vec![1.0]));
    assert!(cache.get("a").is_some());

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_cache_evicts_least_recently_used() {
    let cache = EmbeddingCache::with_capacity(NonZeroUsize::new(2).unwrap());
    cache.insert("a", Arc::new(vec![1.0]));
    cache.insert("b", Arc::new(vec![2.0]));
    // Touch "a" so "b" becomes the oldest.
    cache.get("a");
    cache.insert("c", Arc::new(vec![3.0]));

    assert_eq!(cache.len(), 2);
    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
}

// ============================================================================
// Semantic scorer
// ============================================================================

/// Fails every call and counts how often it was asked.
struct FailingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EmbeddingError::Status {
            status: 503,
            body: "unavailable".into(),
        })
    }
}

/// Counts calls and delegates to the hashed embedder.
struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for CountingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HashedEmbedder::default().embed_sync(text)
    }
}

#[tokio::test]
async fn test_scorer_falls_back_to_dice_when_provider_fails() {
    let provider = Arc::new(FailingProvider {
        calls: AtomicUsize::new(0),
    });
    let scorer = SemanticScorer::new(provider.clone(), Arc::new(EmbeddingCache::unbounded()));

    let index = scorer.prepare(["night", "nacht"]).await;
    assert_eq!(index.fallback_count(), 2);
    assert!((index.similarity("night", "nacht") - 0.25).abs() < 1e-9);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_scorer_empty_text_scores_zero() {
    let scorer = SemanticScorer::default();
    assert_eq!(scorer.semantic_similarity("", "Sign up").await, 0.0);
    assert_eq!(scorer.semantic_similarity("Sign up", "   ").await, 0.0);
}

#[tokio::test]
async fn test_scorer_identical_text_scores_one() {
    let scorer = SemanticScorer::default();
    let score = scorer.semantic_similarity("Sign up", "Sign up").await;
    assert!((score - 1.0).abs() < 1e-6, "score = {}", score);
}

#[tokio::test]
async fn test_scorer_embeds_each_distinct_text_once() {
    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
    });
    let cache = Arc::new(EmbeddingCache::unbounded());
    let scorer = SemanticScorer::new(provider.clone(), cache.clone()).with_concurrency(2);

    scorer.prepare(["a b", "c d", "a b", "", "e f"]).await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.len(), 3);

    // Second pass is served from the cache.
    scorer.prepare(["a b", "c d"]).await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
}

// ============================================================================
// Ollama embedder (mock server)
// ============================================================================

#[tokio::test]
async fn test_ollama_embedder_parses_vector() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/embeddings")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "nomic-embed-text",
            "prompt": "Sign up"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"embedding": [0.5, 0.25, 0.0]}"#)
        .create_async()
        .await;

    let embedder = OllamaEmbedder::new(
        &format!("{}/api/embeddings", server.url()),
        "nomic-embed-text",
    );
    let vector = embedder.embed("Sign up").await.unwrap();

    assert_eq!(vector, vec![0.5, 0.25, 0.0]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ollama_embedder_maps_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/embeddings")
        .with_status(500)
        .with_body("model not loaded")
        .create_async()
        .await;

    let embedder = OllamaEmbedder::new(&format!("{}/api/embeddings", server.url()), "m");
    match embedder.embed("Sign up").await {
        Err(EmbeddingError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ollama_embedder_rejects_empty_vector() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/embeddings")
        .with_status(200)
        .with_body(r#"{"embedding": []}"#)
        .create_async()
        .await;

    let embedder = OllamaEmbedder::new(&format!("{}/api/embeddings", server.url()), "m");
    assert!(matches!(
        embedder.embed("Sign up").await,
        Err(EmbeddingError::EmptyVector)
    ));
}

#[tokio::test]
async fn test_scorer_with_failing_ollama_uses_fallback() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/embeddings")
        .with_status(500)
        .expect_at_least(1)
        .create_async()
        .await;

    let embedder = OllamaEmbedder::new(&format!("{}/api/embeddings", server.url()), "m");
    let scorer = SemanticScorer::new(Arc::new(embedder), Arc::new(EmbeddingCache::unbounded()));

    let score = scorer.semantic_similarity("Sign up", "sign up").await;
    assert_eq!(score, 1.0);
}
