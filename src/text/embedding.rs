use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::normalize::{dice_similarity, normalize};

pub const EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/embeddings";
pub const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Embedding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Embedding service returned an empty vector")]
    EmptyVector,

    #[error("Nothing to embed")]
    EmptyText,
}

/// Anything that can turn text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Cosine similarity; 0 for empty, zero-magnitude or mismatched vectors.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a.sqrt() * mag_b.sqrt())).clamp(-1.0, 1.0)
}

// ============================================================================
// Hashed embedder (deterministic, offline)
// ============================================================================

/// Feature-hashing embedder: words and padded character trigrams of the
/// normalised text are hashed into signed buckets, then L2-normalised.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dimensions: usize,
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self {
            dimensions: EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashedEmbedder {
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        use sha1::{Digest, Sha1};

        let digest = Sha1::digest(feature.as_bytes());
        let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
            % self.dimensions;
        let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for word in normalized.split(' ') {
            self.add_feature(&mut vector, &format!("w:{}", word), 1.0);

            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &format!("t:{}", trigram), 0.5);
            }
        }

        let magnitude = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if magnitude == 0.0 {
            return Err(EmbeddingError::EmptyVector);
        }
        for v in vector.iter_mut() {
            *v /= magnitude;
        }

        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }
}

// ============================================================================
// Ollama embedder
// ============================================================================

pub struct OllamaEmbedder {
    pub endpoint: String,
    pub model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl Default for OllamaEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL)
    }
}

impl OllamaEmbedder {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&OllamaEmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaEmbeddingResponse = response.json().await?;
        if parsed.embedding.is_empty() {
            return Err(EmbeddingError::EmptyVector);
        }
        Ok(parsed.embedding)
    }
}

// ============================================================================
// Embedding cache
// ============================================================================

struct CacheEntry {
    vector: Arc<Vec<f32>>,
    last_used: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    clock: u64,
    hits: u64,
    misses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Exact-string keyed embedding memo.
///
/// Unbounded by default; with a capacity the least recently used entry is
/// evicted on overflow. Writes are last-writer-wins, which is harmless since
/// a key always maps to the same vector.
pub struct EmbeddingCache {
    state: Mutex<CacheState>,
    capacity: Option<NonZeroUsize>,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl EmbeddingCache {
    pub fn unbounded() -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity: None,
        }
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity: Some(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<f32>>> {
        let mut guard = self.state.lock().ok()?;
        let state = &mut *guard;
        state.clock += 1;

        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = state.clock;
                state.hits += 1;
                tracing::trace!(key, hit = true, "embedding cache");
                Some(Arc::clone(&entry.vector))
            }
            None => {
                state.misses += 1;
                tracing::trace!(key, hit = false, "embedding cache");
                None
            }
        }
    }

    pub fn insert(&self, key: &str, vector: Arc<Vec<f32>>) {
        let Ok(mut guard) = self.state.lock() else {
            tracing::warn!("embedding cache lock poisoned; skipping insert");
            return;
        };
        let state = &mut *guard;
        state.clock += 1;
        let now = state.clock;
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                vector,
                last_used: now,
            },
        );

        if let Some(capacity) = self.capacity {
            while state.entries.len() > capacity.get() {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_used)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        state.entries.remove(&k);
                    }
                    None => break,
                }
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state
            .lock()
            .map(|s| s.entries.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        match self.state.lock() {
            Ok(s) => CacheStats {
                entries: s.entries.len(),
                hits: s.hits,
                misses: s.misses,
            },
            Err(_) => CacheStats {
                entries: 0,
                hits: 0,
                misses: 0,
            },
        }
    }
}

// ============================================================================
// Semantic scorer
// ============================================================================

/// Synchronous text-similarity lookup used by the matcher.
pub trait TextSimilarity {
    /// Similarity in [0, 1]; 0 when either text is empty.
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Embeddings resolved ahead of matching. Texts whose embedding failed are
/// recorded as `None` and compared with the bigram fallback.
#[derive(Debug, Default, Clone)]
pub struct TextSimilarityIndex {
    vectors: HashMap<String, Option<Arc<Vec<f32>>>>,
}

impl TextSimilarityIndex {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn fallback_count(&self) -> usize {
        self.vectors.values().filter(|v| v.is_none()).count()
    }

    fn vector(&self, text: &str) -> Option<&Arc<Vec<f32>>> {
        self.vectors.get(text).and_then(|v| v.as_ref())
    }
}

impl TextSimilarity for TextSimilarityIndex {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.trim().is_empty() || b.trim().is_empty() {
            return 0.0;
        }

        match (self.vector(a), self.vector(b)) {
            (Some(va), Some(vb)) => cosine(va, vb).clamp(0.0, 1.0),
            _ => dice_similarity(a, b),
        }
    }
}

/// Embedding-backed similarity with a cache threaded in as a dependency.
pub struct SemanticScorer {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<EmbeddingCache>,
    concurrency: usize,
}

impl Default for SemanticScorer {
    fn default() -> Self {
        Self::new(
            Arc::new(HashedEmbedder::default()),
            Arc::new(EmbeddingCache::unbounded()),
        )
    }
}

impl SemanticScorer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache: Arc<EmbeddingCache>) -> Self {
        Self {
            provider,
            cache,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    /// Cached embedding for `text`, or `None` when the provider failed.
    pub async fn embedding(&self, text: &str) -> Option<Arc<Vec<f32>>> {
        if let Some(hit) = self.cache.get(text) {
            return Some(hit);
        }

        match self.provider.embed(text).await {
            Ok(vector) if !vector.is_empty() => {
                let vector = Arc::new(vector);
                self.cache.insert(text, Arc::clone(&vector));
                Some(vector)
            }
            Ok(_) => {
                tracing::warn!(text, "empty embedding; falling back to bigram similarity");
                None
            }
            Err(e) => {
                tracing::warn!(text, error = %e, "embedding failed; falling back to bigram similarity");
                None
            }
        }
    }

    /// Embed every distinct non-blank text, at most `concurrency` at a time.
    pub async fn prepare<'a, I>(&self, texts: I) -> TextSimilarityIndex
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = texts
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();

        let resolved: Vec<(String, Option<Arc<Vec<f32>>>)> = stream::iter(unique)
            .map(|text| async move { (text.to_string(), self.embedding(text).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        TextSimilarityIndex {
            vectors: resolved.into_iter().collect(),
        }
    }

    /// One-off semantic similarity of two strings.
    pub async fn semantic_similarity(&self, a: &str, b: &str) -> f64 {
        let index = self.prepare([a, b]).await;
        index.similarity(a, b)
    }
}
