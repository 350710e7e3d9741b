//! In-memory vector index over text chunks.
//!
//! Brute-force cosine similarity over all stored vectors, the same shape as
//! a small FAISS flat index. The index is immutable after construction;
//! re-processing documents builds a fresh one, there is no merge path.

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::embedding::{cosine_similarity, EmbeddingProvider};

/// Immutable (chunk, vector) pairs plus the provider used to embed queries.
pub struct VectorIndex {
    chunks: Vec<String>,
    vectors: Vec<Vec<f32>>,
    provider: Arc<dyn EmbeddingProvider>,
}

// Manual impl: the provider trait object has no Debug bound.
impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("chunks", &self.chunks.len())
            .field("model", &self.provider.model_name())
            .finish()
    }
}

impl VectorIndex {
    /// Embed all chunks in one provider batch and build the index.
    ///
    /// # Errors
    ///
    /// Rejects an empty chunk list; propagates provider failures; rejects a
    /// provider response whose vector count does not match the input.
    pub async fn build(
        provider: Arc<dyn EmbeddingProvider>,
        chunks: Vec<String>,
    ) -> Result<Self> {
        if chunks.is_empty() {
            bail!("Cannot build an index over zero chunks");
        }

        let vectors = provider.embed(&chunks).await?;
        if vectors.len() != chunks.len() {
            bail!(
                "Embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            );
        }

        Ok(Self {
            chunks,
            vectors,
            provider,
        })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embed `text` and return the `k` nearest chunks, nearest first.
    /// Ties keep original chunk order (the sort is stable).
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<String>> {
        let query_vecs = self.provider.embed(&[text.to_string()]).await?;
        let query_vec = query_vecs
            .first()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response for query"))?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query_vec, v)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, _)| self.chunks[i].clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic fake: maps each text to a fixed 2-d vector by keyword.
    struct KeywordEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbeddings {
        fn model_name(&self) -> &str {
            "keyword-fake"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("cat") {
                        vec![1.0, 0.0]
                    } else if t.contains("dog") {
                        vec![0.8, 0.6]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    /// Fake that always fails, for error propagation tests.
    struct FailingEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbeddings {
        fn model_name(&self) -> &str {
            "failing-fake"
        }
        fn dims(&self) -> usize {
            0
        }
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            bail!("provider unavailable")
        }
    }

    #[tokio::test]
    async fn build_rejects_empty_chunks() {
        let err = VectorIndex::build(Arc::new(KeywordEmbeddings), Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("zero chunks"));
    }

    #[tokio::test]
    async fn query_returns_nearest_first() {
        let chunks = vec![
            "about weather".to_string(),
            "the cat sat".to_string(),
            "a dog barked".to_string(),
        ];
        let index = VectorIndex::build(Arc::new(KeywordEmbeddings), chunks)
            .await
            .unwrap();

        let results = index.query("my cat", 2).await.unwrap();
        assert_eq!(results, vec!["the cat sat".to_string(), "a dog barked".to_string()]);
    }

    #[tokio::test]
    async fn ties_keep_chunk_order() {
        let chunks = vec![
            "cat one".to_string(),
            "cat two".to_string(),
            "cat three".to_string(),
        ];
        let index = VectorIndex::build(Arc::new(KeywordEmbeddings), chunks)
            .await
            .unwrap();

        let results = index.query("cat", 3).await.unwrap();
        assert_eq!(
            results,
            vec![
                "cat one".to_string(),
                "cat two".to_string(),
                "cat three".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn debug_reports_chunk_count_and_model() {
        let index = VectorIndex::build(Arc::new(KeywordEmbeddings), vec!["cat".to_string()])
            .await
            .unwrap();
        let rendered = format!("{:?}", index);
        assert!(rendered.contains("chunks: 1"));
        assert!(rendered.contains("keyword-fake"));
    }

    #[tokio::test]
    async fn provider_failure_propagates_from_build() {
        let err = VectorIndex::build(Arc::new(FailingEmbeddings), vec!["chunk".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("provider unavailable"));
    }
}
