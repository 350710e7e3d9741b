//! Session lifecycle: owns the index, conversation engine, and per-file
//! records for one interactive session.
//!
//! `process` replaces the session state only after every stage succeeds, so
//! a failed re-process never clobbers a working index. `reset` drops
//! everything unconditionally and is idempotent.

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use crate::chat::ConversationEngine;
use crate::chunk::split_text;
use crate::config::Config;
use crate::corpus::assemble;
use crate::embedding::EmbeddingProvider;
use crate::generation::ChatModel;
use crate::index::VectorIndex;
use crate::memory::ConversationMemory;
use crate::models::{FileStatus, ProcessedFileRecord, UploadedFile};

/// Guidance shown when a question arrives before any documents are indexed.
pub const NOT_READY_GUIDANCE: &str = "Please upload and process documents first!";

/// Outcome of asking a question.
#[derive(Debug)]
pub enum AskOutcome {
    Answer(String),
    /// No index exists yet; carries the guidance message to display.
    NotReady(&'static str),
}

/// Summary of a successful process run.
#[derive(Debug)]
pub struct ProcessSummary {
    pub processed: usize,
    pub failed: usize,
    pub chunks: usize,
    pub warnings: Vec<String>,
}

/// One user's interactive session: at most one engine (index + memory) and
/// the ordered per-file records from the last successful process.
pub struct Session {
    config: Config,
    embeddings: Arc<dyn EmbeddingProvider>,
    chat_model: Arc<dyn ChatModel>,
    engine: Option<ConversationEngine>,
    records: Vec<ProcessedFileRecord>,
}

impl Session {
    /// Initialize an empty session: no index, no memory, no records.
    pub fn new(
        config: Config,
        embeddings: Arc<dyn EmbeddingProvider>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            config,
            embeddings,
            chat_model,
            engine: None,
            records: Vec::new(),
        }
    }

    /// Whether documents have been processed and questions can be asked.
    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    /// Per-file records from the last successful process, in upload order.
    pub fn records(&self) -> &[ProcessedFileRecord] {
        &self.records
    }

    /// Borrow the engine for transcript rendering.
    pub fn engine(&self) -> Option<&ConversationEngine> {
        self.engine.as_ref()
    }

    /// Extract, assemble, chunk, embed, and index the given files, then
    /// bind a fresh conversation engine with fresh memory to the new index.
    ///
    /// On any stage failure the prior engine and records are left untouched.
    pub async fn process(&mut self, files: &[UploadedFile]) -> Result<ProcessSummary> {
        if files.is_empty() {
            bail!("Please upload at least one document!");
        }

        let assembled = assemble(files);

        if assembled.corpus.trim().is_empty() {
            bail!("No text could be extracted from the uploaded files!");
        }

        let chunks = split_text(
            &assembled.corpus,
            self.config.chunking.chunk_size,
            self.config.chunking.overlap,
        );

        let index = VectorIndex::build(Arc::clone(&self.embeddings), chunks)
            .await
            .context("Error processing documents")?;
        let chunk_count = index.len();

        let engine = ConversationEngine::new(
            index,
            Arc::clone(&self.chat_model),
            ConversationMemory::new(self.config.memory.max_tokens),
            self.config.retrieval.top_k,
        );

        // Atomic replacement: nothing above touched self.
        self.engine = Some(engine);
        self.records = assembled.records;

        Ok(ProcessSummary {
            processed: self
                .records
                .iter()
                .filter(|r| r.status == FileStatus::Processed)
                .count(),
            failed: self
                .records
                .iter()
                .filter(|r| r.status == FileStatus::Failed)
                .count(),
            chunks: chunk_count,
            warnings: assembled.warnings,
        })
    }

    /// Answer a question against the current index, or return guidance when
    /// no documents have been processed yet. A provider failure propagates
    /// as an error and leaves the session (index and memory) unchanged.
    pub async fn ask(&mut self, question: &str) -> Result<AskOutcome> {
        let engine = match self.engine.as_mut() {
            Some(engine) => engine,
            None => return Ok(AskOutcome::NotReady(NOT_READY_GUIDANCE)),
        };

        let answer = engine
            .ask(question)
            .await
            .context("Error generating response")?;
        Ok(AskOutcome::Answer(answer))
    }

    /// Drop the index, memory, and records unconditionally.
    pub fn reset(&mut self) {
        self.engine = None;
        self.records.clear();
    }
}
