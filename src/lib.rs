//! # doc-chat
//!
//! A document question-answering assistant grounded in your own files.
//!
//! doc-chat extracts text from uploaded documents (PDF, DOCX, TXT), chunks
//! and embeds it, and answers questions through a conversational loop that
//! is constrained to the retrieved document content.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌─────────────┐
//! │  Files   │──▶│ Extract + │──▶│ Chunker  │──▶│ VectorIndex │
//! │ pdf/docx │   │ Assemble  │   │ 800/100  │   │  (cosine)   │
//! └──────────┘   └───────────┘   └──────────┘   └──────┬──────┘
//!                                                      │ top-k
//!                                               ┌──────▼──────┐
//!                      questions ──────────────▶│ Conversation│──▶ answers
//!                                               │   Engine    │
//!                                               └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! docchat chat report.pdf notes.docx readme.txt
//! docchat ask "What is the main topic?" --file report.pdf
//! docchat extract report.pdf
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Per-format text extraction |
//! | [`corpus`] | Corpus assembly with per-file status records |
//! | [`chunk`] | Overlapping newline-boundary chunker |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`generation`] | Chat-model provider abstraction |
//! | [`index`] | In-memory vector index |
//! | [`memory`] | Token-capped conversation buffer |
//! | [`chat`] | Question wrapping and the conversation engine |
//! | [`session`] | Session lifecycle (init / process / ask / reset) |
//! | [`transcript`] | Fixed HTML transcript templates |

pub mod chat;
pub mod chunk;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod extract;
pub mod generation;
pub mod index;
pub mod memory;
pub mod models;
pub mod session;
pub mod transcript;
