//! Conversation engine: retrieval-grounded question answering.
//!
//! Every user question is wrapped in a fixed instruction block that
//! constrains the model to the retrieved context before it is embedded,
//! retrieved against, and sent for generation. The wrapped form is what is
//! stored in memory; the transcript recovers the original question by
//! splitting on the `USER QUESTION:` marker.

use anyhow::Result;
use std::sync::Arc;

use crate::generation::ChatModel;
use crate::index::VectorIndex;
use crate::memory::ConversationMemory;
use crate::models::{ChatRole, ChatTurn};

/// Marker separating the instruction block from the user's own words.
/// `unwrap_question` splits on this, so it must never change between
/// wrapping and replay.
pub const QUESTION_MARKER: &str = "USER QUESTION:";

const SYSTEM_INSTRUCTIONS: &str = "\
SYSTEM INSTRUCTIONS:
- Only answer questions based on the provided documents
- If the answer is not in the documents, respond with \"I don't know.\"
- Keep responses concise and to the point
- Do not make up or hallucinate information";

/// Prefix the fixed instruction block onto a raw question.
pub fn wrap_question(question: &str) -> String {
    format!("{}\n\n{} {}", SYSTEM_INSTRUCTIONS, QUESTION_MARKER, question)
}

/// Recover the original question from its wrapped form. Returns the input
/// unchanged (trimmed) when the marker is absent.
pub fn unwrap_question(stored: &str) -> String {
    stored
        .rsplit(QUESTION_MARKER)
        .next()
        .unwrap_or(stored)
        .trim()
        .to_string()
}

/// One session's retrieval + generation loop: an immutable index, a chat
/// model, and the running memory of prior turns.
pub struct ConversationEngine {
    index: VectorIndex,
    model: Arc<dyn ChatModel>,
    memory: ConversationMemory,
    top_k: usize,
}

impl ConversationEngine {
    pub fn new(
        index: VectorIndex,
        model: Arc<dyn ChatModel>,
        memory: ConversationMemory,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            model,
            memory,
            top_k,
        }
    }

    /// Answer a question grounded in the indexed documents.
    ///
    /// Memory is only updated after generation succeeds; a retrieval or
    /// provider failure leaves the conversation exactly as it was.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let wrapped = wrap_question(question);

        let context = self.index.query(&wrapped, self.top_k).await?;

        let mut messages = Vec::with_capacity(self.memory.turns().len() + 2);
        messages.push(ChatTurn::system(format!(
            "Use the following document excerpts to answer the question.\n\n{}",
            context.join("\n\n---\n\n")
        )));
        messages.extend(self.memory.turns().iter().cloned());
        messages.push(ChatTurn::user(wrapped.clone()));

        let answer = self.model.generate(&messages).await?;

        self.memory
            .push_exchange(ChatTurn::user(wrapped), ChatTurn::assistant(answer.clone()));

        Ok(answer)
    }

    /// Retained history for display: user turns carry the recovered original
    /// question, never the wrapped prompt.
    pub fn transcript(&self) -> Vec<(ChatRole, String)> {
        self.memory
            .turns()
            .iter()
            .map(|turn| match turn.role {
                ChatRole::User => (turn.role, unwrap_question(&turn.content)),
                _ => (turn.role, turn.content.clone()),
            })
            .collect()
    }

    /// Number of indexed chunks backing this engine.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_then_unwrap_round_trips() {
        let question = "What is the main topic discussed in the documents?";
        assert_eq!(unwrap_question(&wrap_question(question)), question);
    }

    #[test]
    fn round_trip_holds_for_awkward_questions() {
        for q in ["", "  padded  ", "multi\nline\nquestion", "what: is this?"] {
            assert_eq!(unwrap_question(&wrap_question(q)), q.trim());
        }
    }

    #[test]
    fn unwrap_without_marker_returns_input() {
        assert_eq!(unwrap_question("  plain text  "), "plain text");
    }

    #[test]
    fn wrapped_question_carries_the_grounding_rules() {
        let wrapped = wrap_question("anything");
        assert!(wrapped.contains("I don't know."));
        assert!(wrapped.contains("Only answer questions based on the provided documents"));
        assert!(wrapped.ends_with("anything"));
    }
}
