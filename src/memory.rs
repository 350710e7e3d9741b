//! Token-capped conversation buffer.
//!
//! Turns are appended in (user, assistant) pairs and never mutated. The cap
//! is advisory: when the estimated token count of retained history exceeds
//! it, whole pairs are evicted oldest-first, which keeps trimming
//! deterministic and never splits an exchange.

use crate::models::ChatTurn;

/// Approximate chars-per-token ratio used for the advisory cap.
const CHARS_PER_TOKEN: usize = 4;

/// Ordered sequence of conversation turns with an advisory token budget.
#[derive(Debug)]
pub struct ConversationMemory {
    turns: Vec<ChatTurn>,
    max_tokens: usize,
}

impl ConversationMemory {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_tokens,
        }
    }

    /// Retained turns, oldest first.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append one completed exchange, then evict oldest pairs while the
    /// estimated token count exceeds the cap. The newest exchange is always
    /// retained, even if it alone exceeds the budget.
    pub fn push_exchange(&mut self, question: ChatTurn, answer: ChatTurn) {
        self.turns.push(question);
        self.turns.push(answer);

        while self.turns.len() > 2 && self.estimated_tokens() > self.max_tokens {
            self.turns.drain(..2);
        }
    }

    fn estimated_tokens(&self) -> usize {
        let chars: usize = self.turns.iter().map(|t| t.content.chars().count()).sum();
        chars / CHARS_PER_TOKEN
    }
}
