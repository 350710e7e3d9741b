//! Newline-boundary text chunker with fixed character overlap.
//!
//! Greedily accumulates corpus lines into chunks of at most `chunk_size`
//! characters; each new chunk is seeded with up to `overlap` trailing
//! characters of its predecessor (shrunk when needed so the seeded chunk
//! still fits) so retrieval does not lose context at chunk boundaries. A
//! single line longer than `chunk_size` is emitted as its own oversized
//! chunk rather than being split mid-line.

/// Split a corpus into overlapping chunks. An empty or whitespace-only
/// corpus yields no chunks; callers must treat that as nothing to index.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    // Length of the overlap seed currently at the front of `current`;
    // a chunk consisting only of carried-over overlap is never emitted.
    let mut seed_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        if !current.is_empty() && current.chars().count() + 1 + line_len > chunk_size {
            let full = std::mem::take(&mut current);
            // Shrink the seed so the seeded chunk still fits within the
            // limit; a line that alone exceeds the limit gets no seed and
            // becomes its own oversized chunk.
            let room = chunk_size.saturating_sub(line_len + 1);
            let tail = char_tail(&full, overlap.min(room));
            if full.chars().count() > seed_len {
                chunks.push(full);
            }
            current = tail;
            seed_len = current.chars().count();
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.trim().is_empty() && current.chars().count() > seed_len {
        chunks.push(current);
    }

    chunks
}

/// Last `n` characters of `s`, on a char boundary.
fn char_tail(s: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let total = s.chars().count();
    s.chars().skip(total.saturating_sub(n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_corpus_yields_no_chunks() {
        assert!(split_text("", 800, 100).is_empty());
        assert!(split_text("   \n \n", 800, 100).is_empty());
    }

    #[test]
    fn short_corpus_is_a_single_chunk() {
        let chunks = split_text("Hello\nWorld", 800, 100);
        assert_eq!(chunks, vec!["Hello\nWorld".to_string()]);
    }

    #[test]
    fn chunks_respect_the_size_limit() {
        let text = (0..100)
            .map(|i| format!("line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = split_text(&text, 200, 40);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 200,
                "chunk exceeds limit: {} chars",
                chunk.chars().count()
            );
        }
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = (0..100)
            .map(|i| format!("line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = split_text(&text, 200, 40);
        for pair in chunks.windows(2) {
            let tail = char_tail(&pair[0], 40);
            assert!(
                pair[1].starts_with(&tail),
                "next chunk must begin with the previous chunk's tail"
            );
        }
    }

    #[test]
    fn long_line_under_the_limit_never_overflows_a_chunk() {
        // A 750-char line fits within the 800 limit on its own, but not on
        // top of a full overlap seed; the seed must shrink to make room.
        let text = format!("{}\n{}", "a".repeat(400), "b".repeat(750));
        let chunks = split_text(&text, 800, 100);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 800,
                "chunk of {} chars exceeds the limit",
                chunk.chars().count()
            );
        }
        assert!(chunks.iter().any(|c| c.contains(&"b".repeat(750))));
    }

    #[test]
    fn oversized_line_becomes_its_own_chunk() {
        let long_line = "x".repeat(500);
        let text = format!("short\n{}\nshort again", long_line);
        let chunks = split_text(&text, 100, 20);
        // Emitted whole, with no seed prepended.
        assert!(chunks.iter().any(|c| *c == long_line));
        for chunk in chunks.iter().filter(|c| **c != long_line) {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn corpus_content_is_preserved_across_chunks() {
        let text = (0..60)
            .map(|i| format!("sentence {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = split_text(&text, 150, 30);
        let joined = chunks.join("\n");
        for i in 0..60 {
            assert!(joined.contains(&format!("sentence {}", i)));
        }
    }

    #[test]
    fn chunk_order_is_stable() {
        let text = (0..60)
            .map(|i| format!("sentence {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let first = split_text(&text, 150, 30);
        let second = split_text(&text, 150, 30);
        assert_eq!(first, second);
    }

    #[test]
    fn char_tail_is_utf8_safe() {
        let s = "héllo wörld ünïcode";
        let tail = char_tail(s, 5);
        assert_eq!(tail.chars().count(), 5);
        assert!(s.ends_with(&tail));
    }
}
