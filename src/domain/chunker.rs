//! Token-bounded splitting of document text along paragraph boundaries.

use std::sync::LazyLock;

use regex::Regex;
use tiktoken_rs::cl100k_base;

use crate::domain::errors::{DomainError, Result};

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph pattern"));

/// Splits `text` into chunks whose token count stays within `max_tokens`.
///
/// Paragraphs are accumulated greedily; the paragraph that would overflow the
/// budget seals the running chunk and starts the next one. The budget check
/// measures the chunk exactly as it will be emitted, paragraph separators
/// included. A lone paragraph that is itself larger than the budget is
/// emitted oversized rather than truncated.
///
/// The tokenizer is built per call and dropped at the end of it, so no
/// encoder state survives between invocations.
pub fn split_into_chunks(text: &str, max_tokens: usize) -> Result<Vec<String>> {
    if text.trim().is_empty() {
        return Err(DomainError::invalid_input("cannot chunk empty text"));
    }

    let encoder = cl100k_base().map_err(|e| DomainError::internal(e.to_string()))?;

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in PARAGRAPH_BREAK.split(text) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if current.is_empty() {
            current.push_str(paragraph);
            continue;
        }

        let candidate = format!("{current}\n\n{paragraph}");
        if encoder.encode_with_special_tokens(&candidate).len() > max_tokens {
            chunks.push(std::mem::replace(&mut current, paragraph.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_count(text: &str) -> usize {
        cl100k_base()
            .unwrap()
            .encode_with_special_tokens(text)
            .len()
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            split_into_chunks("", 100),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            split_into_chunks("   \n\n  ", 100),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_into_chunks("Hello world.\n\nSecond paragraph.", 100).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "Hello world.\n\nSecond paragraph.");
    }

    #[test]
    fn test_chunks_respect_token_budget() {
        let paragraphs: Vec<String> = (0..20)
            .map(|i| format!("Paragraph number {i} talks about topic {i} in a few words."))
            .collect();
        let text = paragraphs.join("\n\n");
        let budget = 40;

        let chunks = split_into_chunks(&text, budget).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                token_count(chunk) <= budget,
                "chunk exceeded budget: {chunk:?}"
            );
        }
    }

    #[test]
    fn test_separator_tokens_count_against_budget() {
        // Sweep budgets around the paragraph sizes so some land exactly on
        // a sum of paragraph token counts; the joining blank line must not
        // push a sealed multi-paragraph chunk over the budget.
        let paragraphs: Vec<String> = (0..12)
            .map(|i| format!("Item {i} covers subject {i} in brief."))
            .collect();
        let text = paragraphs.join("\n\n");

        for budget in 5..40 {
            let chunks = split_into_chunks(&text, budget).unwrap();
            for chunk in &chunks {
                let measured = token_count(chunk);
                let lone_oversized = !chunk.contains("\n\n") && measured > budget;
                assert!(
                    measured <= budget || lone_oversized,
                    "chunk measures {measured} tokens against budget {budget}: {chunk:?}"
                );
            }
        }
    }

    #[test]
    fn test_oversized_paragraph_emitted_unsplit() {
        let oversized = (0..200)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let text = format!("Intro paragraph.\n\n{oversized}\n\nClosing paragraph.");

        let chunks = split_into_chunks(&text, 20).unwrap();
        assert!(chunks.contains(&oversized));
        assert!(token_count(&oversized) > 20);
    }

    #[test]
    fn test_blank_lines_with_whitespace_are_boundaries() {
        let chunks = split_into_chunks("First.\n   \nSecond.", 100).unwrap();
        assert_eq!(chunks, vec!["First.\n\nSecond.".to_string()]);
    }

    #[test]
    fn test_no_content_lost() {
        let text = "Alpha one.\n\nBravo two.\n\nCharlie three.\n\nDelta four.";
        let chunks = split_into_chunks(text, 6).unwrap();
        let rejoined = chunks.join("\n\n");
        assert_eq!(rejoined, text);
    }
}
