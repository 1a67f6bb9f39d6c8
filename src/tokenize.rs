//! Whitespace word tokenization with exact byte offsets.
//!
//! Words are maximal runs of non-whitespace characters. Punctuation and
//! markup stay attached to the word they touch (`said,` and `<b>Abaye</b>`
//! are single tokens), so every word index the generator sees maps to one
//! contiguous slice of the source.

use crate::models::WordSpan;

/// Split a text into ordered word spans.
///
/// Returns an empty vector for empty or whitespace-only text.
pub fn get_word_spans(text: &str) -> Vec<WordSpan> {
    let mut spans = Vec::new();
    let mut word_start: Option<usize> = None;

    for (offset, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(start) = word_start.take() {
                push_span(&mut spans, text, start, offset);
            }
        } else if word_start.is_none() {
            word_start = Some(offset);
        }
    }

    if let Some(start) = word_start {
        push_span(&mut spans, text, start, text.len());
    }

    spans
}

fn push_span(spans: &mut Vec<WordSpan>, text: &str, start: usize, end: usize) {
    spans.push(WordSpan {
        index: spans.len(),
        token: text[start..end].to_string(),
        start,
        end,
    });
}

/// Number of words in a text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Render a text as `[0]word [1]word ...` for generation prompts.
pub fn indexed_word_list(text: &str) -> String {
    get_word_spans(text)
        .iter()
        .map(|word| format!("[{}]{}", word.index, word.token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_spans_with_offsets() {
        let text = "And God said, Let there be light.";
        let spans = get_word_spans(text);

        assert_eq!(spans.len(), 7);
        assert_eq!(spans[0].token, "And");
        assert_eq!(spans[2].token, "said,");
        assert_eq!(&text[spans[2].start..spans[2].end], "said,");
        for (i, span) in spans.iter().enumerate() {
            assert_eq!(span.index, i);
        }
    }

    #[test]
    fn test_hebrew_offsets_are_byte_offsets() {
        let text = "וַיֹּאמֶר אֱלֹהִים יְהִי אוֹר";
        let spans = get_word_spans(text);

        assert_eq!(spans.len(), 4);
        for span in &spans {
            assert_eq!(&text[span.start..span.end], span.token);
        }
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(get_word_spans("").is_empty());
        assert!(get_word_spans("  \n\t ").is_empty());
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_separators_and_tokens_reconstruct_text() {
        let text = "  א  ב\tג\n ד ";
        let spans = get_word_spans(text);

        let mut rebuilt = String::new();
        let mut cursor = 0;
        for span in &spans {
            rebuilt.push_str(&text[cursor..span.start]);
            rebuilt.push_str(&span.token);
            cursor = span.end;
        }
        rebuilt.push_str(&text[cursor..]);

        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_word_count_matches_spans() {
        let text = "<b>Abaye</b> said: And <i>it</i> provokes";
        assert_eq!(word_count(text), get_word_spans(text).len());
    }

    #[test]
    fn test_indexed_word_list() {
        assert_eq!(indexed_word_list("a b  c"), "[0]a [1]b [2]c");
        assert_eq!(indexed_word_list(""), "");
    }
}
