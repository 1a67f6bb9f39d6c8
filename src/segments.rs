//! Building text segments from word ranges and checking their integrity.

use crate::models::{Boundary, TextSegment, WordRange};
use crate::ranges::RangeError;
use crate::tokenize::get_word_spans;

/// Slice the source text into one segment per validated word range.
///
/// A segment runs from its first word up to the first word of the next
/// segment, so whitespace and punctuation between words stay attached to the
/// trailing edge of the earlier segment. The first segment also absorbs any
/// leading whitespace and the last one runs to the end of the text, which
/// makes the segment texts concatenate back to the source exactly.
pub fn build_segments_from_word_ranges(
    text: &str,
    ranges: &[WordRange],
) -> Result<Vec<TextSegment>, RangeError> {
    let words = get_word_spans(text);

    // Byte offset where each range's first word begins
    let mut starts = Vec::with_capacity(ranges.len());
    for (i, &(start, end)) in ranges.iter().enumerate() {
        if start > end {
            return Err(RangeError::InvertedRange { range: i, start, end });
        }
        if end >= words.len() {
            return Err(RangeError::WordIndexOutOfRange {
                index: end,
                word_count: words.len(),
            });
        }
        starts.push(if i == 0 { 0 } else { words[start].start });
    }

    let mut segments = Vec::with_capacity(ranges.len());
    for i in 0..ranges.len() {
        let start = starts[i];
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        if end < start {
            return Err(RangeError::OutOfOrder { range: i + 1 });
        }
        segments.push(TextSegment::new(
            (i + 1) as u32,
            start,
            end,
            &text[start..end],
        ));
    }

    Ok(segments)
}

/// True when the segment texts concatenate to exactly the source text.
///
/// No normalization of any kind is applied.
pub fn validate_segmentation_integrity(text: &str, segments: &[TextSegment]) -> bool {
    let total: usize = segments.iter().map(|s| s.text.len()).sum();
    if total != text.len() {
        return false;
    }

    let mut rebuilt = String::with_capacity(total);
    for segment in segments {
        rebuilt.push_str(&segment.text);
    }
    rebuilt == text
}

/// Phrase boundaries at the start of every segment after the first.
pub fn boundaries_from_segments(segments: &[TextSegment]) -> Vec<Boundary> {
    segments
        .iter()
        .skip(1)
        .map(|s| Boundary::phrase(s.start, s.confidence))
        .collect()
}
