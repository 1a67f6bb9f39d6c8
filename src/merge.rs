//! Post-processing of finished segmentations.
//!
//! Generators tend to over-fragment short phrases and under-split long
//! passages. These passes merge segments that are too short and split
//! segments that are too long at sentence boundaries. Neither touches the
//! original text; both return new segment lists.

use crate::markers::detect_parallel_structures;
use crate::models::{PostProcessParams, SegmentationResult, TextSegment};
use crate::segments::boundaries_from_segments;

/// Merge each segment shorter than `min_length` trimmed chars with the
/// segments that follow it, until it is long enough or none are left.
///
/// Merged texts are joined with a single space and the merged segment keeps
/// the lowest confidence of its parts, a missing confidence counting as 0.
/// Output ids are renumbered from 1.
pub fn merge_small_segments(segments: Vec<TextSegment>, min_length: usize) -> Vec<TextSegment> {
    let mut merged: Vec<TextSegment> = Vec::with_capacity(segments.len());
    let mut pending = segments.into_iter();

    while let Some(mut current) = pending.next() {
        while current.text.trim().chars().count() < min_length {
            match pending.next() {
                Some(next) => current = merge_two_segments(current, &next),
                None => break,
            }
        }
        merged.push(current);
    }

    for (i, segment) in merged.iter_mut().enumerate() {
        segment.id = i as u32 + 1;
    }
    merged
}

fn merge_two_segments(mut a: TextSegment, b: &TextSegment) -> TextSegment {
    a.end = b.end;
    a.text.push(' ');
    a.text.push_str(&b.text);
    a.confidence = match (a.confidence, b.confidence) {
        (None, None) => None,
        (x, y) => Some(x.unwrap_or(0.0).min(y.unwrap_or(0.0))),
    };
    a
}

/// Split each segment longer than `max_length` chars at sentence ends.
///
/// A sentence ends at a run of `.`, `!` or `?` followed by whitespace or the
/// end of the text. Pieces are trimmed and numbered after the highest
/// existing id. A long segment with no interior sentence end is kept as is.
pub fn split_long_segments(segments: Vec<TextSegment>, max_length: usize) -> Vec<TextSegment> {
    let mut next_id = segments.iter().map(|s| s.id).max().unwrap_or(0) + 1;
    let mut result = Vec::with_capacity(segments.len());

    for segment in segments {
        if segment.text.chars().count() <= max_length {
            result.push(segment);
            continue;
        }

        let pieces = sentence_pieces(&segment.text);
        if pieces.len() <= 1 {
            result.push(segment);
            continue;
        }

        for (offset, piece) in pieces {
            let start = segment.start + offset;
            result.push(TextSegment {
                id: next_id,
                start,
                end: start + piece.len(),
                text: piece.to_string(),
                ..segment.clone()
            });
            next_id += 1;
        }
    }
    result
}

/// Trimmed sentences of `text` with their byte offsets into it.
fn sentence_pieces(text: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut piece_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if !is_terminal(ch) {
            continue;
        }
        while matches!(chars.peek(), Some(&(_, c)) if is_terminal(c)) {
            chars.next();
        }
        let cut = chars.peek().map_or(text.len(), |&(i, _)| i);
        let at_sentence_end = chars.peek().map_or(true, |&(_, c)| c.is_whitespace());
        if at_sentence_end {
            push_trimmed(&mut pieces, text, piece_start, cut);
            piece_start = cut;
        }
    }
    push_trimmed(&mut pieces, text, piece_start, text.len());
    pieces
}

fn push_trimmed<'a>(pieces: &mut Vec<(usize, &'a str)>, text: &'a str, start: usize, end: usize) {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if !trimmed.is_empty() {
        pieces.push((start + slice.len() - slice.trim_start().len(), trimmed));
    }
}

fn is_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Merge then split, returning a new result.
///
/// Boundaries and parallel structures, when the input carried them, are
/// recomputed from the new segments.
pub fn post_process(result: &SegmentationResult, params: &PostProcessParams) -> SegmentationResult {
    let merged = merge_small_segments(result.segments.clone(), params.min_length);
    let segments = split_long_segments(merged, params.max_length);

    let mut processed = result.clone();
    if processed.boundaries.is_some() {
        processed.boundaries = Some(boundaries_from_segments(&segments));
    }
    if processed.metadata.parallel_structures.is_some() {
        processed.metadata.parallel_structures = Some(detect_parallel_structures(&segments));
    }
    processed.segments = segments;
    processed
}
