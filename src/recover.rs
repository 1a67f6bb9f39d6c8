//! Repair of malformed word ranges.
//!
//! Two narrow strategies, both non-destructive:
//!
//! 1. Verification-text recovery re-derives every range from the literal
//!    segment substrings the generator returned alongside its numbers.
//! 2. Trailing-coverage normalization fixes the last range of an otherwise
//!    well-formed chain when it stops short of, or one past, the last word.
//!
//! Anything else (leading gaps, interior gaps, overlaps) is left untouched
//! and fails validation downstream.

use crate::models::{CoSegmentationInput, SegmentationCandidate, Track, WordRange};
use crate::tokenize::{get_word_spans, word_count};

/// Derive ranges from exact segment texts.
///
/// Returns `None` unless the texts concatenate to the source exactly, every
/// text contains at least one word, and the word cursor lands exactly on the
/// end of the source. Never returns a partial result.
pub fn ranges_from_segment_texts(source: &str, segment_texts: &[String]) -> Option<Vec<WordRange>> {
    if segment_texts.is_empty() {
        return None;
    }
    if segment_texts.concat() != source {
        return None;
    }

    let total_words = get_word_spans(source).len();
    if total_words == 0 {
        return None;
    }

    let mut ranges = Vec::with_capacity(segment_texts.len());
    let mut cursor = 0usize;

    for segment in segment_texts {
        let count = word_count(segment);
        if count == 0 {
            return None;
        }

        let start = cursor;
        let end = cursor + count - 1;
        if end >= total_words {
            return None;
        }

        ranges.push((start, end));
        cursor = end + 1;
    }

    if cursor != total_words {
        return None;
    }
    Some(ranges)
}

/// Rebuild both tracks of a candidate from its verification texts.
///
/// Both tracks must recover and must agree on the segment count; the
/// verification texts themselves are carried over unchanged.
pub fn recover_from_verification_texts(
    input: &CoSegmentationInput,
    candidate: &SegmentationCandidate,
) -> Option<SegmentationCandidate> {
    let hebrew_texts = candidate.texts(Track::Hebrew)?;
    let english_texts = candidate.texts(Track::English)?;

    let hebrew = ranges_from_segment_texts(&input.hebrew_text, hebrew_texts)?;
    let english = ranges_from_segment_texts(&input.english_text, english_texts)?;
    if hebrew.len() != english.len() {
        return None;
    }

    Some(SegmentationCandidate {
        hebrew_segments: hebrew,
        english_segments: english,
        ..candidate.clone()
    })
}

/// Fix the final range of a contiguous chain against the real word count.
///
/// Applies only when the chain starts at 0, every range has `start <= end`,
/// and each range starts one past the previous end. Then an exclusive-style
/// final end (`== word_count`) is pulled back to the last word, and a final
/// end that stops short is extended to it. Applying it twice changes nothing.
pub fn normalize_trailing_coverage(ranges: &[WordRange], word_count: usize) -> Vec<WordRange> {
    if word_count == 0 || !is_contiguous_from_zero(ranges) {
        return ranges.to_vec();
    }

    let target = word_count - 1;
    let mut fixed = ranges.to_vec();
    if let Some(last) = fixed.last_mut() {
        if last.1 == word_count || last.1 < target {
            log::debug!(
                "normalizing trailing range end {} -> {} ({} words)",
                last.1,
                target,
                word_count
            );
            last.1 = target;
        }
    }
    fixed
}

fn is_contiguous_from_zero(ranges: &[WordRange]) -> bool {
    match ranges.first() {
        Some(&(0, _)) => {}
        _ => return false,
    }
    if ranges.iter().any(|&(start, end)| start > end) {
        return false;
    }
    ranges
        .windows(2)
        .all(|pair| pair[0].1.checked_add(1) == Some(pair[1].0))
}
