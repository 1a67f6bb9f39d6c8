//! Word-index range validation.
//!
//! A range list is accepted only when it partitions `0..word_count` into
//! ordered, contiguous, non-empty inclusive ranges. Nothing is clipped: a
//! list that fails any check is rejected with every violation listed.

use crate::models::WordRange;
use thiserror::Error;

/// Result of checking a range list against a word count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("Boundary index {index} out of range (must be below {limit})")]
    BoundaryOutOfRange { index: usize, limit: usize },
    #[error("Boundary indices must be strictly increasing ({previous} then {index})")]
    BoundaryNotIncreasing { previous: usize, index: usize },
    #[error("Range {range} [{start}, {end}] has start > end")]
    InvertedRange { range: usize, start: usize, end: usize },
    #[error("Word index {index} out of range for {word_count} words")]
    WordIndexOutOfRange { index: usize, word_count: usize },
    #[error("Range {range} begins before the range preceding it")]
    OutOfOrder { range: usize },
}

/// Validate ranges against the number of words in the text.
pub fn validate_word_ranges(ranges: &[WordRange], word_count: usize) -> RangeValidation {
    let mut errors = Vec::new();

    // (a) presence
    if word_count > 0 && ranges.is_empty() {
        errors.push(format!(
            "No ranges supplied for {} words (expected coverage of 0..{})",
            word_count,
            word_count - 1
        ));
    }
    if word_count == 0 && !ranges.is_empty() {
        errors.push(format!(
            "Text has no words but {} ranges were supplied",
            ranges.len()
        ));
    }

    // (b) ordering and bounds within each range
    for (i, &(start, end)) in ranges.iter().enumerate() {
        if start > end {
            errors.push(format!("Range {} [{}, {}] has start > end", i, start, end));
        }
        if word_count > 0 && end >= word_count {
            errors.push(format!(
                "Range {} [{}, {}] exceeds last word index {}",
                i,
                start,
                end,
                word_count - 1
            ));
        }
    }

    // (c) first range
    if let Some(&(first_start, _)) = ranges.first() {
        if word_count > 0 && first_start != 0 {
            errors.push(format!("First range starts at {}; expected 0", first_start));
        }
    }

    // (d) contiguity
    for (i, pair) in ranges.windows(2).enumerate() {
        let (_, prev_end) = pair[0];
        let (start, _) = pair[1];
        let expected = prev_end.saturating_add(1);
        if start != expected {
            errors.push(format!(
                "Range {} starts at {}, expected {} (must follow range {} without gap or overlap)",
                i + 1,
                start,
                expected,
                i
            ));
        }
    }

    // (e) coverage
    if let Some(&(_, last_end)) = ranges.last() {
        if word_count > 0 && last_end != word_count - 1 {
            errors.push(format!(
                "Last range ends at {}; expected {} (full coverage of {} words)",
                last_end,
                word_count - 1,
                word_count
            ));
        }
    }

    RangeValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Convert "last word of a segment" indices into contiguous ranges.
///
/// `[2, 5]` over 7 words gives `[0,2] [3,5] [6,6]`. Every index must be
/// below `word_count - 1` (a boundary after the last word would leave an
/// empty final segment) and the indices must strictly increase.
pub fn boundaries_to_word_ranges(
    boundary_word_indices: &[usize],
    word_count: usize,
) -> Result<Vec<WordRange>, RangeError> {
    if word_count == 0 {
        return match boundary_word_indices.first() {
            Some(&index) => Err(RangeError::BoundaryOutOfRange { index, limit: 0 }),
            None => Ok(Vec::new()),
        };
    }

    let limit = word_count - 1;
    let mut ranges = Vec::with_capacity(boundary_word_indices.len() + 1);
    let mut start = 0usize;
    let mut previous: Option<usize> = None;

    for &index in boundary_word_indices {
        if index >= limit {
            return Err(RangeError::BoundaryOutOfRange { index, limit });
        }
        if let Some(prev) = previous {
            if index <= prev {
                return Err(RangeError::BoundaryNotIncreasing {
                    previous: prev,
                    index,
                });
            }
        }
        ranges.push((start, index));
        start = index + 1;
        previous = Some(index);
    }

    ranges.push((start, limit));
    Ok(ranges)
}
