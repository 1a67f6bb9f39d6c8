//! Cross-language alignment of Hebrew and English segmentations.
//!
//! Segment *i* of one language corresponds to segment *i* of the other, so
//! both tracks must yield the same number of segments. A count mismatch is a
//! hard failure: truncating or padding would silently corrupt the pairing.

use crate::error::{Result, SegmentError};
use crate::models::{
    CoSegmentation, CoSegmentationInput, SegmentationCandidate, TextSegment, Track, WordRange,
};
use crate::ranges::validate_word_ranges;
use crate::recover::{normalize_trailing_coverage, recover_from_verification_texts};
use crate::segments::{build_segments_from_word_ranges, validate_segmentation_integrity};
use crate::tokenize::word_count;

/// Require both segment lists to have the same length.
pub fn check_segment_counts(hebrew: &[TextSegment], english: &[TextSegment]) -> Result<()> {
    check_counts(hebrew.len(), english.len())
}

fn check_counts(hebrew: usize, english: usize) -> Result<()> {
    if hebrew != english {
        return Err(SegmentError::SegmentCountMismatch { hebrew, english });
    }
    Ok(())
}

/// Validate an untrusted candidate against both texts and build the aligned
/// segments.
///
/// Order of operations: verification-text recovery (used only when the
/// candidate's own ranges are unusable), trailing-coverage normalization,
/// range validation per track, count alignment, segment building, exact
/// integrity check per track. The returned `raw` payload carries whatever
/// repairs were applied.
pub fn validate_co_segmentation(
    input: &CoSegmentationInput,
    candidate: &SegmentationCandidate,
) -> Result<CoSegmentation> {
    let hebrew_words = word_count(&input.hebrew_text);
    let english_words = word_count(&input.english_text);

    let effective = if ranges_usable(candidate, hebrew_words, english_words) {
        candidate.clone()
    } else {
        match recover_from_verification_texts(input, candidate) {
            Some(recovered) => {
                log::debug!("recovered word ranges from verification texts");
                recovered
            }
            None => candidate.clone(),
        }
    };

    let hebrew_ranges = normalize_trailing_coverage(&effective.hebrew_segments, hebrew_words);
    let english_ranges = normalize_trailing_coverage(&effective.english_segments, english_words);

    validate_track(Track::Hebrew, &hebrew_ranges, hebrew_words)?;
    validate_track(Track::English, &english_ranges, english_words)?;
    check_counts(hebrew_ranges.len(), english_ranges.len())?;

    let hebrew_segments = build_track(Track::Hebrew, &input.hebrew_text, &hebrew_ranges)?;
    let english_segments = build_track(Track::English, &input.english_text, &english_ranges)?;

    Ok(CoSegmentation {
        hebrew_segments,
        english_segments,
        raw: SegmentationCandidate {
            hebrew_segments: hebrew_ranges,
            english_segments: english_ranges,
            ..effective
        },
    })
}

/// The candidate's own numbers already validate on both tracks and align.
fn ranges_usable(candidate: &SegmentationCandidate, hebrew_words: usize, english_words: usize) -> bool {
    validate_word_ranges(&candidate.hebrew_segments, hebrew_words).is_valid
        && validate_word_ranges(&candidate.english_segments, english_words).is_valid
        && candidate.hebrew_segments.len() == candidate.english_segments.len()
}

fn validate_track(track: Track, ranges: &[WordRange], words: usize) -> Result<()> {
    let validation = validate_word_ranges(ranges, words);
    if !validation.is_valid {
        return Err(SegmentError::InvalidWordRange {
            track,
            errors: validation.errors,
        });
    }
    Ok(())
}

fn build_track(track: Track, text: &str, ranges: &[WordRange]) -> Result<Vec<TextSegment>> {
    let segments = build_segments_from_word_ranges(text, ranges).map_err(|e| {
        SegmentError::InvalidWordRange {
            track,
            errors: vec![e.to_string()],
        }
    })?;

    if !validate_segmentation_integrity(text, &segments) {
        return Err(SegmentError::IntegrityViolation(format!(
            "{} segmentation failed integrity check",
            track
        )));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn joined(segments: &[TextSegment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_validates_and_reconstructs() {
        let input = CoSegmentationInput::new(
            "וַיֹּאמֶר אֱלֹהִים יְהִי אוֹר",
            "And God said, Let there be light.",
        );
        let candidate = SegmentationCandidate {
            hebrew_segments: vec![(0, 1), (2, 3)],
            english_segments: vec![(0, 2), (3, 6)],
            hebrew_texts: Some(strings(&["וַיֹּאמֶר אֱלֹהִים ", "יְהִי אוֹר"])),
            english_texts: Some(strings(&["And God said, ", "Let there be light."])),
        };

        let result = validate_co_segmentation(&input, &candidate).unwrap();
        assert_eq!(result.hebrew_segments.len(), 2);
        assert_eq!(result.english_segments.len(), 2);
        assert_eq!(joined(&result.hebrew_segments), input.hebrew_text);
        assert_eq!(joined(&result.english_segments), input.english_text);
        assert_eq!(result.raw, candidate);
    }

    #[test]
    fn test_count_mismatch_names_both_counts() {
        let input = CoSegmentationInput::new("א ב ג ד", "a b c d");
        let candidate = SegmentationCandidate {
            hebrew_segments: vec![(0, 1), (2, 3)],
            english_segments: vec![(0, 0), (1, 2), (3, 3)],
            hebrew_texts: None,
            english_texts: None,
        };

        let err = validate_co_segmentation(&input, &candidate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SegmentCountMismatch);
        let message = err.to_string();
        assert!(message.contains("Segment count mismatch"));
        assert!(message.contains('2') && message.contains('3'));
    }

    #[test]
    fn test_gap_rejected_when_texts_inexact() {
        let input = CoSegmentationInput::new("א ב ג ד", "a b c d");
        let candidate = SegmentationCandidate {
            hebrew_segments: vec![(0, 0), (2, 3)],
            english_segments: vec![(0, 1), (2, 3)],
            hebrew_texts: Some(strings(&["א ", "ג ד"])),
            english_texts: Some(strings(&["a b ", "c d"])),
        };

        let err = validate_co_segmentation(&input, &candidate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWordRange);
        assert!(err.to_string().starts_with("Invalid hebrew_segments"));
        assert!(err.to_string().contains("expected 1"));
    }

    #[test]
    fn test_recovers_wrong_indices_from_texts() {
        let input = CoSegmentationInput::new("א ב ג ד", "a b c d");
        let candidate = SegmentationCandidate {
            hebrew_segments: vec![(0, 0), (2, 3)],
            english_segments: vec![(0, 1), (2, 2)],
            hebrew_texts: Some(strings(&["א ב ", "ג ד"])),
            english_texts: Some(strings(&["a b ", "c d"])),
        };

        let result = validate_co_segmentation(&input, &candidate).unwrap();
        assert_eq!(result.raw.hebrew_segments, vec![(0, 1), (2, 3)]);
        assert_eq!(result.raw.english_segments, vec![(0, 1), (2, 3)]);
        assert_eq!(joined(&result.hebrew_segments), input.hebrew_text);
        assert_eq!(joined(&result.english_segments), input.english_text);
    }

    #[test]
    fn test_no_recovery_from_inexact_texts() {
        let input = CoSegmentationInput::new("א ב ג ד", "a b c d");
        let candidate = SegmentationCandidate {
            hebrew_segments: vec![(0, 0), (2, 3)],
            english_segments: vec![(0, 1), (2, 2)],
            hebrew_texts: Some(strings(&["א ב", "ג ד"])),
            english_texts: Some(strings(&["a b", "c d"])),
        };

        let err = validate_co_segmentation(&input, &candidate).unwrap_err();
        assert!(err.to_string().starts_with("Invalid hebrew_segments"));
    }

    #[test]
    fn test_trailing_under_coverage_repaired() {
        let input = CoSegmentationInput::new("א ב ג ד ה", "a b c d e");
        let candidate = SegmentationCandidate {
            hebrew_segments: vec![(0, 1), (2, 3)],
            english_segments: vec![(0, 1), (2, 3)],
            hebrew_texts: None,
            english_texts: None,
        };

        let result = validate_co_segmentation(&input, &candidate).unwrap();
        assert_eq!(result.raw.hebrew_segments, vec![(0, 1), (2, 4)]);
        assert_eq!(result.raw.english_segments, vec![(0, 1), (2, 4)]);
        assert_eq!(joined(&result.hebrew_segments), input.hebrew_text);
        assert_eq!(joined(&result.english_segments), input.english_text);
    }

    #[test]
    fn test_valid_numbers_win_over_disagreeing_texts() {
        let input = CoSegmentationInput::new("א ב ג ד", "a b c d");
        let candidate = SegmentationCandidate {
            hebrew_segments: vec![(0, 0), (1, 3)],
            english_segments: vec![(0, 0), (1, 3)],
            hebrew_texts: Some(strings(&["א ב ", "ג ד"])),
            english_texts: Some(strings(&["a b ", "c d"])),
        };

        let result = validate_co_segmentation(&input, &candidate).unwrap();
        assert_eq!(result.raw.hebrew_segments, vec![(0, 0), (1, 3)]);
    }

    #[test]
    fn test_count_check_ignores_content() {
        let a = vec![TextSegment::new(1, 0, 1, "x")];
        let b = vec![TextSegment::new(1, 0, 1, "x"), TextSegment::new(2, 1, 2, "y")];
        assert!(check_segment_counts(&a, &b).is_err());
        assert!(check_segment_counts(&b, &a).is_err());
        assert!(check_segment_counts(&a, &a).is_ok());
    }
}
