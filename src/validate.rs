//! Structural validation of a finished [`SegmentationResult`].
//!
//! Unlike the exact integrity gate used on the word-range path, these checks
//! tolerate whitespace differences (marker-based segments are trimmed) and
//! report every problem found as a [`ValidationError`] record.

use serde::{Deserialize, Serialize};

use crate::models::{SegmentationResult, TextSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    TextMismatch,
    ChecksumFailure,
    InvalidBoundaries,
    OverlappingSegments,
    MissingSegments,
    MalformedOutput,
}

/// A single problem found in a segmentation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<TextSegment>,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            position: None,
            segment: None,
        }
    }

    fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    fn with_segment(mut self, segment: &TextSegment) -> Self {
        self.segment = Some(segment.clone());
        self
    }
}

/// Run every structural check and collect the failures.
pub fn validate_segmentation(result: &SegmentationResult) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(validate_text_integrity(result));
    errors.extend(validate_segment_consistency(result));
    errors.extend(validate_boundaries(result));
    errors
}

/// Whitespace-normalized text comparison plus checksum recomputation.
pub fn validate_text_integrity(result: &SegmentationResult) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let original = normalize_whitespace(&result.original_text);
    let reconstructed = normalize_whitespace(
        &result
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );

    if original != reconstructed {
        errors.push(ValidationError::new(
            ValidationErrorKind::TextMismatch,
            format!(
                "Text integrity failed. Original: \"{}...\", Reconstructed: \"{}...\"",
                preview(&original, 100),
                preview(&reconstructed, 100)
            ),
        ));
    }

    if checksum(&result.original_text) != result.checksum {
        errors.push(ValidationError::new(
            ValidationErrorKind::ChecksumFailure,
            "Checksum validation failed - text may have been modified".to_string(),
        ));
    }

    errors
}

/// Overlaps, gaps holding real text, and segments outside the text.
pub fn validate_segment_consistency(result: &SegmentationResult) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let text = &result.original_text;

    for pair in result.segments.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);

        if current.end > next.start {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::OverlappingSegments,
                    format!(
                        "Segments {} and {} overlap ({} > {})",
                        current.id, next.id, current.end, next.start
                    ),
                )
                .with_segment(current),
            );
        } else if current.end < next.start {
            let gap = text.get(current.end..next.start).unwrap_or("");
            if !gap.trim().is_empty() {
                errors.push(
                    ValidationError::new(
                        ValidationErrorKind::MissingSegments,
                        format!(
                            "Gap between segments {} and {}: \"{}\"",
                            current.id, next.id, gap
                        ),
                    )
                    .at(current.end),
                );
            }
        }
    }

    for segment in &result.segments {
        if segment.start > segment.end || segment.end > text.len() {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidBoundaries,
                    format!(
                        "Segment {} has invalid boundaries ({}, {})",
                        segment.id, segment.start, segment.end
                    ),
                )
                .with_segment(segment),
            );
        }
    }

    errors
}

/// Boundary positions must be inside the text and must not split a word.
pub fn validate_boundaries(result: &SegmentationResult) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(boundaries) = &result.boundaries else {
        return errors;
    };
    let text = &result.original_text;

    for boundary in boundaries {
        let position = boundary.position;
        if position > text.len() || !text.is_char_boundary(position) {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidBoundaries,
                    format!("Boundary at position {} is out of bounds", position),
                )
                .at(position),
            );
            continue;
        }

        let before = text[..position].chars().next_back();
        let after = text[position..].chars().next();
        if let (Some(before), Some(after)) = (before, after) {
            if is_word_character(before) && is_word_character(after) {
                errors.push(
                    ValidationError::new(
                        ValidationErrorKind::InvalidBoundaries,
                        format!("Boundary at position {} splits a word", position),
                    )
                    .at(position),
                );
            }
        }
    }

    errors
}

/// Letters, digits, underscore, and the Hebrew block (including points).
pub fn is_word_character(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ('\u{0590}'..='\u{05FF}').contains(&ch)
}

/// 32-bit rolling hash (`h * 31 + unit`) over UTF-16 code units, as a
/// signed decimal string.
pub fn checksum(text: &str) -> String {
    let hash = text
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
    hash.to_string()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Boundary, Language, ResultMetadata, TextType};

    fn result_with(text: &str, segments: Vec<TextSegment>) -> SegmentationResult {
        SegmentationResult {
            original_text: text.to_string(),
            checksum: checksum(text),
            segments,
            boundaries: None,
            metadata: ResultMetadata {
                model: "test".to_string(),
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                validation_passed: true,
                language: Language::English,
                text_type: TextType::Talmud,
                parallel_structures: None,
            },
        }
    }

    #[test]
    fn test_checksum_known_values() {
        assert_eq!(checksum(""), "0");
        assert_eq!(checksum("a"), "97");
        assert_eq!(checksum("ab"), (97 * 31 + 98).to_string());
    }

    #[test]
    fn test_checksum_wraps_to_signed() {
        let long = "The quick brown fox jumps over the lazy dog";
        let value: i64 = checksum(long).parse().unwrap();
        assert!(value >= i32::MIN as i64 && value <= i32::MAX as i64);
    }

    #[test]
    fn test_trimmed_segments_pass() {
        let text = "And God said, Let there be light.";
        let segments = vec![
            TextSegment::new(1, 0, 13, "And God said,"),
            TextSegment::new(2, 14, text.len(), "Let there be light."),
        ];
        assert!(validate_segmentation(&result_with(text, segments)).is_empty());
    }

    #[test]
    fn test_detects_text_mismatch() {
        let segments = vec![TextSegment::new(1, 0, 5, "hello")];
        let errors = validate_segmentation(&result_with("hello world", segments));
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::TextMismatch));
    }

    #[test]
    fn test_detects_checksum_failure() {
        let mut result = result_with("abc", vec![TextSegment::new(1, 0, 3, "abc")]);
        result.checksum = "1".to_string();
        let errors = validate_segmentation(&result);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ChecksumFailure);
    }

    #[test]
    fn test_detects_overlap_and_gap() {
        let text = "aa bb cc dd";
        let overlapping = vec![TextSegment::new(1, 0, 5, "aa bb"), TextSegment::new(2, 3, 11, "bb cc dd")];
        let errors = validate_segment_consistency(&result_with(text, overlapping));
        assert_eq!(errors[0].kind, ValidationErrorKind::OverlappingSegments);

        let gapped = vec![TextSegment::new(1, 0, 2, "aa"), TextSegment::new(2, 6, 11, "cc dd")];
        let errors = validate_segment_consistency(&result_with(text, gapped));
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingSegments);
        assert_eq!(errors[0].position, Some(2));
    }

    #[test]
    fn test_detects_out_of_bounds_segment() {
        let errors = validate_segment_consistency(&result_with("ab", vec![TextSegment::new(1, 0, 9, "ab")]));
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidBoundaries);
    }

    #[test]
    fn test_detects_mid_word_boundary() {
        let text = "שלום עולם";
        let mut result = result_with(text, vec![TextSegment::new(1, 0, text.len(), text)]);
        // inside the first word, on a char boundary
        result.boundaries = Some(vec![Boundary::phrase(4, None), Boundary::phrase(8, None)]);
        let errors = validate_boundaries(&result);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].position, Some(4));
    }

    #[test]
    fn test_rejects_boundary_inside_char() {
        let text = "שלום";
        let mut result = result_with(text, vec![TextSegment::new(1, 0, text.len(), text)]);
        result.boundaries = Some(vec![Boundary::phrase(1, None), Boundary::phrase(99, None)]);
        let errors = validate_boundaries(&result);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::InvalidBoundaries));
    }
}
