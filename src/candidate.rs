//! Strict parsing of the generator's co-segmentation payload.
//!
//! The payload is untrusted. It is deserialized into
//! [`SegmentationCandidate`] (unknown fields and non-integer indices are
//! rejected by serde) and then checked for the structural rules serde cannot
//! express. Only a candidate that passes here reaches range validation.

use serde_json::{json, Value};

use crate::error::{Result, SegmentError};
use crate::models::{SegmentationCandidate, Track};

/// Name under which the response schema is registered with the generator.
pub const CO_SEGMENTATION_SCHEMA_NAME: &str = "co_segmentation_word_indices";

/// Parse and structurally check a JSON payload.
pub fn parse_candidate(content: &str) -> Result<SegmentationCandidate> {
    let candidate: SegmentationCandidate = serde_json::from_str(content.trim())?;
    check_candidate_shape(&candidate)?;
    Ok(candidate)
}

/// Structural rules: non-empty range lists, verification texts supplied for
/// both tracks or neither, and one text per range when supplied.
pub fn check_candidate_shape(candidate: &SegmentationCandidate) -> Result<()> {
    for track in [Track::Hebrew, Track::English] {
        if candidate.ranges(track).is_empty() {
            return Err(SegmentError::MalformedPayload(format!(
                "{}_segments must contain at least one range",
                track
            )));
        }
    }

    match (&candidate.hebrew_texts, &candidate.english_texts) {
        (Some(_), None) => {
            return Err(SegmentError::MalformedPayload(
                "hebrew_texts supplied without english_texts".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(SegmentError::MalformedPayload(
                "english_texts supplied without hebrew_texts".to_string(),
            ))
        }
        _ => {}
    }

    for track in [Track::Hebrew, Track::English] {
        if let Some(texts) = candidate.texts(track) {
            if texts.is_empty() {
                return Err(SegmentError::MalformedPayload(format!(
                    "{}_texts must contain at least one entry",
                    track
                )));
            }
            let ranges = candidate.ranges(track).len();
            if texts.len() != ranges {
                return Err(SegmentError::MalformedPayload(format!(
                    "{}_texts length ({}) must equal {}_segments length ({})",
                    track,
                    texts.len(),
                    track,
                    ranges
                )));
            }
        }
    }

    Ok(())
}

/// JSON schema describing the expected response, for generators that
/// support constrained output.
pub fn co_segmentation_json_schema() -> Value {
    let range_list = json!({
        "type": "array",
        "minItems": 1,
        "items": {
            "type": "array",
            "minItems": 2,
            "maxItems": 2,
            "items": { "type": "integer", "minimum": 0 }
        }
    });
    let text_list = json!({
        "type": "array",
        "minItems": 1,
        "items": { "type": "string" }
    });

    json!({
        "name": CO_SEGMENTATION_SCHEMA_NAME,
        "strict": true,
        "schema": {
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "hebrew_segments": range_list,
                "english_segments": range_list,
                "hebrew_texts": text_list,
                "english_texts": text_list
            },
            "required": ["hebrew_segments", "english_segments", "hebrew_texts", "english_texts"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parses_valid_payload() {
        let content = r#"{
            "hebrew_segments": [[0, 1], [2, 3]],
            "english_segments": [[0, 2], [3, 5]],
            "hebrew_texts": ["foo", "bar"],
            "english_texts": ["one", "two"]
        }"#;
        let candidate = parse_candidate(content).unwrap();
        assert_eq!(candidate.hebrew_segments, vec![(0, 1), (2, 3)]);
        assert_eq!(candidate.english_segments.len(), 2);
    }

    #[test]
    fn test_texts_are_optional_as_a_pair() {
        let content = r#"{"hebrew_segments": [[0, 1]], "english_segments": [[0, 1]]}"#;
        let candidate = parse_candidate(content).unwrap();
        assert!(candidate.hebrew_texts.is_none());
        assert!(candidate.english_texts.is_none());
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let content = r#"{"hebrew_boundaries": [1, 2], "english_boundaries": [1, 2]}"#;
        let err = parse_candidate(content).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn test_rejects_lone_hebrew_texts() {
        let content = r#"{
            "hebrew_segments": [[0, 1]],
            "english_segments": [[0, 1]],
            "hebrew_texts": ["א ב"]
        }"#;
        let err = parse_candidate(content).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
        assert!(err.to_string().contains("without english_texts"));
    }

    #[test]
    fn test_rejects_lone_english_texts() {
        let content = r#"{
            "hebrew_segments": [[0, 1]],
            "english_segments": [[0, 1]],
            "english_texts": ["a b"]
        }"#;
        assert!(parse_candidate(content).is_err());
    }

    #[test]
    fn test_rejects_negative_and_fractional_indices() {
        let negative = r#"{"hebrew_segments": [[-1, 1]], "english_segments": [[0, 1]]}"#;
        assert!(parse_candidate(negative).is_err());
        let fractional = r#"{"hebrew_segments": [[0, 1.5]], "english_segments": [[0, 1]]}"#;
        assert!(parse_candidate(fractional).is_err());
    }

    #[test]
    fn test_rejects_bad_range_arity() {
        let content = r#"{"hebrew_segments": [[0, 1, 2]], "english_segments": [[0, 1]]}"#;
        assert!(parse_candidate(content).is_err());
    }

    #[test]
    fn test_rejects_empty_range_lists() {
        let content = r#"{"hebrew_segments": [], "english_segments": [[0, 1]]}"#;
        let err = parse_candidate(content).unwrap_err();
        assert!(err.to_string().contains("hebrew_segments"));
    }

    #[test]
    fn test_rejects_text_count_mismatch() {
        let content = r#"{
            "hebrew_segments": [[0, 1], [2, 3]],
            "english_segments": [[0, 1]],
            "hebrew_texts": ["a"],
            "english_texts": ["b"]
        }"#;
        let err = parse_candidate(content).unwrap_err();
        assert!(err.to_string().contains("hebrew_texts length (1)"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let content = r#"{"hebrew_segments": [[0, 1]], "english_segments": [[0, 1]], "notes": "x"}"#;
        assert!(parse_candidate(content).is_err());
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = co_segmentation_json_schema();
        assert_eq!(schema["name"], CO_SEGMENTATION_SCHEMA_NAME);
        assert_eq!(schema["schema"]["required"].as_array().unwrap().len(), 4);
        assert_eq!(schema["schema"]["additionalProperties"], false);
    }
}
