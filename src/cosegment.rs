//! Bounded retry loop around the generator for bilingual co-segmentation.

use crate::align::validate_co_segmentation;
use crate::candidate::{co_segmentation_json_schema, parse_candidate};
use crate::error::{Result, SegmentError};
use crate::generate::{build_prompt, build_repair_prompt, GenerationRequest, Generator, SYSTEM_PROMPT};
use crate::models::{CoSegmentation, CoSegmentationInput, CoSegmentationOptions, SegmentationCandidate};

/// Ask the generator for a co-segmentation and validate it, retrying with a
/// repair prompt up to `options.max_attempts` times.
///
/// Empty responses and parse or validation failures are retried. A transport
/// error from the generator is returned immediately.
pub fn co_segment<G: Generator + ?Sized>(
    generator: &G,
    input: &CoSegmentationInput,
    options: &CoSegmentationOptions,
) -> Result<CoSegmentation> {
    let schema = co_segmentation_json_schema();
    let mut last_error = String::from("Unknown segmentation error.");
    let mut last_parsed: Option<SegmentationCandidate> = None;

    for attempt in 1..=options.max_attempts {
        let prompt = match &last_parsed {
            Some(previous) if attempt > 1 => build_repair_prompt(input, previous, &last_error),
            _ => build_prompt(input),
        };

        let request = GenerationRequest {
            model: options.model.clone(),
            temperature: options.temperature,
            max_tokens: None,
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            response_schema: Some(schema.clone()),
        };

        let content = generator.generate(&request)?;
        if content.trim().is_empty() {
            last_error = String::from("Generator returned empty segmentation response.");
            log::warn!("attempt {}/{}: {}", attempt, options.max_attempts, last_error);
            continue;
        }

        let outcome = parse_candidate(&content).and_then(|candidate| {
            last_parsed = Some(candidate.clone());
            validate_co_segmentation(input, &candidate)
        });

        match outcome {
            Ok(result) => {
                log::info!(
                    "co-segmentation accepted on attempt {} ({} segments)",
                    attempt,
                    result.hebrew_segments.len()
                );
                return Ok(result);
            }
            Err(e) => {
                log::warn!("attempt {}/{} rejected: {}", attempt, options.max_attempts, e);
                last_error = e.to_string();
            }
        }
    }

    Err(SegmentError::AttemptsExhausted {
        attempts: options.max_attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::generate::{GeneratorError, ScriptedGenerator};

    const GOOD: &str = r#"{"hebrew_segments":[[0,1],[2,3]],"english_segments":[[0,1],[2,3]]}"#;
    const GAP: &str = r#"{"hebrew_segments":[[0,0],[2,3]],"english_segments":[[0,1],[2,3]]}"#;

    fn input() -> CoSegmentationInput {
        CoSegmentationInput::new("א ב ג ד", "a b c d")
    }

    #[test]
    fn test_first_attempt_accepted() {
        let generator = ScriptedGenerator::new([GOOD]);
        let result = co_segment(&generator, &input(), &CoSegmentationOptions::default()).unwrap();

        assert_eq!(result.hebrew_segments.len(), 2);
        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[0].system, SYSTEM_PROMPT);
        assert!(requests[0].response_schema.is_some());
    }

    #[test]
    fn test_repair_prompt_after_validation_failure() {
        let generator = ScriptedGenerator::new([GAP, GOOD]);
        let result = co_segment(&generator, &input(), &CoSegmentationOptions::default()).unwrap();

        assert_eq!(result.raw.hebrew_segments, vec![(0, 1), (2, 3)]);
        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].prompt.contains("Validation error: Invalid hebrew_segments"));
        assert!(requests[1].prompt.contains(GAP));
    }

    #[test]
    fn test_primary_prompt_resent_when_nothing_parsed() {
        let generator = ScriptedGenerator::new(["not json", GOOD]);
        co_segment(&generator, &input(), &CoSegmentationOptions::default()).unwrap();

        let requests = generator.requests();
        assert_eq!(requests[0].prompt, requests[1].prompt);
    }

    #[test]
    fn test_exhaustion_reports_last_error() {
        let generator = ScriptedGenerator::new(["", GAP]);
        let err = co_segment(&generator, &input(), &CoSegmentationOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AttemptsExhausted);
        let message = err.to_string();
        assert!(message.starts_with("Co-segmentation failed after 2 attempts. Last error: "));
        assert!(message.contains("Invalid hebrew_segments"));
    }

    #[test]
    fn test_empty_response_is_retried() {
        let generator = ScriptedGenerator::new(["   ", GOOD]);
        assert!(co_segment(&generator, &input(), &CoSegmentationOptions::default()).is_ok());
    }

    #[test]
    fn test_transport_error_propagates() {
        let generator = ScriptedGenerator::default();
        generator.push_error(GeneratorError::Transport("connection reset".to_string()));
        generator.push_response(GOOD);

        let err = co_segment(&generator, &input(), &CoSegmentationOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generator);
        assert_eq!(generator.requests().len(), 1);
    }

    #[test]
    fn test_max_attempts_respected() {
        let generator = ScriptedGenerator::new([GAP, GAP, GAP, GOOD]);
        let options = CoSegmentationOptions {
            max_attempts: 3,
            ..CoSegmentationOptions::default()
        };
        let err = co_segment(&generator, &input(), &options).unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
        assert_eq!(generator.requests().len(), 3);
    }
}
