//! The seam to the external text generator, and the prompts sent through it.
//!
//! The generator is a black box: it receives a [`GenerationRequest`] and
//! returns raw text. Everything it returns is treated as untrusted and goes
//! through the candidate parser or the marker parser before use.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{CoSegmentationInput, Language, SegmentationCandidate, SegmentationConfig, TextType};
use crate::tokenize::{indexed_word_list, word_count};

/// System message for co-segmentation requests.
pub const SYSTEM_PROMPT: &str =
    "You segment parallel Hebrew-English text. Return only valid JSON that matches the schema exactly.";

/// System message for single-text boundary-marker requests.
pub const MARKER_SYSTEM_PROMPT: &str =
    "You insert phrase boundary markers into text. Never add, remove or change any other character.";

const OUTPUT_SHAPE_EXAMPLE: &str = r#"{"hebrew_segments":[[0,2],[3,4]],"english_segments":[[0,4],[5,7]],"hebrew_texts":["...","..."],"english_texts":["...","..."]}"#;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),
    #[error("No scripted response left")]
    ScriptExhausted,
}

/// One call to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub system: String,
    pub prompt: String,
    /// Strict JSON schema for constrained output, when the caller has one
    pub response_schema: Option<Value>,
}

/// Anything that turns a prompt into text.
///
/// Implementors own transport, authentication, timeouts and cancellation.
/// `Sync` is required because consensus passes call the same generator from
/// several rayon workers at once.
pub trait Generator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        (**self).generate(request)
    }
}

/// Primary co-segmentation prompt: rules, word counts, indexed word lists
/// for both tracks and the expected JSON shape.
pub fn build_prompt(input: &CoSegmentationInput) -> String {
    let hebrew_words = word_count(&input.hebrew_text);
    let english_words = word_count(&input.english_text);

    [
        "Segment both texts into aligned phrase units using word-index ranges.".to_string(),
        "Return ONLY JSON.".to_string(),
        String::new(),
        "Rules:".to_string(),
        "1) Preserve source text exactly; do not rewrite text.".to_string(),
        "2) Use contiguous ranges that cover all words exactly once.".to_string(),
        "3) Use inclusive word ranges: [startIndex, endIndex].".to_string(),
        "4) Keep strict 1:1 segment counts between Hebrew and English.".to_string(),
        "5) Also return hebrew_texts and english_texts arrays with exact segment substrings in order."
            .to_string(),
        "6) Never split inside a word token.".to_string(),
        String::new(),
        format!(
            "Hebrew word count: {} (valid word indices 0..{})",
            hebrew_words,
            hebrew_words.saturating_sub(1)
        ),
        format!(
            "English word count: {} (valid word indices 0..{})",
            english_words,
            english_words.saturating_sub(1)
        ),
        String::new(),
        "Hebrew indexed words:".to_string(),
        indexed_word_list(&input.hebrew_text),
        String::new(),
        "English indexed words:".to_string(),
        indexed_word_list(&input.english_text),
        String::new(),
        "JSON shape:".to_string(),
        OUTPUT_SHAPE_EXAMPLE.to_string(),
    ]
    .join("\n")
}

/// Follow-up prompt carrying the last error and the previous payload verbatim.
pub fn build_repair_prompt(
    input: &CoSegmentationInput,
    previous: &SegmentationCandidate,
    error: &str,
) -> String {
    // Serializing a plain struct of numbers and strings cannot fail
    let previous_json = serde_json::to_string(previous).unwrap_or_default();

    [
        "Your previous JSON failed validation.".to_string(),
        format!("Validation error: {}", error),
        String::new(),
        "Fix the segmentation JSON. Keep strict contiguous coverage and 1:1 segment count."
            .to_string(),
        "Return ONLY corrected JSON.".to_string(),
        String::new(),
        "Hebrew indexed words:".to_string(),
        indexed_word_list(&input.hebrew_text),
        String::new(),
        "English indexed words:".to_string(),
        indexed_word_list(&input.english_text),
        String::new(),
        "Previous JSON:".to_string(),
        previous_json,
    ]
    .join("\n")
}

/// Single-text prompt asking for a copy of `text` with boundary markers.
pub fn build_boundary_markers_prompt(text: &str, config: &SegmentationConfig) -> String {
    let label = match config.language {
        Language::Hebrew => "Hebrew",
        Language::English => "English",
    };

    let mut prompt = format!(
        "{}: {}\n\nTask: Insert {} markers at phrase boundaries. Do not change any original text.\n",
        label, text, config.marker
    );
    if config.text_type == TextType::Talmud {
        prompt.push_str(TALMUD_INSTRUCTIONS);
    }
    prompt.push_str(&format!(
        "\nOutput format: Return the text with {} markers inserted at phrase boundaries.",
        config.marker
    ));
    prompt
}

const TALMUD_INSTRUCTIONS: &str = "
Special instructions for Talmud text:
- Talmud is written in a formulaic, laconic way with much parallelism
- Format parallels with bullet points:
  - A - X
  - B - not X
- Look for typical Talmudic patterns:
  - Speech attributions (R' X said)
  - Question-answer sequences
  - Proof texts and objections
  - Parallel legal cases
";

/// Request for a boundary-marker pass.
pub fn marker_request(text: &str, config: &SegmentationConfig) -> GenerationRequest {
    GenerationRequest {
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: Some(config.max_tokens),
        system: MARKER_SYSTEM_PROMPT.to_string(),
        prompt: build_boundary_markers_prompt(text, config),
        response_schema: None,
    }
}

/// Generator that replays a fixed queue of responses and records every
/// request it receives.
///
/// Drives the retry loop and the services offline from recorded responses.
/// Once the queue is empty every call fails with
/// [`GeneratorError::ScriptExhausted`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GeneratorError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failure to be returned by the next unanswered call.
    pub fn push_error(&self, error: GeneratorError) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(response.into()));
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(GeneratorError::ScriptExhausted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_counts_and_indices() {
        let input = CoSegmentationInput::new("א ב ג", "a b c d e");
        let prompt = build_prompt(&input);

        assert!(prompt.contains("Hebrew word count: 3 (valid word indices 0..2)"));
        assert!(prompt.contains("English word count: 5 (valid word indices 0..4)"));
        assert!(prompt.contains("[0]א [1]ב [2]ג"));
        assert!(prompt.contains("[4]e"));
        assert!(prompt.contains("\"hebrew_segments\""));
    }

    #[test]
    fn test_prompt_handles_empty_text() {
        let input = CoSegmentationInput::new("", "a");
        let prompt = build_prompt(&input);
        assert!(prompt.contains("Hebrew word count: 0 (valid word indices 0..0)"));
    }

    #[test]
    fn test_repair_prompt_carries_error_and_payload() {
        let input = CoSegmentationInput::new("א ב", "a b");
        let previous = SegmentationCandidate {
            hebrew_segments: vec![(0, 0)],
            english_segments: vec![(0, 1)],
            hebrew_texts: None,
            english_texts: None,
        };
        let prompt = build_repair_prompt(&input, &previous, "Invalid hebrew_segments: boom");

        assert!(prompt.starts_with("Your previous JSON failed validation."));
        assert!(prompt.contains("Validation error: Invalid hebrew_segments: boom"));
        assert!(prompt.ends_with(r#"{"hebrew_segments":[[0,0]],"english_segments":[[0,1]]}"#));
    }

    #[test]
    fn test_marker_prompt_talmud_instructions() {
        let config = SegmentationConfig::default();
        let prompt = build_boundary_markers_prompt("R' Yochanan said", &config);
        assert!(prompt.starts_with("English: R' Yochanan said"));
        assert!(prompt.contains("Insert | markers"));
        assert!(prompt.contains("Special instructions for Talmud text"));

        let biblical = SegmentationConfig {
            text_type: TextType::Biblical,
            language: Language::Hebrew,
            ..SegmentationConfig::default()
        };
        let prompt = build_boundary_markers_prompt("יְהִי אוֹר", &biblical);
        assert!(prompt.starts_with("Hebrew: "));
        assert!(!prompt.contains("Talmud"));
    }

    #[test]
    fn test_scripted_generator_replays_in_order() {
        let generator = ScriptedGenerator::new(["first", "second"]);
        generator.push_error(GeneratorError::Timeout(30));
        let request = marker_request("a b", &SegmentationConfig::default());

        assert_eq!(generator.generate(&request).unwrap(), "first");
        assert_eq!(generator.generate(&request).unwrap(), "second");
        assert!(matches!(generator.generate(&request), Err(GeneratorError::Timeout(30))));
        assert!(matches!(generator.generate(&request), Err(GeneratorError::ScriptExhausted)));
        assert_eq!(generator.requests().len(), 4);
    }
}
