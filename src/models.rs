//! Data structures for the segmentation and alignment pipeline.

use serde::{Deserialize, Serialize};

/// A single word of the source text with its byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    pub index: usize,
    pub token: String,
    pub start: usize, // Byte offset of the first char
    pub end: usize,   // Byte offset one past the last char
}

/// Inclusive `[start_index, end_index]` pair of word indices.
pub type WordRange = (usize, usize);

/// Which text of a bilingual pair a range list or segment list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Hebrew,
    English,
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Track::Hebrew => write!(f, "hebrew"),
            Track::English => write!(f, "english"),
        }
    }
}

/// Language of a single text, used for prompts and type inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hebrew,
    #[default]
    English,
}

impl From<Track> for Language {
    fn from(track: Track) -> Self {
        match track {
            Track::Hebrew => Language::Hebrew,
            Track::English => Language::English,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    #[default]
    Talmud,
    Biblical,
    Commentary,
}

/// Phrase categories attached to segments (Talmud structure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    SpeechAttribution,
    ImperativeClause,
    ResultClause,
    TemporalPhrase,
    SubjectPhrase,
    VerbPhrase,
    ObjectPhrase,
    Quotation,
    ParallelA,
    ParallelB,
    Commentary,
    Question,
    Answer,
    Proof,
    Objection,
    Resolution,
}

/// A contiguous slice of the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    pub id: u32,
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub segment_type: Option<SegmentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_parallel: Option<bool>,
}

impl TextSegment {
    /// Plain segment with no type, confidence or parallel marker
    pub fn new(id: u32, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end,
            text: text.into(),
            segment_type: None,
            confidence: None,
            is_parallel: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    #[default]
    Phrase,
    Clause,
    Sentence,
    Parallel,
}

/// A proposed split point, as a byte offset into the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub position: usize,
    #[serde(rename = "type")]
    pub boundary_type: BoundaryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Boundary {
    pub fn phrase(position: usize, confidence: Option<f32>) -> Self {
        Self {
            position,
            boundary_type: BoundaryType::Phrase,
            confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallelType {
    Contrast,
    Enumeration,
    Elaboration,
}

/// Adjacent segments forming a parallel structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelStructure {
    pub segments: Vec<u32>, // Segment ids
    #[serde(rename = "type")]
    pub parallel_type: ParallelType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub model: String,
    pub timestamp: String,
    pub validation_passed: bool,
    pub language: Language,
    pub text_type: TextType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_structures: Option<Vec<ParallelStructure>>,
}

/// A finished segmentation of one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    pub original_text: String,
    pub checksum: String,
    pub segments: Vec<TextSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<Vec<Boundary>>,
    pub metadata: ResultMetadata,
}

/// One pass's vote for a boundary position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryVote {
    pub model: String,
    pub boundary: Boundary,
}

/// A boundary position that did not receive a unanimous vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictingBoundary {
    pub position: usize,
    pub votes: Vec<BoundaryVote>,
}

/// Outcome of a multi-pass consensus run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusResult {
    pub final_segmentation: SegmentationResult,
    pub agreement_level: f32,
    pub pass_results: Vec<SegmentationResult>,
    pub conflicting_boundaries: Vec<ConflictingBoundary>,
}

/// Untrusted co-segmentation payload exactly as the generator returned it.
///
/// Use [`crate::candidate::parse_candidate`] to obtain one; deserializing
/// directly skips the structural checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentationCandidate {
    pub hebrew_segments: Vec<WordRange>,
    pub english_segments: Vec<WordRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hebrew_texts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_texts: Option<Vec<String>>,
}

impl SegmentationCandidate {
    pub fn ranges(&self, track: Track) -> &[WordRange] {
        match track {
            Track::Hebrew => &self.hebrew_segments,
            Track::English => &self.english_segments,
        }
    }

    pub fn texts(&self, track: Track) -> Option<&[String]> {
        match track {
            Track::Hebrew => self.hebrew_texts.as_deref(),
            Track::English => self.english_texts.as_deref(),
        }
    }
}

/// The two texts of a bilingual passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoSegmentationInput {
    pub hebrew_text: String,
    pub english_text: String,
}

impl CoSegmentationInput {
    pub fn new(hebrew_text: impl Into<String>, english_text: impl Into<String>) -> Self {
        Self {
            hebrew_text: hebrew_text.into(),
            english_text: english_text.into(),
        }
    }

    pub fn text(&self, track: Track) -> &str {
        match track {
            Track::Hebrew => &self.hebrew_text,
            Track::English => &self.english_text,
        }
    }
}

/// Validated, aligned segmentation of a bilingual passage.
///
/// `raw` is the accepted payload after any silent repairs, so callers can
/// audit what was corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoSegmentation {
    pub hebrew_segments: Vec<TextSegment>,
    pub english_segments: Vec<TextSegment>,
    pub raw: SegmentationCandidate,
}

/// Parameters for a single-text segmentation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub language: Language,
    pub text_type: TextType,
    pub enable_parallel_detection: bool,
    pub marker: char, // Boundary marker the generator inserts
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            language: Language::English,
            text_type: TextType::Talmud,
            enable_parallel_detection: true,
            marker: '|',
        }
    }
}

/// Parameters for the bilingual retry orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoSegmentationOptions {
    pub model: String,
    pub temperature: f32,
    pub max_attempts: usize,
}

impl Default for CoSegmentationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_attempts: 2,
        }
    }
}

impl CoSegmentationOptions {
    /// Defaults, with the model taken from `SEGMENTATION_MODEL` when set.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(model) = std::env::var("SEGMENTATION_MODEL") {
            if !model.trim().is_empty() {
                options.model = model;
            }
        }
        options
    }
}

/// Parameters for multi-pass consensus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusParams {
    pub pass_count: usize,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self { pass_count: 3 }
    }
}

/// Thresholds for merging short and splitting long segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessParams {
    pub min_length: usize, // In chars of trimmed text
    pub max_length: usize, // In chars
}

impl Default for PostProcessParams {
    fn default() -> Self {
        Self {
            min_length: 15,
            max_length: 200,
        }
    }
}

/// One line of a batch audit file: both texts plus the recorded payload.
///
/// `payload` is either the payload object itself or the generator's raw
/// response as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub hebrew_text: String,
    pub english_text: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Accepted,
    Rejected,
}

/// Validation outcome of one batch line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub line: usize, // 1-based line in the input file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<crate::error::ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub segment_count: usize,
    pub repaired: bool, // Accepted payload differs from the recorded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CoSegmentation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub generated_at: String,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub repaired: usize,
    pub outcomes: Vec<BatchOutcome>,
}
