//! Daf Segment
//!
//! Verified phrase segmentation and Hebrew/English alignment for classical
//! texts. A text generator proposes segment boundaries; this crate turns the
//! untrusted proposal into a partition of the original text that loses,
//! duplicates or reorders nothing, aligns the two languages segment for
//! segment, and reconciles several proposals by boundary voting.
//!
//! # Example
//!
//! ```
//! use daf_segment::prelude::*;
//!
//! let input = CoSegmentationInput::new("וַיֹּאמֶר אֱלֹהִים יְהִי אוֹר", "And God said, Let there be light.");
//! let candidate = parse_candidate(
//!     r#"{"hebrew_segments": [[0, 1], [2, 3]], "english_segments": [[0, 2], [3, 6]]}"#,
//! )
//! .unwrap();
//!
//! let result = validate_co_segmentation(&input, &candidate).unwrap();
//! assert_eq!(result.hebrew_segments.len(), result.english_segments.len());
//! assert_eq!(result.english_segments[0].text, "And God said, ");
//! ```
//!
//! # Retry Example
//!
//! ```no_run
//! use daf_segment::prelude::*;
//!
//! # fn client() -> ScriptedGenerator { ScriptedGenerator::default() }
//! let generator = client();
//! let input = CoSegmentationInput::new("אמר רבי יוחנן", "Rabbi Yochanan said");
//! let options = CoSegmentationOptions::from_env();
//!
//! match co_segment(&generator, &input, &options) {
//!     Ok(result) => println!("{} aligned segments", result.hebrew_segments.len()),
//!     Err(e) => eprintln!("{} ({:?})", e, e.kind()),
//! }
//! ```

pub mod align;
pub mod batch;
pub mod candidate;
pub mod consensus;
pub mod cosegment;
pub mod error;
pub mod generate;
pub mod markers;
pub mod merge;
pub mod models;
pub mod output;
pub mod ranges;
pub mod recover;
pub mod segments;
pub mod service;
pub mod tokenize;
pub mod validate;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::align::{check_segment_counts, validate_co_segmentation};
    pub use crate::batch::{validate_batch, validate_record};
    pub use crate::candidate::{
        check_candidate_shape, co_segmentation_json_schema, parse_candidate, CO_SEGMENTATION_SCHEMA_NAME,
    };
    pub use crate::consensus::{
        calculate_agreement_level, find_boundary_consensus, find_conflicting_boundaries, jaccard_similarity,
        run_consensus, variant_config, ConsensusSegmenter, PassPreset, PASS_PRESETS,
    };
    pub use crate::cosegment::co_segment;
    pub use crate::error::{ErrorKind, SegmentError};
    pub use crate::generate::{
        build_boundary_markers_prompt, build_prompt, build_repair_prompt, marker_request, GenerationRequest,
        Generator, GeneratorError, ScriptedGenerator, SYSTEM_PROMPT,
    };
    pub use crate::markers::{
        detect_parallel_structures, extract_boundaries, infer_segment_type, parallel_pair_type,
        segments_from_boundaries,
    };
    pub use crate::merge::{merge_small_segments, post_process, split_long_segments};
    pub use crate::models::{
        BatchOutcome, BatchRecord, BatchReport, BatchStatus, Boundary, BoundaryType, BoundaryVote, CoSegmentation,
        CoSegmentationInput, CoSegmentationOptions, ConflictingBoundary, ConsensusParams, ConsensusResult,
        Language, ParallelStructure, ParallelType, PostProcessParams, ResultMetadata, SegmentType,
        SegmentationCandidate, SegmentationConfig, SegmentationResult, TextSegment, TextType, Track, WordRange,
        WordSpan,
    };
    pub use crate::output::{
        format_segment, format_talmud_parallels, print_batch_summary, print_co_segmentation,
        print_consensus_summary, print_result_summary, print_segments, write_json, write_json_file,
        write_pairs_csv, write_pairs_csv_file, OutputError,
    };
    pub use crate::ranges::{boundaries_to_word_ranges, validate_word_ranges, RangeError, RangeValidation};
    pub use crate::recover::{normalize_trailing_coverage, ranges_from_segment_texts, recover_from_verification_texts};
    pub use crate::segments::{boundaries_from_segments, build_segments_from_word_ranges, validate_segmentation_integrity};
    pub use crate::service::{build_result, segment_marked_text, SegmentationService};
    pub use crate::tokenize::{get_word_spans, indexed_word_list, word_count};
    pub use crate::validate::{checksum, validate_segmentation, ValidationError, ValidationErrorKind};
}

// Re-export commonly used types at the crate root
pub use error::{ErrorKind, SegmentError};
pub use models::{CoSegmentation, CoSegmentationInput, SegmentationCandidate, SegmentationResult, TextSegment};
