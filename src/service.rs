//! Single-text segmentation through boundary markers.

use crate::error::{Result, SegmentError};
use crate::generate::{marker_request, Generator};
use crate::markers::{detect_parallel_structures, extract_boundaries, segments_from_boundaries};
use crate::models::{Boundary, ResultMetadata, SegmentationConfig, SegmentationResult};
use crate::validate::{checksum, validate_segmentation};

/// Segments one text by asking the generator for a marked copy.
pub struct SegmentationService<G> {
    config: SegmentationConfig,
    generator: G,
}

impl<G: Generator> SegmentationService<G> {
    pub fn new(generator: G, config: SegmentationConfig) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Segment `text` with the service's own configuration.
    pub fn segment_text(&self, text: &str) -> Result<SegmentationResult> {
        self.segment_with_config(text, &self.config)
    }

    /// Segment `text` with a per-call configuration (consensus pass variants).
    pub fn segment_with_config(&self, text: &str, config: &SegmentationConfig) -> Result<SegmentationResult> {
        if text.trim().is_empty() {
            return Err(SegmentError::EmptyText);
        }
        let marked = self.generator.generate(&marker_request(text, config))?;
        segment_marked_text(text, &marked, config)
    }
}

/// Parse a marked copy of `text`, build the result and validate it.
///
/// Any structural validation error fails the whole call with
/// [`SegmentError::ValidationFailed`].
pub fn segment_marked_text(text: &str, marked: &str, config: &SegmentationConfig) -> Result<SegmentationResult> {
    if text.trim().is_empty() {
        return Err(SegmentError::EmptyText);
    }

    let boundaries = extract_boundaries(marked, text, config.marker)?;
    let result = build_result(text, boundaries, config, config.model.clone());

    let errors = validate_segmentation(&result);
    if !errors.is_empty() {
        return Err(SegmentError::ValidationFailed(errors));
    }

    log::debug!(
        "segmented {} bytes into {} segments",
        text.len(),
        result.segments.len()
    );
    Ok(result)
}

/// Assemble a result from already-known boundaries. No validation.
pub fn build_result(
    text: &str,
    boundaries: Vec<Boundary>,
    config: &SegmentationConfig,
    model: String,
) -> SegmentationResult {
    let segments = segments_from_boundaries(text, &boundaries, config.language);
    let parallel_structures = config
        .enable_parallel_detection
        .then(|| detect_parallel_structures(&segments));

    SegmentationResult {
        original_text: text.to_string(),
        checksum: checksum(text),
        segments,
        boundaries: Some(boundaries),
        metadata: ResultMetadata {
            model,
            timestamp: chrono_lite_timestamp(),
            validation_passed: true,
            language: config.language,
            text_type: config.text_type,
            parallel_structures,
        },
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`, without a date crate.
pub(crate) fn chrono_lite_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_timestamp(secs)
}

fn format_timestamp(secs: u64) -> String {
    let mut remaining_days = secs / 86400;
    let secs_today = secs % 86400;

    let mut year = 1970;
    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining_days < days_in_year {
            break;
        }
        remaining_days -= days_in_year;
        year += 1;
    }

    let month_days = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 1;
    for days in month_days.iter() {
        if remaining_days < *days {
            break;
        }
        remaining_days -= *days;
        month += 1;
    }

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        remaining_days + 1,
        secs_today / 3600,
        (secs_today % 3600) / 60,
        secs_today % 60
    )
}

fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
