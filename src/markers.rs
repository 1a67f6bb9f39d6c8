//! Boundary-marker parsing.
//!
//! The generator returns a copy of the source with a marker character
//! inserted at each phrase boundary. The copy is walked against the source in
//! lockstep; the marker positions become [`Boundary`] offsets and everything
//! else must match the source. Whitespace is the only tolerated difference,
//! since generators routinely pad markers with spaces (`said, | Let`).

use crate::error::{Result, SegmentError};
use crate::models::{Boundary, BoundaryType, Language, ParallelStructure, ParallelType, SegmentType, TextSegment};

/// Confidence attached to marker-derived boundaries and segments.
pub const MARKER_CONFIDENCE: f32 = 0.8;

/// Recover boundary offsets from a marked copy of `original`.
///
/// Offsets are byte offsets into `original`. Consecutive markers collapse
/// into one boundary, and markers at the very start or end of the text are
/// ignored. Whitespace is tolerated only around markers: extra whitespace in
/// the copy is skipped, and source whitespace may be dropped right after a
/// marker (`a|b` for `a b`). Any other difference is an integrity violation,
/// and so is source text the copy never reaches.
pub fn extract_boundaries(marked: &str, original: &str, marker: char) -> Result<Vec<Boundary>> {
    if original.contains(marker) {
        return Err(SegmentError::MalformedPayload(format!(
            "marker {:?} also occurs in the source text",
            marker
        )));
    }

    let mut source = original.char_indices().peekable();
    let mut boundaries: Vec<Boundary> = Vec::new();
    // True from a marker until the next matched source character
    let mut after_marker = false;

    for ch in marked.trim().chars() {
        if ch == marker {
            after_marker = true;
            let position = source.peek().map_or(original.len(), |&(offset, _)| offset);
            if boundaries.last().map(|b| b.position) != Some(position) {
                boundaries.push(Boundary {
                    position,
                    boundary_type: BoundaryType::Phrase,
                    confidence: Some(MARKER_CONFIDENCE),
                });
            }
            continue;
        }

        if matches!(source.peek(), Some(&(_, expected)) if expected == ch) {
            source.next();
            after_marker = after_marker && ch.is_whitespace();
            continue;
        }
        if ch.is_whitespace() {
            // padding around a marker
            continue;
        }

        // source whitespace replaced by a marker
        if after_marker {
            while matches!(source.peek(), Some(&(_, c)) if c.is_whitespace()) {
                source.next();
            }
        }
        after_marker = false;
        match source.next() {
            Some((_, expected)) if expected == ch => {}
            Some((offset, expected)) => {
                return Err(SegmentError::IntegrityViolation(format!(
                    "marked text diverges from source at byte {}: expected {:?}, found {:?}",
                    offset, expected, ch
                )))
            }
            None => {
                return Err(SegmentError::IntegrityViolation(format!(
                    "marked text continues past the end of the source with {:?}",
                    ch
                )))
            }
        }
    }

    if let Some((offset, _)) = source.find(|&(_, c)| !c.is_whitespace()) {
        return Err(SegmentError::IntegrityViolation(format!(
            "marked text stops at byte {} of {}",
            offset,
            original.len()
        )));
    }

    boundaries.retain(|b| {
        !original[..b.position].trim().is_empty() && !original[b.position..].trim().is_empty()
    });
    Ok(boundaries)
}

/// Slice `text` at the boundary offsets into trimmed segments.
///
/// Empty slices are dropped. Each segment's offsets point at its trimmed
/// text, so `text[start..end] == segment.text` holds.
pub fn segments_from_boundaries(text: &str, boundaries: &[Boundary], language: Language) -> Vec<TextSegment> {
    let mut positions: Vec<usize> = boundaries
        .iter()
        .map(|b| b.position)
        .filter(|&p| p <= text.len() && text.is_char_boundary(p))
        .collect();
    positions.sort_unstable();
    positions.dedup();

    let mut cuts = Vec::with_capacity(positions.len() + 2);
    cuts.push(0);
    cuts.extend(positions);
    cuts.push(text.len());

    let mut segments = Vec::new();
    for pair in cuts.windows(2) {
        let (raw_start, raw_end) = (pair[0], pair[1]);
        if raw_start >= raw_end {
            continue;
        }
        let slice = &text[raw_start..raw_end];
        let trimmed = slice.trim();
        if trimmed.is_empty() {
            continue;
        }

        let start = raw_start + (slice.len() - slice.trim_start().len());
        let end = start + trimmed.len();
        let mut segment = TextSegment::new(segments.len() as u32 + 1, start, end, trimmed);
        segment.segment_type = infer_segment_type(trimmed, language);
        segment.confidence = Some(MARKER_CONFIDENCE);
        segments.push(segment);
    }
    segments
}

/// Keyword heuristics for the phrase type of a segment.
pub fn infer_segment_type(text: &str, language: Language) -> Option<SegmentType> {
    let lowered = text.trim().to_lowercase();

    match language {
        Language::Hebrew => {
            if lowered.contains("אמר") {
                Some(SegmentType::SpeechAttribution)
            } else if lowered.contains("מה") {
                Some(SegmentType::Question)
            } else {
                None
            }
        }
        Language::English => {
            if lowered.contains(" said") || lowered.contains("r'") {
                Some(SegmentType::SpeechAttribution)
            } else if lowered.starts_with("what") || lowered.ends_with('?') {
                Some(SegmentType::Question)
            } else if lowered.starts_with("and ") {
                Some(SegmentType::ResultClause)
            } else if lowered.contains("let there be") {
                Some(SegmentType::ImperativeClause)
            } else {
                None
            }
        }
    }
}

const NEGATIONS: &[&str] = &["not", "no", "never", "לא", "אין"];
const ENUMERATIONS: &[&str] = &["first", "second", "one", "another", "some", "others"];

fn has_word(text: &str, vocabulary: &[&str]) -> bool {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .any(|w| vocabulary.contains(&w.as_str()))
}

/// Classify two adjacent segments as a parallel pair, if they look like one.
///
/// A pair where exactly one side is negated is a contrast; a pair where both
/// sides use enumeration words is an enumeration.
pub fn parallel_pair_type(first: &TextSegment, second: &TextSegment) -> Option<ParallelType> {
    if has_word(&first.text, NEGATIONS) != has_word(&second.text, NEGATIONS) {
        return Some(ParallelType::Contrast);
    }
    if has_word(&first.text, ENUMERATIONS) && has_word(&second.text, ENUMERATIONS) {
        return Some(ParallelType::Enumeration);
    }
    None
}

/// Every adjacent pair of segments that forms a parallel structure.
pub fn detect_parallel_structures(segments: &[TextSegment]) -> Vec<ParallelStructure> {
    segments
        .windows(2)
        .filter_map(|pair| {
            parallel_pair_type(&pair[0], &pair[1]).map(|parallel_type| ParallelStructure {
                segments: vec![pair[0].id, pair[1].id],
                parallel_type,
            })
        })
        .collect()
}
