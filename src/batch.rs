//! Offline audit of recorded co-segmentation payloads.
//!
//! Each input line holds two texts and the payload a generator returned for
//! them. Lines are validated independently and in parallel; a bad line is
//! reported, never fatal to the batch.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::Value;

use crate::align::validate_co_segmentation;
use crate::candidate::parse_candidate;
use crate::error::Result;
use crate::models::{BatchOutcome, BatchRecord, BatchReport, BatchStatus, CoSegmentation, CoSegmentationInput};
use crate::service::chrono_lite_timestamp;

/// Validate a single record's payload against its texts.
pub fn validate_record(record: &BatchRecord) -> Result<(CoSegmentation, bool)> {
    let content = match &record.payload {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    let candidate = parse_candidate(&content)?;
    let input = CoSegmentationInput::new(record.hebrew_text.as_str(), record.english_text.as_str());
    let result = validate_co_segmentation(&input, &candidate)?;
    let repaired = result.raw != candidate;
    Ok((result, repaired))
}

fn evaluate_line(line: usize, text: &str, keep_results: bool) -> BatchOutcome {
    let record = serde_json::from_str::<BatchRecord>(text);
    let id = record.as_ref().ok().and_then(|r| r.id.clone());
    let outcome = record.map_err(Into::into).and_then(|r| validate_record(&r));

    match outcome {
        Ok((result, repaired)) => BatchOutcome {
            line,
            id,
            status: BatchStatus::Accepted,
            error_kind: None,
            message: None,
            segment_count: result.hebrew_segments.len(),
            repaired,
            result: keep_results.then_some(result),
        },
        Err(e) => {
            log::debug!("line {} rejected: {}", line, e);
            BatchOutcome {
                line,
                id,
                status: BatchStatus::Rejected,
                error_kind: Some(e.kind()),
                message: Some(e.to_string()),
                segment_count: 0,
                repaired: false,
                result: None,
            }
        }
    }
}

/// Validate every non-blank line of a JSONL document.
///
/// Outcomes are returned in line order. With `keep_results` the accepted
/// segmentations are included in the report.
pub fn validate_batch(input: &str, keep_results: bool, show_progress: bool) -> BatchReport {
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| (i + 1, text))
        .collect();

    if show_progress {
        eprintln!("Validating {} records...", lines.len());
    }

    let progress = if show_progress {
        let pb = ProgressBar::new(lines.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let outcomes: Vec<BatchOutcome> = lines
        .par_iter()
        .map(|&(line, text)| {
            let outcome = evaluate_line(line, text, keep_results);
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
            outcome
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    let accepted = outcomes
        .iter()
        .filter(|o| o.status == BatchStatus::Accepted)
        .count();
    let repaired = outcomes.iter().filter(|o| o.repaired).count();

    BatchReport {
        generated_at: chrono_lite_timestamp(),
        total: outcomes.len(),
        accepted,
        rejected: outcomes.len() - accepted,
        repaired,
        outcomes,
    }
}
