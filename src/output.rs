//! Output formatting for segmentation results (JSON, CSV, console).

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::markers::parallel_pair_type;
use crate::models::{BatchReport, BatchStatus, CoSegmentation, ConsensusResult, ParallelType, SegmentationResult, TextSegment};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write any result as pretty JSON.
pub fn write_json<T: Serialize, W: Write>(value: &T, writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}

/// Write any result as pretty JSON to a file.
pub fn write_json_file<T: Serialize>(value: &T, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_json(value, &mut file)
}

/// Write aligned segment pairs as CSV, one row per pair.
pub fn write_pairs_csv<W: Write>(result: &CoSegmentation, writer: &mut W) -> Result<(), OutputError> {
    writeln!(
        writer,
        "id,hebrew_start,hebrew_end,hebrew_text,english_start,english_end,english_text"
    )?;

    for (hebrew, english) in result.hebrew_segments.iter().zip(&result.english_segments) {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            hebrew.id,
            hebrew.start,
            hebrew.end,
            csv_field(&hebrew.text),
            english.start,
            english.end,
            csv_field(&english.text)
        )?;
    }

    Ok(())
}

/// Quote a CSV field, doubling embedded quotes.
fn csv_field(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Write aligned segment pairs as CSV to a file.
pub fn write_pairs_csv_file(result: &CoSegmentation, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_pairs_csv(result, &mut file)
}

/// Print a validated co-segmentation side by side.
pub fn print_co_segmentation(result: &CoSegmentation) {
    println!("\n=== Co-segmentation ===");
    println!("Segments: {}", result.hebrew_segments.len());
    println!(
        "Ranges: hebrew={:?} english={:?}",
        result.raw.hebrew_segments, result.raw.english_segments
    );
    println!();
    for (hebrew, english) in result.hebrew_segments.iter().zip(&result.english_segments) {
        println!("[{}] {}", hebrew.id, truncate_text(hebrew.text.trim(), 80));
        println!("    {}", truncate_text(english.text.trim(), 80));
    }
}

/// Print a single-text segmentation result.
pub fn print_result_summary(result: &SegmentationResult) {
    println!("\n=== Segmentation Summary ===");
    println!("Model: {}", result.metadata.model);
    println!("Generated: {}", result.metadata.timestamp);
    println!("Checksum: {}", result.checksum);
    println!("Validation passed: {}", result.metadata.validation_passed);
    println!("Segments: {}", result.segments.len());
    if let Some(structures) = &result.metadata.parallel_structures {
        println!("Parallel structures: {}", structures.len());
    }
    println!();
    print_segments(&result.segments, None);
}

/// Print segments in a human-readable format.
pub fn print_segments(segments: &[TextSegment], limit: Option<usize>) {
    let to_print = match limit {
        Some(n) => &segments[..n.min(segments.len())],
        None => segments,
    };

    for segment in to_print {
        println!("{}", format_segment(segment));
    }

    if let Some(n) = limit {
        if segments.len() > n {
            println!("... and {} more segments", segments.len() - n);
        }
    }
}

/// Format a segment as `[id] start..end (type) text`.
pub fn format_segment(segment: &TextSegment) -> String {
    let kind = segment
        .segment_type
        .and_then(|t| serde_json::to_value(t).ok())
        .and_then(|v| v.as_str().map(str::to_string))
        .map(|t| format!(" ({})", t))
        .unwrap_or_default();
    format!(
        "[{}] {}..{}{} {}",
        segment.id,
        segment.start,
        segment.end,
        kind,
        truncate_text(&segment.text, 100)
    )
}

/// Print the outcome of a consensus run.
pub fn print_consensus_summary(result: &ConsensusResult) {
    println!("\n=== Consensus Summary ===");
    println!("Passes: {}", result.pass_results.len());
    println!("Agreement: {:.1}%", result.agreement_level * 100.0);
    println!(
        "Consensus boundaries: {}",
        result.final_segmentation.boundaries.as_ref().map_or(0, Vec::len)
    );
    println!("Conflicting boundaries: {}", result.conflicting_boundaries.len());
    for conflict in &result.conflicting_boundaries {
        let voters: Vec<&str> = conflict.votes.iter().map(|v| v.model.as_str()).collect();
        println!("  @{}: {}", conflict.position, voters.join(", "));
    }
    println!();
    print_segments(&result.final_segmentation.segments, None);
}

/// Print totals of a batch audit and the first rejected lines.
pub fn print_batch_summary(report: &BatchReport, limit: usize) {
    println!("\n=== Batch Summary ===");
    println!("Generated: {}", report.generated_at);
    println!("Records: {}", report.total);
    println!("  Accepted: {} ({} repaired)", report.accepted, report.repaired);
    println!("  Rejected: {}", report.rejected);

    let rejected: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| o.status == BatchStatus::Rejected)
        .collect();
    for outcome in rejected.iter().take(limit) {
        println!(
            "  line {}: {}",
            outcome.line,
            truncate_text(outcome.message.as_deref().unwrap_or("-"), 120)
        );
    }
    if rejected.len() > limit {
        println!("  ... and {} more", rejected.len() - limit);
    }
}

/// Lay out segments for study, writing detected parallel pairs as
/// `- A - ...` / `- B - ...` bullets.
pub fn format_talmud_parallels(segments: &[TextSegment]) -> String {
    let mut lines = Vec::with_capacity(segments.len());
    let mut i = 0;

    while i < segments.len() {
        let current = &segments[i];
        if let Some(next) = segments.get(i + 1) {
            match parallel_pair_type(current, next) {
                Some(ParallelType::Contrast) => {
                    lines.push(format!("- A - {}", contrast_element(&current.text)));
                    lines.push(format!("- B - {}", contrast_element(&next.text)));
                    i += 2;
                    continue;
                }
                Some(_) => {
                    lines.push(format!("- {}", current.text));
                    lines.push(format!("- {}", next.text));
                    i += 2;
                    continue;
                }
                None => {}
            }
        }
        lines.push(current.text.clone());
        i += 1;
    }

    lines.join("\n")
}

/// Strip one leading connective and capitalize what remains.
fn contrast_element(text: &str) -> String {
    const PREFIXES: [&str; 6] = ["r' ", "rabbi ", "the ", "and ", "but ", "however "];

    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();
    let rest = PREFIXES
        .iter()
        .find(|p| lowered.starts_with(*p))
        .and_then(|p| trimmed.get(p.len()..))
        .unwrap_or(trimmed);

    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate text to a maximum length, adding ellipsis if needed.
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
