//! Multi-pass consensus segmentation.
//!
//! Several independent passes segment the same text with different parameter
//! presets. Boundary positions are then voted on, and the accepted set is
//! turned into the final segmentation.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;

use crate::error::{Result, SegmentError};
use crate::generate::Generator;
use crate::models::{
    Boundary, BoundaryVote, ConflictingBoundary, ConsensusResult, SegmentationConfig, SegmentationResult,
};
use crate::service::{build_result, SegmentationService};
use crate::validate::validate_segmentation;

/// Parameter preset applied on top of the base config for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassPreset {
    pub label: &'static str,
    pub temperature: f32,
}

/// Pass `i` uses `PASS_PRESETS[i % PASS_PRESETS.len()]`.
pub const PASS_PRESETS: [PassPreset; 3] = [
    PassPreset {
        label: "conservative",
        temperature: 0.1,
    },
    PassPreset {
        label: "moderate",
        temperature: 0.3,
    },
    PassPreset {
        label: "creative",
        temperature: 0.5,
    },
];

/// Config for pass `index`: the base config with that pass's preset applied.
pub fn variant_config(base: &SegmentationConfig, index: usize) -> SegmentationConfig {
    let preset = PASS_PRESETS[index % PASS_PRESETS.len()];
    SegmentationConfig {
        temperature: preset.temperature,
        ..base.clone()
    }
}

/// Run `pass_count` passes in parallel and reconcile them.
///
/// `run_pass` receives the pass index and its variant config. Failed passes
/// are logged and dropped; if none survive the run fails with
/// [`SegmentError::AllPassesFailed`]. Surviving passes keep their pass order.
pub fn run_consensus<F>(
    text: &str,
    base: &SegmentationConfig,
    pass_count: usize,
    run_pass: F,
) -> Result<ConsensusResult>
where
    F: Fn(usize, &SegmentationConfig) -> Result<SegmentationResult> + Sync,
{
    let outcomes: Vec<(usize, Result<SegmentationResult>)> = (0..pass_count)
        .into_par_iter()
        .map(|index| {
            let config = variant_config(base, index);
            (index, run_pass(index, &config))
        })
        .collect();

    let mut pass_results = Vec::with_capacity(outcomes.len());
    for (index, outcome) in outcomes {
        match outcome {
            Ok(result) => pass_results.push(result),
            Err(e) => log::warn!("consensus pass {} failed: {}", index + 1, e),
        }
    }

    if pass_results.is_empty() {
        return Err(SegmentError::AllPassesFailed(pass_count));
    }

    let consensus = find_boundary_consensus(&pass_results);
    let agreement_level = calculate_agreement_level(&pass_results, &consensus);
    let conflicting_boundaries = find_conflicting_boundaries(&pass_results);

    let mut final_segmentation = build_result(text, consensus, base, format!("{}-consensus", base.model));
    let errors = validate_segmentation(&final_segmentation);
    if !errors.is_empty() {
        log::warn!("consensus segmentation has {} validation errors", errors.len());
        final_segmentation.metadata.validation_passed = false;
    }

    log::info!(
        "consensus over {}/{} passes: {} boundaries, agreement {:.3}, {} conflicts",
        pass_results.len(),
        pass_count,
        final_segmentation.boundaries.as_ref().map_or(0, Vec::len),
        agreement_level,
        conflicting_boundaries.len()
    );

    Ok(ConsensusResult {
        final_segmentation,
        agreement_level,
        pass_results,
        conflicting_boundaries,
    })
}

/// Each pass's boundary records, at most one per position.
fn distinct_boundaries(result: &SegmentationResult) -> Vec<&Boundary> {
    let mut seen = HashSet::new();
    result
        .boundaries
        .iter()
        .flatten()
        .filter(|b| seen.insert(b.position))
        .collect()
}

fn positions(result: &SegmentationResult) -> HashSet<usize> {
    result.boundaries.iter().flatten().map(|b| b.position).collect()
}

/// Positions voted for by a strict majority of passes, sorted by position.
///
/// When several passes propose the same position, the record with the
/// highest confidence is kept (the earliest on ties).
pub fn find_boundary_consensus(results: &[SegmentationResult]) -> Vec<Boundary> {
    let threshold = results.len() / 2 + 1;
    let mut votes: BTreeMap<usize, Vec<&Boundary>> = BTreeMap::new();

    for result in results {
        for boundary in distinct_boundaries(result) {
            votes.entry(boundary.position).or_default().push(boundary);
        }
    }

    votes
        .into_values()
        .filter(|ballots| ballots.len() >= threshold)
        .filter_map(|ballots| {
            ballots
                .into_iter()
                .reduce(|best, current| {
                    if current.confidence.unwrap_or(0.0) > best.confidence.unwrap_or(0.0) {
                        current
                    } else {
                        best
                    }
                })
                .cloned()
        })
        .collect()
}

/// Mean Jaccard similarity between each pass's positions and the consensus.
pub fn calculate_agreement_level(results: &[SegmentationResult], consensus: &[Boundary]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }

    let consensus_positions: HashSet<usize> = consensus.iter().map(|b| b.position).collect();
    let total: f32 = results
        .iter()
        .map(|result| jaccard_similarity(&positions(result), &consensus_positions))
        .sum();
    total / results.len() as f32
}

/// Jaccard similarity of two position sets; two empty sets are identical.
pub fn jaccard_similarity(a: &HashSet<usize>, b: &HashSet<usize>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Every position that some but not all passes voted for.
pub fn find_conflicting_boundaries(results: &[SegmentationResult]) -> Vec<ConflictingBoundary> {
    let mut votes: BTreeMap<usize, Vec<BoundaryVote>> = BTreeMap::new();

    for (i, result) in results.iter().enumerate() {
        let model = format!("{}-pass{}", result.metadata.model, i + 1);
        for boundary in distinct_boundaries(result) {
            votes.entry(boundary.position).or_default().push(BoundaryVote {
                model: model.clone(),
                boundary: boundary.clone(),
            });
        }
    }

    votes
        .into_iter()
        .filter(|(_, ballots)| ballots.len() < results.len())
        .map(|(position, votes)| ConflictingBoundary { position, votes })
        .collect()
}

/// Consensus wrapper around a [`SegmentationService`].
pub struct ConsensusSegmenter<G> {
    service: SegmentationService<G>,
}

impl<G: Generator> ConsensusSegmenter<G> {
    pub fn new(generator: G, base: SegmentationConfig) -> Self {
        Self {
            service: SegmentationService::new(generator, base),
        }
    }

    pub fn service(&self) -> &SegmentationService<G> {
        &self.service
    }

    pub fn segment_with_consensus(&self, text: &str, pass_count: usize) -> Result<ConsensusResult> {
        if text.trim().is_empty() {
            return Err(SegmentError::EmptyText);
        }
        run_consensus(text, self.service.config(), pass_count, |_, config| {
            self.service.segment_with_config(text, config)
        })
    }
}
