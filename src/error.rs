//! Error types for the segmentation pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::generate::GeneratorError;
use crate::models::Track;
use crate::validate::ValidationError;

/// Stable classification of a [`SegmentError`], suitable for logs and for
/// callers that only branch on the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedPayload,
    InvalidWordRange,
    SegmentCountMismatch,
    IntegrityViolation,
    AllPassesFailed,
    AttemptsExhausted,
    EmptyText,
    Generator,
}

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Invalid {track}_segments: {}", .errors.join(" | "))]
    InvalidWordRange { track: Track, errors: Vec<String> },
    #[error("Segment count mismatch: hebrew={hebrew}, english={english}.")]
    SegmentCountMismatch { hebrew: usize, english: usize },
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
    #[error("Segmentation validation failed: {}", join_messages(.0))]
    ValidationFailed(Vec<ValidationError>),
    #[error("All {0} segmentation passes failed")]
    AllPassesFailed(usize),
    #[error("Co-segmentation failed after {attempts} attempts. Last error: {last_error}")]
    AttemptsExhausted { attempts: usize, last_error: String },
    #[error("Empty or invalid text provided")]
    EmptyText,
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),
}

impl SegmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SegmentError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            SegmentError::InvalidWordRange { .. } => ErrorKind::InvalidWordRange,
            SegmentError::SegmentCountMismatch { .. } => ErrorKind::SegmentCountMismatch,
            SegmentError::IntegrityViolation(_) | SegmentError::ValidationFailed(_) => {
                ErrorKind::IntegrityViolation
            }
            SegmentError::AllPassesFailed(_) => ErrorKind::AllPassesFailed,
            SegmentError::AttemptsExhausted { .. } => ErrorKind::AttemptsExhausted,
            SegmentError::EmptyText => ErrorKind::EmptyText,
            SegmentError::Generator(_) => ErrorKind::Generator,
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<serde_json::Error> for SegmentError {
    fn from(err: serde_json::Error) -> Self {
        SegmentError::MalformedPayload(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SegmentError>;
