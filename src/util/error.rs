//! Error types for compmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for compmatch operations.
pub type CompMatchResult<T> = std::result::Result<T, CompMatchError>;

/// Errors that can occur while selecting, scoring or reporting matches.
///
/// Every variant is fatal for a run; the only recoverable situation (a subject
/// without candidate files) is not an error at all.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CompMatchError {
    /// Volume dimensions are zero or overflow.
    #[error("invalid dimensions {dims:?}")]
    InvalidDimensions { dims: [usize; 4] },
    /// A voxel buffer does not match its declared dimensions.
    #[error("buffer size mismatch: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The voxel-to-millimetre affine cannot be inverted.
    #[error("affine is singular (determinant {determinant})")]
    SingularAffine { determinant: f64 },
    /// Decoding an image failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
    /// Neither the first nor the second timepoint of the template has data.
    #[error("template {path:?} has no non-empty volume in its first two timepoints")]
    TemplateEmpty { path: PathBuf },
    /// A candidate image could not produce a usable volume.
    #[error("candidate {path:?} is unreadable: {reason}")]
    CandidateUnreadable { path: PathBuf, reason: String },
    /// A single-column input list could not be read.
    #[error("cannot read input list {path:?}: {reason}")]
    InputList { path: PathBuf, reason: String },
    /// No candidate image exists for any subject.
    #[error("no subject images found across {subjects} subject(s)")]
    NoInput { subjects: usize },
    /// A report file could not be written.
    #[error("cannot write output {path:?}: {reason}")]
    OutputIo { path: PathBuf, reason: String },
    /// A required configuration field was not provided.
    #[error("missing required setting `{0}`")]
    MissingField(&'static str),
    /// A threshold operator string was not recognised.
    #[error("unknown comparison operator `{0}`")]
    InvalidCriterion(String),
}
