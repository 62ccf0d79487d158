//! compmatch scores component maps (e.g. ICA outputs) against a template map.
//!
//! The template is thresholded once into an ordered [`IndexSet`] of
//! millimetre coordinates. Every candidate image of every subject is sampled
//! at those coordinates and summed, either signed or by absolute value, and
//! the scores are written to a line-oriented report. Images are assumed to
//! share a coordinate space; nothing is resampled or registered.
//!
//! Image decoding sits behind the [`ImageProvider`] trait; the `nifti-io`
//! feature provides a NIfTI implementation, `rayon` enables parallel scoring
//! across subjects and `tracing` emits spans and progress events.

mod candidate;
pub mod image;
pub mod matcher;
pub mod pipeline;
pub mod score;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "nifti-io")]
pub use image::io;

pub use candidate::Candidate;
pub use image::{Affine, Image, ImageProvider, Volume};
pub use matcher::{MatchSession, Matcher, ScoreEntry, SubjectScores};
pub use pipeline::{run, RunConfig, RunConfigBuilder, RunSummary, SubjectCandidates};
pub use score::{overlap_scores, score, OverlapScores, ScoreMode};
pub use template::{select_indices, Comparison, Criterion, IndexSet, Template};
pub use util::{CompMatchError, CompMatchResult};
