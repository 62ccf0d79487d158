//! Per-subject match sessions against a fixed index set.
//!
//! A [`Matcher`] owns the index set derived once from the template. Each
//! subject gets its own [`MatchSession`], which accumulates candidates and is
//! consumed by [`MatchSession::match_all`]; there is no shared candidate list
//! to reset between subjects.

use crate::candidate::topk::top_k;
use crate::candidate::Candidate;
use crate::score::{score, ScoreMode};
use crate::template::{Criterion, IndexSet, Template};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{CompMatchError, CompMatchResult};

/// One scored candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreEntry {
    /// Full path of the candidate image.
    pub identity: String,
    /// Overlap score under the matcher's mode.
    pub score: f64,
}

/// Scores for one subject, in the order candidates were added.
#[derive(Clone, Debug, PartialEq)]
pub struct SubjectScores {
    subject: String,
    entries: Vec<ScoreEntry>,
}

impl SubjectScores {
    /// Returns the subject or group name.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the entries in insertion order.
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Returns true when the subject had no candidates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of scored candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the `k` best entries by descending score; ties keep insertion order.
    pub fn ranked(&self, k: usize) -> Vec<ScoreEntry> {
        top_k(&self.entries, k)
    }
}

/// Holds the template index set and scoring mode shared by all subjects.
#[derive(Clone, Debug)]
pub struct Matcher {
    index_set: IndexSet,
    mode: ScoreMode,
}

impl Matcher {
    /// Creates a matcher from a precomputed index set.
    pub fn new(index_set: IndexSet) -> Self {
        Self {
            index_set,
            mode: ScoreMode::default(),
        }
    }

    /// Selects the template voxels satisfying `criterion` and wraps them.
    pub fn from_template(template: &Template, criterion: &Criterion) -> Self {
        let index_set = template.select(criterion);
        if index_set.is_empty() {
            trace_warn!(
                "empty_index_set",
                template = &*template.path().to_string_lossy(),
                criterion = criterion.to_string().as_str(),
            );
        }
        Self::new(index_set)
    }

    /// Replaces the scoring mode.
    pub fn with_mode(mut self, mode: ScoreMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the scoring mode.
    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    /// Returns the shared index set.
    pub fn index_set(&self) -> &IndexSet {
        &self.index_set
    }

    /// Starts an empty session for `subject`.
    pub fn session(&self, subject: impl Into<String>) -> MatchSession<'_> {
        MatchSession {
            matcher: self,
            subject: subject.into(),
            candidates: Vec::new(),
        }
    }
}

/// Candidates accumulated for a single subject.
pub struct MatchSession<'m> {
    matcher: &'m Matcher,
    subject: String,
    candidates: Vec<Candidate>,
}

impl MatchSession<'_> {
    /// Appends a candidate to this subject's batch.
    pub fn add_candidate(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    /// Returns the subject name.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Scores every accumulated candidate against the shared index set.
    ///
    /// A session without candidates yields empty scores. Scoring failures are
    /// reported as [`CompMatchError::CandidateUnreadable`].
    pub fn match_all(self) -> CompMatchResult<SubjectScores> {
        let _span = trace_span!("match_all", subject = self.subject.as_str()).entered();
        if self.candidates.is_empty() {
            trace_warn!("no_matches", subject = self.subject.as_str());
            return Ok(SubjectScores {
                subject: self.subject,
                entries: Vec::new(),
            });
        }

        let index_set = self.matcher.index_set();
        let mode = self.matcher.mode();
        let mut entries = Vec::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            let value = score(index_set, candidate.volume(), mode).map_err(|err| {
                CompMatchError::CandidateUnreadable {
                    path: candidate.path().to_path_buf(),
                    reason: err.to_string(),
                }
            })?;
            let identity = candidate.identity();
            trace_event!("scored", candidate = identity.as_str(), score = value);
            entries.push(ScoreEntry {
                identity,
                score: value,
            });
        }

        Ok(SubjectScores {
            subject: self.subject,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Matcher;
    use crate::candidate::Candidate;
    use crate::image::{Affine, Volume};
    use crate::template::IndexSet;
    use crate::util::CompMatchError;
    use std::path::PathBuf;

    #[test]
    fn empty_session_yields_empty_scores() {
        let matcher = Matcher::new(IndexSet::from_coords(vec![[0.0; 3]]));
        let scores = matcher.session("/s1").match_all().unwrap();
        assert_eq!(scores.subject(), "/s1");
        assert!(scores.is_empty());
    }

    #[test]
    fn scores_follow_insertion_order() {
        let matcher = Matcher::new(IndexSet::from_coords(vec![[0.0; 3]]));
        let mut session = matcher.session("/s1");
        for (name, v) in [("/s1/b.nii", 2.0f32), ("/s1/a.nii", 7.0)] {
            let vol = Volume::from_fn([1, 1, 1], Affine::identity(), |_, _, _| v).unwrap();
            session.add_candidate(Candidate::new("/s1", name, vol));
        }
        let scores = session.match_all().unwrap();
        let names: Vec<_> = scores.entries().iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(names, ["/s1/b.nii", "/s1/a.nii"]);
        assert_eq!(scores.ranked(1)[0].identity, "/s1/a.nii");
    }

    #[test]
    fn singular_candidate_affine_is_unreadable() {
        let matcher = Matcher::new(IndexSet::from_coords(vec![[0.0; 3]]));
        let flat = Affine::from_voxel_size([1.0, 0.0, 1.0], [0.0; 3]);
        let vol = Volume::from_fn([1, 1, 1], flat, |_, _, _| 1.0).unwrap();
        let mut session = matcher.session("/s1");
        session.add_candidate(Candidate::new("/s1", "/s1/flat.nii", vol));
        let err = session.match_all().err().unwrap();
        assert!(matches!(
            err,
            CompMatchError::CandidateUnreadable { ref path, .. } if *path == PathBuf::from("/s1/flat.nii")
        ));
    }

    #[test]
    fn nan_candidate_does_not_outrank_finite_one() {
        let matcher = Matcher::new(IndexSet::from_coords(vec![[0.0; 3], [1.0, 0.0, 0.0]]));
        let mut session = matcher.session("/s1");
        let good = Volume::from_fn([2, 1, 1], Affine::identity(), |_, _, _| 2.0).unwrap();
        let nan = Volume::from_fn([2, 1, 1], Affine::identity(), |_, _, _| f32::NAN).unwrap();
        session.add_candidate(Candidate::new("/s1", "/s1/good.nii", good));
        session.add_candidate(Candidate::new("/s1", "/s1/nan.nii", nan));
        let scores = session.match_all().unwrap();
        assert_eq!(scores.entries()[0].score, 4.0);
        assert_eq!(scores.entries()[1].score, 0.0);
        assert_eq!(scores.ranked(1)[0].identity, "/s1/good.nii");
    }
}
