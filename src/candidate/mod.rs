//! Candidate images and per-subject ranking.

use crate::image::{ImageProvider, Volume};
use crate::util::{CompMatchError, CompMatchResult};
use std::path::{Path, PathBuf};

pub(crate) mod topk;

/// Component image evaluated against the template.
///
/// Its identity in reports is the full path it was loaded from.
#[derive(Clone, Debug)]
pub struct Candidate {
    subject: String,
    path: PathBuf,
    volume: Volume,
}

impl Candidate {
    /// Creates a candidate from an already resolved volume.
    pub fn new(subject: impl Into<String>, path: impl Into<PathBuf>, volume: Volume) -> Self {
        Self {
            subject: subject.into(),
            path: path.into(),
            volume,
        }
    }

    /// Loads `path` through `provider` and resolves its first usable volume.
    ///
    /// Any failure is reported as [`CompMatchError::CandidateUnreadable`].
    pub fn load<P: ImageProvider + ?Sized>(
        subject: &str,
        path: &Path,
        provider: &P,
    ) -> CompMatchResult<Self> {
        let unreadable = |reason: String| CompMatchError::CandidateUnreadable {
            path: path.to_path_buf(),
            reason,
        };
        let image = provider.load(path).map_err(|err| unreadable(err.to_string()))?;
        let volume = image.first_usable_volume().ok_or_else(|| {
            unreadable("no non-empty volume in the first two timepoints".to_owned())
        })?;
        Ok(Self::new(subject, path, volume))
    }

    /// Returns the subject or group the candidate belongs to.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the full path of the candidate image.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the report identity (the full path as text).
    pub fn identity(&self) -> String {
        self.path.display().to_string()
    }

    /// Returns the resolved volume.
    pub fn volume(&self) -> &Volume {
        &self.volume
    }
}
