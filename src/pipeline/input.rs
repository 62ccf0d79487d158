//! Single-column list files and candidate discovery.

use crate::image::ImageProvider;
use crate::trace::{trace_event, trace_warn};
use crate::util::{CompMatchError, CompMatchResult};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Candidate image paths found for one subject, in filename-list order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectCandidates {
    pub subject: String,
    pub paths: Vec<PathBuf>,
}

/// Reads one entry per line, stripping trailing whitespace and skipping blanks.
pub fn read_list<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim_end();
        if !entry.is_empty() {
            out.push(entry.to_owned());
        }
    }
    Ok(out)
}

/// Reads a list file from disk.
pub fn read_list_file(path: &Path) -> CompMatchResult<Vec<String>> {
    let to_err = |err: io::Error| CompMatchError::InputList {
        path: path.to_path_buf(),
        reason: err.to_string(),
    };
    let file = File::open(path).map_err(to_err)?;
    read_list(BufReader::new(file)).map_err(to_err)
}

/// Joins every subject with every candidate filename and keeps existing files.
///
/// Subjects without any existing file are kept with an empty list. Repeated
/// subjects are only listed once. Fails with [`CompMatchError::NoInput`] when
/// no file exists for any subject.
pub fn discover_candidates<P: ImageProvider + ?Sized>(
    subjects: &[String],
    filenames: &[String],
    provider: &P,
) -> CompMatchResult<Vec<SubjectCandidates>> {
    let mut seen = HashSet::new();
    let mut found = Vec::with_capacity(subjects.len());
    let mut total = 0usize;
    for subject in subjects {
        if !seen.insert(subject.as_str()) {
            trace_warn!("duplicate_subject", subject = subject.as_str());
            continue;
        }
        let dir = Path::new(subject);
        let paths: Vec<PathBuf> = filenames
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| provider.exists(path))
            .collect();
        trace_event!(
            "candidates_found",
            subject = subject.as_str(),
            count = paths.len()
        );
        total += paths.len();
        found.push(SubjectCandidates {
            subject: subject.clone(),
            paths,
        });
    }
    if total == 0 {
        return Err(CompMatchError::NoInput {
            subjects: found.len(),
        });
    }
    Ok(found)
}
