//! Line-oriented report writers.

use crate::matcher::SubjectScores;
use crate::util::{CompMatchError, CompMatchResult};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Template basename used for report names: `.nii.gz`, `.nii`, `.hdr` and
/// `.img` are stripped, anything else loses its last extension.
pub fn template_basename(template: &Path) -> String {
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for ext in [".nii.gz", ".nii", ".hdr", ".img"] {
        if let Some(stem) = name.strip_suffix(ext) {
            if !stem.is_empty() {
                return stem.to_owned();
            }
        }
    }
    template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(name)
}

/// `<output_dir>/<basename>_<suffix>.txt`.
pub fn report_path(output_dir: &Path, template: &Path, suffix: &str) -> PathBuf {
    output_dir.join(format!("{}_{suffix}.txt", template_basename(template)))
}

fn header_line(template: &Path) -> String {
    format!("{}:template", template.display())
}

/// Writes `<template>:template` followed by `<identity>\t<score>` lines.
pub struct ReportWriter<W: Write> {
    out: W,
    label: PathBuf,
    lines: usize,
}

impl<W: Write> ReportWriter<W> {
    /// Writes the header line. `label` names the destination in errors.
    pub fn new(mut out: W, template: &Path, label: &Path) -> CompMatchResult<Self> {
        writeln!(out, "{}", header_line(template)).map_err(|err| output_err(label, err))?;
        Ok(Self {
            out,
            label: label.to_path_buf(),
            lines: 0,
        })
    }

    /// Appends one line per scored candidate of `scores`.
    pub fn write_subject(&mut self, scores: &SubjectScores) -> CompMatchResult<()> {
        for entry in scores.entries() {
            writeln!(self.out, "{}\t{}", entry.identity, entry.score)
                .map_err(|err| output_err(&self.label, err))?;
            self.lines += 1;
        }
        Ok(())
    }

    /// Number of data lines written so far.
    pub fn data_lines(&self) -> usize {
        self.lines
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> CompMatchResult<W> {
        self.out
            .flush()
            .map_err(|err| output_err(&self.label, err))?;
        Ok(self.out)
    }
}

/// Writes the top-ranked candidates of each subject as `<identity>:<score>`.
pub struct BestCompsWriter<W: Write> {
    out: W,
    label: PathBuf,
    k: usize,
}

impl<W: Write> BestCompsWriter<W> {
    /// Writes the header line; `k` is the number of entries kept per subject.
    pub fn new(mut out: W, template: &Path, label: &Path, k: usize) -> CompMatchResult<Self> {
        writeln!(out, "{}", header_line(template)).map_err(|err| output_err(label, err))?;
        Ok(Self {
            out,
            label: label.to_path_buf(),
            k,
        })
    }

    /// Appends the `k` best entries of `scores`.
    pub fn write_subject(&mut self, scores: &SubjectScores) -> CompMatchResult<()> {
        for entry in scores.ranked(self.k) {
            writeln!(self.out, "{}:{}", entry.identity, entry.score)
                .map_err(|err| output_err(&self.label, err))?;
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> CompMatchResult<W> {
        self.out
            .flush()
            .map_err(|err| output_err(&self.label, err))?;
        Ok(self.out)
    }
}

pub(crate) fn output_err(path: &Path, err: std::io::Error) -> CompMatchError {
    CompMatchError::OutputIo {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
