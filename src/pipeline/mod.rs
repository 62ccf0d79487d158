//! End-to-end batch run: lists, discovery, template selection, scoring, reports.
//!
//! Subjects are processed in list order and candidates in filename-list order,
//! so two runs over the same inputs produce identical reports. With the
//! `rayon` feature and [`RunConfig::parallel`] set, subjects are scored
//! concurrently and written afterwards in the same order.

use crate::candidate::Candidate;
use crate::image::ImageProvider;
use crate::matcher::{Matcher, SubjectScores};
use crate::score::ScoreMode;
use crate::template::{Criterion, Template};
use crate::trace::{trace_event, trace_span};
#[cfg(not(feature = "rayon"))]
use crate::trace::trace_warn;
use crate::util::{CompMatchError, CompMatchResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

mod input;
mod report;

pub use input::{discover_candidates, read_list, read_list_file, SubjectCandidates};
pub use report::{report_path, template_basename, BestCompsWriter, ReportWriter};

/// Validated settings for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Template image path.
    pub template: PathBuf,
    /// Single-column list of subject directories.
    pub subjects_list: PathBuf,
    /// Single-column list of candidate filenames relative to each subject.
    pub images_list: PathBuf,
    /// Directory receiving the reports.
    pub output_dir: PathBuf,
    /// Template voxel predicate.
    pub criterion: Criterion,
    /// Score aggregation used for both reports.
    pub mode: ScoreMode,
    /// Entries per subject in the best-components report; 0 skips the report.
    pub top_k: usize,
    /// Score subjects concurrently (requires the `rayon` feature).
    pub parallel: bool,
}

impl RunConfig {
    /// Starts an empty builder.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Path of the `_beststats.txt` report.
    pub fn beststats_path(&self) -> PathBuf {
        report_path(&self.output_dir, &self.template, "beststats")
    }

    /// Path of the `_bestcomps.txt` report, if enabled.
    pub fn bestcomps_path(&self) -> Option<PathBuf> {
        (self.top_k > 0).then(|| report_path(&self.output_dir, &self.template, "bestcomps"))
    }
}

/// Collects optional settings; [`RunConfigBuilder::build`] checks required ones.
#[derive(Clone, Debug, Default)]
pub struct RunConfigBuilder {
    pub template: Option<PathBuf>,
    pub subjects_list: Option<PathBuf>,
    pub images_list: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub criterion: Option<Criterion>,
    pub mode: Option<ScoreMode>,
    pub top_k: Option<usize>,
    pub parallel: Option<bool>,
}

impl RunConfigBuilder {
    /// Sets the template image path.
    pub fn template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    /// Sets the subject list file.
    pub fn subjects_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.subjects_list = Some(path.into());
        self
    }

    /// Sets the candidate filename list file.
    pub fn images_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.images_list = Some(path.into());
        self
    }

    /// Sets the report directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets the template voxel predicate.
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = Some(criterion);
        self
    }

    /// Sets the score aggregation.
    pub fn mode(mut self, mode: ScoreMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the number of ranked entries per subject.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Enables parallel scoring across subjects.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Overwrites fields of `self` with those set in `other`.
    pub fn merge(self, other: RunConfigBuilder) -> Self {
        Self {
            template: other.template.or(self.template),
            subjects_list: other.subjects_list.or(self.subjects_list),
            images_list: other.images_list.or(self.images_list),
            output_dir: other.output_dir.or(self.output_dir),
            criterion: other.criterion.or(self.criterion),
            mode: other.mode.or(self.mode),
            top_k: other.top_k.or(self.top_k),
            parallel: other.parallel.or(self.parallel),
        }
    }

    /// Validates required fields and applies defaults.
    pub fn build(self) -> CompMatchResult<RunConfig> {
        let template = self.template.ok_or(CompMatchError::MissingField("template"))?;
        let subjects_list = self
            .subjects_list
            .ok_or(CompMatchError::MissingField("subs"))?;
        let images_list = self
            .images_list
            .ok_or(CompMatchError::MissingField("images"))?;
        Ok(RunConfig {
            template,
            subjects_list,
            images_list,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            criterion: self.criterion.unwrap_or_default(),
            mode: self.mode.unwrap_or_default(),
            top_k: self.top_k.unwrap_or(3),
            parallel: self.parallel.unwrap_or(false),
        })
    }
}

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Subjects processed, including those without candidates.
    pub subjects: usize,
    /// Data lines written to the beststats report.
    pub scored: usize,
    /// Number of template coordinates used for scoring.
    pub index_len: usize,
    /// Path of the written beststats report.
    pub beststats: PathBuf,
    /// Path of the written bestcomps report, if enabled.
    pub bestcomps: Option<PathBuf>,
}

/// Loads and scores every candidate of one subject.
pub fn score_subject<P: ImageProvider + ?Sized>(
    matcher: &Matcher,
    subject: &SubjectCandidates,
    provider: &P,
) -> CompMatchResult<SubjectScores> {
    let mut session = matcher.session(subject.subject.as_str());
    for path in &subject.paths {
        session.add_candidate(Candidate::load(&subject.subject, path, provider)?);
    }
    session.match_all()
}

/// Scores every subject in order, handing each result to `sink` as it completes.
///
/// The first failure aborts the run; subjects already handed to `sink` stay
/// written.
pub fn match_subjects<P, F>(
    matcher: &Matcher,
    subjects: &[SubjectCandidates],
    provider: &P,
    mut sink: F,
) -> CompMatchResult<()>
where
    P: ImageProvider + ?Sized,
    F: FnMut(&SubjectScores) -> CompMatchResult<()>,
{
    for subject in subjects {
        trace_event!("processing_subject", subject = subject.subject.as_str());
        let scores = score_subject(matcher, subject, provider)?;
        sink(&scores)?;
    }
    Ok(())
}

/// Scores subjects concurrently and returns results in input order.
#[cfg(feature = "rayon")]
pub fn match_subjects_par<P: ImageProvider + ?Sized>(
    matcher: &Matcher,
    subjects: &[SubjectCandidates],
    provider: &P,
) -> CompMatchResult<Vec<SubjectScores>> {
    use rayon::prelude::*;

    subjects
        .par_iter()
        .map(|subject| score_subject(matcher, subject, provider))
        .collect()
}

/// Writes all subjects to the reports, sequentially or in parallel per `parallel`.
pub fn write_reports<P, W1, W2>(
    matcher: &Matcher,
    subjects: &[SubjectCandidates],
    provider: &P,
    parallel: bool,
    report: &mut ReportWriter<W1>,
    mut bestcomps: Option<&mut BestCompsWriter<W2>>,
) -> CompMatchResult<()>
where
    P: ImageProvider + ?Sized,
    W1: Write,
    W2: Write,
{
    let mut emit = |scores: &SubjectScores| -> CompMatchResult<()> {
        report.write_subject(scores)?;
        if let Some(best) = bestcomps.as_deref_mut() {
            best.write_subject(scores)?;
        }
        Ok(())
    };

    if parallel {
        #[cfg(feature = "rayon")]
        {
            for scores in match_subjects_par(matcher, subjects, provider)? {
                emit(&scores)?;
            }
            return Ok(());
        }
        #[cfg(not(feature = "rayon"))]
        trace_warn!("parallel_unavailable", subjects = subjects.len());
    }

    match_subjects(matcher, subjects, provider, &mut emit)
}

/// Runs the full batch described by `config`.
///
/// Order of fatal checks: input lists, candidate discovery (exit status 32 in
/// the CLI when nothing exists), template volume, report files, candidates.
pub fn run<P: ImageProvider + ?Sized>(
    config: &RunConfig,
    provider: &P,
) -> CompMatchResult<RunSummary> {
    let _span = trace_span!("run").entered();

    let subjects = read_list_file(&config.subjects_list)?;
    let filenames = read_list_file(&config.images_list)?;
    let found = discover_candidates(&subjects, &filenames, provider)?;

    let template = Template::load(&config.template, provider)?;
    let matcher = Matcher::from_template(&template, &config.criterion).with_mode(config.mode);
    trace_event!(
        "template_ready",
        template = &*config.template.to_string_lossy(),
        indices = matcher.index_set().len()
    );

    let beststats = config.beststats_path();
    let mut report = ReportWriter::new(create(&beststats)?, &config.template, &beststats)?;
    let bestcomps_path = config.bestcomps_path();
    let mut bestcomps = match &bestcomps_path {
        Some(path) => Some(BestCompsWriter::new(
            create(path)?,
            &config.template,
            path,
            config.top_k,
        )?),
        None => None,
    };

    write_reports(
        &matcher,
        &found,
        provider,
        config.parallel,
        &mut report,
        bestcomps.as_mut(),
    )?;

    let scored = report.data_lines();
    report.finish()?;
    if let Some(best) = bestcomps {
        best.finish()?;
    }

    Ok(RunSummary {
        subjects: found.len(),
        scored,
        index_len: matcher.index_set().len(),
        beststats,
        bestcomps: bestcomps_path,
    })
}

fn create(path: &Path) -> CompMatchResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| report::output_err(path, err))
}
