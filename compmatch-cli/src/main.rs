use clap::{Parser, ValueEnum};
use compmatch::io::NiftiProvider;
use compmatch::{
    run, Comparison, CompMatchError, Criterion, ImageProvider, RunConfig, RunConfigBuilder,
    ScoreMode,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_NO_INPUT: u8 = 32;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Match component images of each subject against a template map",
    after_help = "Writes <template>_beststats.txt (every score) and \
                  <template>_bestcomps.txt (top matches per subject) to the output directory."
)]
struct Cli {
    /// Template image to match against, e.g. a group network.
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,
    /// Single-column file listing subject (or group) folders.
    #[arg(short, long, value_name = "FILE")]
    subs: Option<PathBuf>,
    /// Single-column file listing component image names inside each folder.
    #[arg(short, long, value_name = "FILE")]
    images: Option<PathBuf>,
    /// Output folder [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// JSON config file; command-line flags take precedence.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Score aggregation.
    #[arg(long, value_enum)]
    mode: Option<ModeConfig>,
    /// Comparison used to select template voxels (>, >=, <, <=, ==, !=).
    #[arg(long, value_name = "OP")]
    crit: Option<Comparison>,
    /// Threshold compared against template voxels.
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    threshold: Option<f32>,
    /// Matches kept per subject in the bestcomps report (0 disables it).
    #[arg(long, value_name = "N")]
    top_k: Option<usize>,
    /// Score subjects in parallel.
    #[arg(long)]
    parallel: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    Abs,
    Signed,
}

impl From<ModeConfig> for ScoreMode {
    fn from(value: ModeConfig) -> Self {
        match value {
            ModeConfig::Abs => ScoreMode::Absolute,
            ModeConfig::Signed => ScoreMode::Signed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CriterionConfig {
    op: String,
    value: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    template: Option<PathBuf>,
    subs: Option<PathBuf>,
    images: Option<PathBuf>,
    output: Option<PathBuf>,
    criterion: Option<CriterionConfig>,
    mode: Option<ModeConfig>,
    top_k: Option<usize>,
    parallel: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read config {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
    #[error(transparent)]
    Run(#[from] CompMatchError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Config { .. } => EXIT_USAGE,
            CliError::Run(CompMatchError::NoInput { .. }) => EXIT_NO_INPUT,
            CliError::Run(CompMatchError::MissingField(_) | CompMatchError::InvalidCriterion(_)) => {
                EXIT_USAGE
            }
            CliError::Run(_) => EXIT_FAILURE,
        }
    }
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, CliError> {
        let to_err = |reason: String| CliError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|err| to_err(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| to_err(err.to_string()))
    }

    fn into_builder(self) -> Result<RunConfigBuilder, CliError> {
        let criterion = match self.criterion {
            Some(c) => Some(Criterion::new(c.op.parse()?, c.value)),
            None => None,
        };
        Ok(RunConfigBuilder {
            template: self.template,
            subjects_list: self.subs,
            images_list: self.images,
            output_dir: self.output,
            criterion,
            mode: self.mode.map(ScoreMode::from),
            top_k: self.top_k,
            parallel: self.parallel,
        })
    }
}

impl Cli {
    /// Flags layered over the optional config file, then validated.
    fn run_config(&self) -> Result<RunConfig, CliError> {
        let base = match &self.config {
            Some(path) => FileConfig::load(path)?.into_builder()?,
            None => RunConfigBuilder::default(),
        };
        let criterion = if self.crit.is_some() || self.threshold.is_some() {
            let current = base.criterion.unwrap_or_default();
            Some(Criterion::new(
                self.crit.unwrap_or(current.comparison),
                self.threshold.unwrap_or(current.value),
            ))
        } else {
            None
        };
        let flags = RunConfigBuilder {
            template: self.template.clone(),
            subjects_list: self.subs.clone(),
            images_list: self.images.clone(),
            output_dir: self.output.clone(),
            criterion,
            mode: self.mode.map(ScoreMode::from),
            top_k: self.top_k,
            parallel: self.parallel.then_some(true),
        };
        Ok(base.merge(flags).build()?)
    }
}

fn execute<P: ImageProvider>(cli: &Cli, provider: &P) -> Result<(), CliError> {
    let config = cli.run_config()?;
    tracing::debug!(?config, "resolved configuration");
    let summary = run(&config, provider)?;
    println!(
        "Scored {} candidate(s) across {} subject(s) at {} template voxel(s)",
        summary.scored, summary.subjects, summary.index_len
    );
    println!("Full results printed to: {}", summary.beststats.display());
    if let Some(path) = &summary.bestcomps {
        println!("Best matches printed to: {}", path.display());
    }
    Ok(())
}

fn init_tracing(quiet: bool) {
    let level = if quiet { "compmatch=warn" } else { "compmatch=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.quiet);
    match execute(&cli, &NiftiProvider) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("compmatch: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "compmatch-cli-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("compmatch").chain(args.iter().copied())).unwrap()
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn help_exits_zero_and_bad_flags_exit_two() {
        let help = Cli::try_parse_from(["compmatch", "--help"]).unwrap_err();
        assert_eq!(help.exit_code(), 0);
        let bad = Cli::try_parse_from(["compmatch", "--bogus"]).unwrap_err();
        assert_eq!(bad.exit_code(), 2);
        let bad_op = Cli::try_parse_from(["compmatch", "--crit", "=>"]).unwrap_err();
        assert_eq!(bad_op.exit_code(), 2);
    }

    #[test]
    fn missing_template_is_a_usage_error() {
        let cli = parse(&["-s", "subs.txt", "-i", "images.txt"]);
        let err = cli.run_config().unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = scratch_dir("config");
        let cfg_path = dir.join("config.json");
        fs::write(
            &cfg_path,
            r#"{"template": "a.nii", "subs": "s.txt", "images": "i.txt",
                "criterion": {"op": ">=", "value": 2.5}, "mode": "signed", "top_k": 1}"#,
        )
        .unwrap();
        let cli = parse(&["-c", path_str(&cfg_path), "-t", "b.nii", "--threshold", "-1"]);
        let cfg = cli.run_config().unwrap();
        assert_eq!(cfg.template, PathBuf::from("b.nii"));
        assert_eq!(cfg.criterion, Criterion::new(Comparison::GreaterEq, -1.0));
        assert_eq!(cfg.mode, ScoreMode::Signed);
        assert_eq!(cfg.top_k, 1);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
    }

    #[test]
    fn example_config_parses() {
        let cfg: FileConfig = serde_json::from_str(EXAMPLE_JSON).unwrap();
        let built = cfg.into_builder().unwrap().build().unwrap();
        assert_eq!(built.mode, ScoreMode::Absolute);
        assert_eq!(built.criterion, Criterion::positive());
    }

    #[test]
    fn no_candidate_files_exit_32() {
        let dir = scratch_dir("no-input");
        let s1 = dir.join("s1");
        let s2 = dir.join("s2");
        fs::create_dir_all(&s1).unwrap();
        fs::create_dir_all(&s2).unwrap();
        let subs = dir.join("subs.txt");
        let images = dir.join("images.txt");
        fs::write(&subs, format!("{}\n{}\n", s1.display(), s2.display())).unwrap();
        fs::write(&images, "compA.nii\ncompB.nii\n").unwrap();

        let cli = parse(&[
            "-t",
            path_str(&dir.join("template.nii.gz")),
            "-s",
            path_str(&subs),
            "-i",
            path_str(&images),
            "-o",
            path_str(&dir),
        ]);
        let err = execute(&cli, &NiftiProvider).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NO_INPUT);
        assert!(!dir.join("template_beststats.txt").exists());
    }

    #[test]
    fn unreadable_list_is_fatal() {
        let dir = scratch_dir("missing-list");
        let cli = parse(&[
            "-t",
            "t.nii",
            "-s",
            path_str(&dir.join("absent.txt")),
            "-i",
            path_str(&dir.join("absent.txt")),
        ]);
        let err = execute(&cli, &NiftiProvider).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }
}
