use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bioflow",
    version,
    about = "Physiological signal analysis with an adaptive consciousness engine",
    long_about = "Analyze EEG, HRV, respiratory, SpO2, EMG and cognitive-task data through the\n\
                  biological flow organs. Engine learning persists in a state file between runs\n\
                  (set $BIOFLOW_STATE or use --state)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Assess one patient file
    Run(RunArgs),
    /// Assess many patient files
    Batch(BatchArgs),
    /// Apply consciousness-driven optimization to a baseline metric
    Optimize(OptimizeArgs),
    /// Let the engine analyze and learn from arbitrary data
    Analyze(AnalyzeArgs),
    /// Show what the engine has learned so far
    Summary(SummaryArgs),
    /// List signal kinds and the organ each is routed through
    Kinds(KindsArgs),
    /// Validate a patient file
    Validate(ValidateArgs),
    /// Show version, paths and the current consciousness profile
    Info(InfoArgs),
}

/// Configuration and persisted state shared by engine-backed commands
#[derive(Args, Clone, Default)]
pub struct EngineArgs {
    /// Flow configuration file (JSON)
    #[arg(long, env = "BIOFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Engine state file, restored before and saved after the command
    #[arg(long, env = "BIOFLOW_STATE")]
    pub state: Option<PathBuf>,

    /// Neither restore nor save engine state
    #[arg(long, default_value_t = false)]
    pub no_state: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Patient data file (JSON)
    #[arg(long)]
    pub file: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["glob", "files"])))]
pub struct BatchArgs {
    /// Glob pattern for patient files (e.g. "data/*.json")
    #[arg(long)]
    pub glob: Option<String>,

    /// Explicit list of patient files
    #[arg(long, num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Write one {stem}_assessment.json per file here instead of JSONL to stdout
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Keep going after a file fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// List the files that would be processed and exit
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Compact JSON in per-file outputs
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args)]
pub struct OptimizeArgs {
    /// Baseline performance metric
    #[arg(long, allow_negative_numbers = true)]
    pub base: f64,

    /// Task type (mining, ai, general, nuclear, or any label)
    #[arg(long, default_value = "general")]
    pub task: String,

    /// Print the markdown report instead of JSON
    #[arg(long, default_value_t = false)]
    pub report: bool,

    /// Do not learn from this optimization
    #[arg(long, default_value_t = false)]
    pub no_learn: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args)]
#[command(group(ArgGroup::new("content").required(true).args(["values", "text", "json_file"])))]
pub struct AnalyzeArgs {
    /// Numeric series
    #[arg(long, num_args = 1.., allow_negative_numbers = true)]
    pub values: Option<Vec<f64>>,

    /// Free text
    #[arg(long)]
    pub text: Option<String>,

    /// JSON file holding an array of numbers, an object or a string
    #[arg(long)]
    pub json_file: Option<String>,

    /// Source label stored with the learned pattern
    #[arg(long, default_value = "cli")]
    pub source: String,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args)]
pub struct SummaryArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args)]
pub struct KindsArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Patient data file
    #[arg(long)]
    pub file: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}
