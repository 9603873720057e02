//! Command line argument parsing for the intent-cascade CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// intent-cascade - pattern table, neural classifier and fallback for assistant utterances
#[derive(Parser, Debug, Clone)]
#[command(name = "intent-cascade")]
#[command(about = "Recognise the intent of assistant utterances")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct CascadeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "FILE", env = "INTENT_CASCADE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl CascadeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the classifier and persist the model
    Train(TrainArgs),

    /// Recognise the intent of an utterance
    Classify(ClassifyArgs),

    /// Show metadata and dimensions of a persisted model
    Inspect(InspectArgs),

    /// List the pattern table in priority order
    Patterns,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Train(_) => "train",
            Command::Classify(_) => "classify",
            Command::Inspect(_) => "inspect",
            Command::Patterns => "patterns",
        }
    }
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Training corpus (JSON). The bundled corpus is used when omitted
    #[arg(long, value_name = "FILE")]
    pub corpus: Option<PathBuf>,

    /// Directory the model is written to
    #[arg(short, long, value_name = "DIR")]
    pub model_dir: PathBuf,

    /// Training epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Hidden layer size
    #[arg(long)]
    pub hidden: Option<usize>,

    /// Learning rate
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Seed for reproducible weights
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Directory holding a trained model. Patterns and fallback only when omitted
    #[arg(short, long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Minimum classifier confidence (exclusive)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Utterance to classify
    #[arg(value_name = "TEXT", required = true, num_args = 1..)]
    pub text: Vec<String>,
}

impl ClassifyArgs {
    /// The utterance, joined back from its words.
    pub fn utterance(&self) -> String {
        self.text.join(" ")
    }
}

/// Arguments for model inspection
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Directory holding a trained model
    #[arg(short, long, value_name = "DIR")]
    pub model_dir: PathBuf,

    /// Also list vocabulary and classes
    #[arg(long)]
    pub detailed: bool,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
