use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clauselens_client::DEFAULT_MAX_FILE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Top-level CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "clauselens",
    version,
    about = "Upload a contract, analyse it, and ask questions about it"
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,
    #[command(subcommand)]
    pub command: Commands,
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// Backend connection settings.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Base URL of the analysis backend.
    #[arg(long, env = "CLAUSELENS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Use canned offline responses instead of the backend.
    #[arg(long, env = "CLAUSELENS_DEMO")]
    pub demo: bool,
    /// Largest file accepted for upload, in bytes.
    #[arg(long, env = "CLAUSELENS_MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,
    /// Per-request timeout in seconds. Analysis calls can be slow.
    #[arg(long, env = "CLAUSELENS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the backend is up.
    Health,
    /// Upload a document and report what was extracted.
    Upload {
        /// A .pdf or .docx file.
        file: PathBuf,
        /// Print the full extracted text.
        #[arg(long)]
        text: bool,
    },
    /// Upload a document and run a comprehensive analysis.
    Analyze(AnalyzeArgs),
    /// Upload a document and ask a question about it.
    Ask {
        file: PathBuf,
        question: String,
    },
    /// Explain a single clause in plain language.
    Explain {
        clause: String,
        /// Surrounding text that helps interpret the clause.
        #[arg(long, default_value = "")]
        context: String,
    },
    /// Upload a document and summarise it.
    Summarize { file: PathBuf },
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    pub file: PathBuf,
    /// Upload and analyse in a single request.
    #[arg(long)]
    pub combined: bool,
    /// Print the normalized insight as JSON instead of a card.
    #[arg(long)]
    pub json: bool,
}
