//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Manifestly - Create, diff, tag and retrieve multi-repository manifests
#[derive(Parser, Debug)]
#[command(name = "manifestly")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a manifest from the repositories under the search paths
    Create(commands::create::CreateArgs),

    /// Check out every repository at the commit its manifest entry names
    Apply(commands::apply::ApplyArgs),

    /// Commit a manifest file to a manifest repository and push it
    Upload(commands::upload::UploadArgs),

    /// Fetch a manifest file as of a commit of a manifest repository
    Download(commands::download::DownloadArgs),

    /// Tag a manifest repository commit, scoped to the manifest files it changes
    Tag(commands::tag::TagArgs),

    /// List the commits carrying a tag, most recently tagged first
    Find(commands::find::FindArgs),

    /// Print a changelog of the pull requests between two manifests
    Diff(commands::diff::DiffArgs),

    /// Show a page of a repository's commit history
    Commits(commands::commits::CommitsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Create(args) => commands::create::execute(args),
            Commands::Apply(args) => commands::apply::execute(args),
            Commands::Upload(args) => commands::upload::execute(args),
            Commands::Download(args) => commands::download::execute(args),
            Commands::Tag(args) => commands::tag::execute(args),
            Commands::Find(args) => commands::find::execute(args),
            Commands::Diff(args) => commands::diff::execute(args),
            Commands::Commits(args) => commands::commits::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when it is set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // Already initialised is fine.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
