//! Download command implementation
//!
//! Writes a manifest file as it was at one commit of a manifest repository.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use manifestly::repository::Repository;

use super::RemoteArgs;

/// Arguments for the download command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Path of the manifest inside the manifest repository
    #[arg(long, value_name = "PATH")]
    pub repo_file: String,

    /// Commit to download the manifest from
    #[arg(long)]
    pub sha: String,

    /// Where to write the manifest (defaults to the file's name in the
    /// current directory)
    #[arg(long, value_name = "FILE")]
    pub save_as: Option<PathBuf>,
}

/// Execute the download command
pub fn execute(args: DownloadArgs) -> Result<()> {
    let repository = args.remote.open()?;
    let commit = repository.find_commit(&args.sha)?;
    let contents = repository
        .file_at(&commit.sha, &args.repo_file)
        .with_context(|| format!("{} does not exist at {}", args.repo_file, commit.short_sha()))?;

    let target = match args.save_as {
        Some(path) => path,
        None => Path::new(&args.repo_file)
            .file_name()
            .map(PathBuf::from)
            .with_context(|| format!("cannot derive a file name from '{}'", args.repo_file))?,
    };

    fs::write(&target, contents)?;
    info!("Downloaded {} at {}", args.repo_file, commit.short_sha());
    println!("{}", target.display());
    Ok(())
}
