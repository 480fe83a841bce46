//! Upload command implementation
//!
//! Commits a local manifest file into a manifest repository and pushes it.
//! The new commit's SHA is printed; when the repository already holds
//! exactly this content, the SHA of the commit that last changed the file
//! is printed instead.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use log::warn;

use manifestly::defaults::UPLOAD_MESSAGE;
use manifestly::entry::LineCodec;
use manifestly::error::Error;
use manifestly::manifest::Manifest;
use manifestly::suggestions;

use super::RemoteArgs;

/// Arguments for the upload command
#[derive(Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Path of the manifest inside the manifest repository
    #[arg(long, value_name = "PATH")]
    pub repo_file: String,

    /// Local manifest file to upload
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Commit message
    #[arg(short, long)]
    pub message: Option<String>,
}

/// Execute the upload command
pub fn execute(args: UploadArgs) -> Result<()> {
    if !args.file.exists() {
        return Err(suggestions::manifest_file_not_found(&args.file));
    }
    let contents = fs::read_to_string(&args.file)?;

    // Refuse to publish something that cannot be read back.
    let codec = LineCodec::new()?;
    for line in Manifest::significant_lines(&contents) {
        codec.decode(line)?;
    }

    let repository = args.remote.open()?;
    let message = args.message.as_deref().unwrap_or(UPLOAD_MESSAGE);

    let sha = match repository.commit_file(&args.repo_file, &contents, message) {
        Ok(sha) => sha,
        Err(Error::NoContentChange { file }) => {
            warn!("{} is unchanged, nothing to upload", file);
            repository.last_commit_touching(&args.repo_file)?
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", sha);
    Ok(())
}
