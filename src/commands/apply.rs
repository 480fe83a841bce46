//! Apply command implementation
//!
//! Checks out every repository listed in a manifest at the commit its
//! entry names. Commits that are not in the local clone require
//! `--update`, which fetches each repository before checking it out.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use log::info;

use manifestly::commit::abbreviate_sha;
use manifestly::error::Error;
use manifestly::manifest::Manifest;
use manifestly::suggestions;

use super::SearchArgs;

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Manifest file to apply
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Fetch each repository before checking out
    #[arg(long)]
    pub update: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs) -> Result<()> {
    if !args.file.exists() {
        return Err(suggestions::manifest_file_not_found(&args.file));
    }

    let repositories = args.search.discover()?;
    let manifest = Manifest::read_file(&args.file, &repositories)
        .map_err(|e| suggestions::explain(e, &repositories))?;

    for item in manifest.items() {
        let repository = item.repository();
        if args.update {
            info!("Fetching {}", repository.display_name());
            repository.fetch()?;
        }

        let commit = match repository.find_commit(item.commit()) {
            Ok(commit) => commit,
            Err(Error::CommitNotFound { .. }) if !args.update => {
                return Err(suggestions::update_required(item.directory(), item.commit()));
            }
            Err(e) => return Err(e.into()),
        };

        repository.checkout(&commit.sha)?;
        println!("{} -> {}", item.entry.label(), abbreviate_sha(&commit.sha));
    }

    Ok(())
}
