//! Commits command implementation
//!
//! Shows one page of a repository's history, newest first, optionally
//! limited to merged pull requests. Useful for picking the commit a
//! manifest entry should point at.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use manifestly::git;
use manifestly::repository::{GitRepository, Repository};
use manifestly::view::{self, CommitView};

/// Arguments for the commits command
#[derive(Args, Debug)]
pub struct CommitsArgs {
    /// Repository working tree
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo_dir: PathBuf,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Only show merged pull requests
    #[arg(long)]
    pub prs_only: bool,
}

/// Execute the commits command
pub fn execute(args: CommitsArgs) -> Result<()> {
    if !git::is_repository(&args.repo_dir) {
        anyhow::bail!("Not a git repository: {}", args.repo_dir.display());
    }
    let repository = GitRepository::open(&args.repo_dir)?;

    let page = usize::try_from(args.page - 1)?;
    let view = CommitView::new(page, args.prs_only);
    let commits = repository.recent_commits(view.fetch_limit(), view.prs_only)?;

    println!("Commits for {}:\n", repository.display_name());
    print!("{}", view::render_commits(&commits, &view));
    Ok(())
}
