//! # Diff Command Implementation
//!
//! Prints a markdown changelog of the pull requests merged between two
//! manifests. The manifests come either from two commits of a manifest
//! repository or from two local files.
//!
//! ```bash
//! manifestly diff --search-paths ~/src \
//!     --repo git@github.com:org/manifests.git --from-sha 1a2b3c --to-sha 4d5e6f
//!
//! manifestly diff --search-paths ~/src --from-file old.manifest --to-file new.manifest
//! ```
//!
//! With `--repo`, the manifest compared is the one file changed between
//! the two commits, unless `--repo-file` names it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use log::debug;

use manifestly::changelog::ManifestDiff;
use manifestly::manifest::Manifest;
use manifestly::repository::Repository;
use manifestly::suggestions;
use manifestly::unified_diff::Diff;

use super::{open_remote, SearchArgs};

/// Show the pull requests between two manifests
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// URL of the manifest repository
    #[arg(
        long,
        value_name = "URL",
        requires_all = ["from_sha", "to_sha"],
        conflicts_with_all = ["from_file", "to_file"]
    )]
    pub repo: Option<String>,

    /// The root directory for the repository cache.
    #[arg(long, value_name = "DIR", env = "MANIFESTLY_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Manifest repository commit of the older manifest
    #[arg(long, requires = "repo")]
    pub from_sha: Option<String>,

    /// Manifest repository commit of the newer manifest
    #[arg(long, requires = "repo")]
    pub to_sha: Option<String>,

    /// Path of the manifest inside the manifest repository
    #[arg(long, value_name = "PATH", requires = "repo")]
    pub repo_file: Option<String>,

    /// Older manifest file
    #[arg(long, value_name = "FILE", requires = "to_file")]
    pub from_file: Option<PathBuf>,

    /// Newer manifest file
    #[arg(long, value_name = "FILE", requires = "from_file")]
    pub to_file: Option<PathBuf>,
}

/// The one manifest file changed between two commits.
fn changed_file(source: &dyn Repository, from: &str, to: &str) -> Result<String> {
    let diff = Diff::parse(&source.diff_text(from, to)?)?;
    match diff.surviving_files().as_slice() {
        [file] => Ok(file.to_string()),
        files => Err(suggestions::ambiguous_manifest_file(files)),
    }
}

fn load_from_repository(
    args: &DiffArgs,
    url: &str,
    repositories: &[Arc<dyn Repository>],
) -> Result<(Manifest, Manifest)> {
    let (Some(from_sha), Some(to_sha)) = (&args.from_sha, &args.to_sha) else {
        anyhow::bail!("--repo needs both --from-sha and --to-sha");
    };

    let source: Arc<dyn Repository> = Arc::new(open_remote(url, args.cache_root.clone())?);
    let from_sha = source.find_commit(from_sha)?.sha;
    let to_sha = source.find_commit(to_sha)?.sha;

    let file = match &args.repo_file {
        Some(file) => file.clone(),
        None => changed_file(source.as_ref(), &from_sha, &to_sha)?,
    };
    debug!("Comparing {} from {} to {}", file, from_sha, to_sha);

    let explain = |e| suggestions::explain(e, repositories);
    let from = Manifest::from_commit(Arc::clone(&source), &from_sha, &file, repositories)
        .map_err(explain)?;
    let to = Manifest::from_commit(source, &to_sha, &file, repositories).map_err(explain)?;
    Ok((from, to))
}

fn load_from_files(
    args: &DiffArgs,
    repositories: &[Arc<dyn Repository>],
) -> Result<(Manifest, Manifest)> {
    let (Some(from_file), Some(to_file)) = (&args.from_file, &args.to_file) else {
        anyhow::bail!("Give either --repo with --from-sha/--to-sha, or --from-file and --to-file");
    };

    for path in [from_file, to_file] {
        if !path.exists() {
            return Err(suggestions::manifest_file_not_found(path));
        }
    }

    let explain = |e| suggestions::explain(e, repositories);
    let from = Manifest::read_file(from_file, repositories).map_err(explain)?;
    let to = Manifest::read_file(to_file, repositories).map_err(explain)?;
    Ok((from, to))
}

/// Execute the `diff` command.
pub fn execute(args: DiffArgs) -> Result<()> {
    let repositories = args.search.discover()?;

    let (from, to) = match &args.repo {
        Some(url) => load_from_repository(&args, url, &repositories)?,
        None => load_from_files(&args, &repositories)?,
    };

    let changelog = ManifestDiff::new(&from, &to)?;
    print!("{}", changelog.to_markdown());
    Ok(())
}
