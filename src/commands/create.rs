//! # Create Command Implementation
//!
//! Builds a manifest from repositories found under the search paths, each
//! at its currently checked-out commit, and saves it.
//!
//! ```bash
//! # Every repository in the current directory
//! manifestly create --add all --save-as release.manifest
//!
//! # Only some of them, with full SHAs
//! manifestly create --search-paths ~/src --add api,web --save-as release.manifest --full-shas
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use log::info;

use manifestly::defaults::SHA_LENGTH;
use manifestly::entry::ManifestEntry;
use manifestly::error::Error;
use manifestly::manifest::Manifest;
use manifestly::repository::Repository;
use manifestly::{suggestions, view};

use super::SearchArgs;

/// Create a manifest from local repositories
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Repositories to include: `all`, or comma-separated directory names
    #[arg(long, value_name = "DIRS", value_delimiter = ',', required = true)]
    pub add: Vec<String>,

    /// Where to write the manifest
    #[arg(long, value_name = "FILE")]
    pub save_as: PathBuf,

    /// Write full commit SHAs instead of abbreviated ones
    #[arg(long)]
    pub full_shas: bool,
}

/// The repositories named by `--add`, in the order given.
fn select(
    repositories: &[Arc<dyn Repository>],
    names: &[String],
) -> Result<Vec<Arc<dyn Repository>>> {
    if names.iter().any(|name| name == "all") {
        for repository in repositories {
            let label = repository.directory_label();
            let paths: Vec<String> = repositories
                .iter()
                .filter(|other| other.directory_label() == label)
                .map(|other| other.path().display().to_string())
                .collect();
            if paths.len() > 1 {
                return Err(suggestions::duplicate_repository(&label, &paths));
            }
        }
        return Ok(repositories.to_vec());
    }

    names
        .iter()
        .map(|name| {
            ManifestEntry::new(None, name.as_str(), "HEAD")
                .resolve(repositories)
                .map_err(|e| suggestions::explain(e, repositories))
        })
        .collect()
}

/// Execute the `create` command.
pub fn execute(args: CreateArgs) -> Result<()> {
    let repositories = args.search.discover()?;
    let selected = select(&repositories, &args.add)?;

    let mut manifest = Manifest::new();
    for repository in selected {
        match manifest.add_repository(repository) {
            Ok(()) => {}
            // `--add api,api` names the same repository twice.
            Err(Error::DuplicateEntry { directory }) => {
                info!("{} is already in the manifest", directory);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !args.full_shas {
        manifest.abbreviate_commits(SHA_LENGTH);
    }

    manifest.write(&args.save_as)?;
    info!("Saved manifest to {}", args.save_as.display());

    print!("{}", view::render_manifest(&manifest));
    Ok(())
}
