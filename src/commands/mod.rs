//! # CLI Command Implementations
//!
//! One file per subcommand of the `manifestly` command-line tool. Each
//! module defines an `Args` struct derived with `clap` and an `execute`
//! function that calls into the `manifestly` library.
//!
//! Argument groups shared by several commands live here.

pub mod apply;
pub mod commits;
pub mod completions;
pub mod create;
pub mod diff;
pub mod download;
pub mod find;
pub mod tag;
pub mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use log::debug;

use manifestly::defaults::default_cache_root;
use manifestly::repository::{self, GitRepository, Repository};

/// Where to look for local working copies.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Directories whose immediate subdirectories are repositories
    #[arg(long, value_name = "PATH", num_args = 1.., default_value = ".")]
    pub search_paths: Vec<PathBuf>,
}

impl SearchArgs {
    pub fn discover(&self) -> Result<Vec<Arc<dyn Repository>>> {
        let repositories = repository::discover(&self.search_paths)?;
        debug!(
            "Found {} repositories under {:?}",
            repositories.len(),
            self.search_paths
        );
        Ok(repositories)
    }
}

/// A remote manifest repository and where to keep its clone.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// URL of the manifest repository
    #[arg(long, value_name = "URL")]
    pub repo: String,

    /// Cache root directory
    #[arg(long, value_name = "PATH", env = "MANIFESTLY_CACHE")]
    pub cache_root: Option<PathBuf>,
}

impl RemoteArgs {
    pub fn open(&self) -> Result<GitRepository> {
        open_remote(&self.repo, self.cache_root.clone())
    }
}

/// Clone or refresh `url` under the cache root.
pub fn open_remote(url: &str, cache_root: Option<PathBuf>) -> Result<GitRepository> {
    let cache_root = cache_root.unwrap_or_else(default_cache_root);
    Ok(GitRepository::open_remote(url, &cache_root)?)
}
