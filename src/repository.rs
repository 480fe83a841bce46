//! # Repository Access
//!
//! Everything the manifest, tag and changelog engines need from a version
//! control repository is expressed by the [`Repository`] trait. The engines
//! only ever hold `Arc<dyn Repository>`, which keeps them free of any git
//! specifics and lets tests substitute an in-memory fake.
//!
//! [`GitRepository`] is the real implementation, backed by the system `git`
//! command through [`crate::git`]. It is used both for the working copies
//! found under the search paths and for clones of remote manifest
//! repositories kept in the cache directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use walkdir::WalkDir;

use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::git;

/// The operations the core needs from one repository.
pub trait Repository: Send + Sync {
    /// Location of the working tree; also the repository's identity for
    /// membership checks.
    fn path(&self) -> &Path;

    /// `org/name` taken from the origin remote, if there is one.
    fn identity(&self) -> Option<String>;

    /// Label used to match manifest entries: the working tree's directory name.
    fn directory_label(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Name used in links and headings.
    fn display_name(&self) -> String {
        self.identity().unwrap_or_else(|| self.directory_label())
    }

    /// Full SHA of `HEAD`.
    fn current_commit(&self) -> Result<String>;

    /// Look up a commit, failing with [`Error::CommitNotFound`].
    fn find_commit(&self, reference: &str) -> Result<Commit>;

    /// Names of tags pointing at `reference`.
    fn tags_at(&self, reference: &str) -> Result<Vec<String>>;

    /// Unified diff between two commits.
    fn diff_text(&self, from: &str, to: &str) -> Result<String>;

    /// Unified diff introduced by one commit.
    fn show_text(&self, reference: &str) -> Result<String>;

    /// Content of `file` as of `reference`.
    fn file_at(&self, reference: &str, file: &str) -> Result<String>;

    /// Commits reachable from `to` but not from `from`, oldest first.
    fn commits_between(&self, from: &str, to: &str, merges_only: bool) -> Result<Vec<Commit>>;

    /// The most recent commits on `HEAD`, newest first.
    fn recent_commits(&self, limit: usize, merges_only: bool) -> Result<Vec<Commit>>;

    /// Every tag name in the repository, in no particular order.
    fn tag_names(&self) -> Result<Vec<String>>;

    /// Raw annotation object of a tag (`object <sha>`, headers, message).
    fn tag_annotation(&self, name: &str) -> Result<String>;

    fn create_annotated_tag(&self, name: &str, target: &str, message: &str) -> Result<()>;

    fn push_tag(&self, name: &str) -> Result<()>;

    fn checkout(&self, reference: &str) -> Result<()>;

    fn fetch(&self) -> Result<()>;
}

const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%aI%x1f%B%x1e";
const PULL_REQUEST_GREP: &str = "--grep=^Merge pull request";

fn parse_log(output: &str) -> Vec<Commit> {
    output
        .split('\x1e')
        .filter_map(|record| {
            let mut fields = record.trim_start_matches('\n').splitn(4, '\x1f');
            let sha = fields.next()?.trim();
            if sha.is_empty() {
                return None;
            }
            Some(Commit {
                sha: sha.to_string(),
                author: fields.next().unwrap_or_default().to_string(),
                date: fields.next().unwrap_or_default().to_string(),
                message: fields.next().unwrap_or_default().trim_end().to_string(),
            })
        })
        .collect()
}

fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A repository backed by a git working tree on disk.
#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
    identity: Option<String>,
}

impl GitRepository {
    /// Open the working tree at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let identity = git::run(&path, &["config", "--get", "remote.origin.url"])
            .ok()
            .and_then(|url| git::remote_identity(url.trim()));

        Ok(Self { path, identity })
    }

    /// Open `path` if it is a git working tree, `None` otherwise.
    pub fn load(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        if !git::is_repository(&path) {
            return None;
        }
        Self::open(path).ok()
    }

    /// Clone (or refresh an existing clone of) a remote manifest repository
    /// inside `cache_root`. The clone is left on the remote's default
    /// branch with all of its tags.
    pub fn open_remote(url: &str, cache_root: &Path) -> Result<Self> {
        let path = git::url_to_cache_path(cache_root, url);

        if git::is_repository(&path) {
            debug!("Refreshing cached clone of {} at {}", url, path.display());
            let repository = Self::open(path)?;
            repository.fetch()?;
            if git::succeeds(&repository.path, &["rev-parse", "--verify", "-q", "@{upstream}"])? {
                git::run(&repository.path, &["reset", "-q", "--hard", "@{upstream}"])?;
            }
            Ok(repository)
        } else {
            info!("Cloning {} into {}", url, path.display());
            git::clone(url, &path)?;
            Self::open(path)
        }
    }

    fn log(&self, extra: &[&str], merges_only: bool) -> Result<Vec<Commit>> {
        let mut args = vec!["log", LOG_FORMAT];
        if merges_only {
            args.push(PULL_REQUEST_GREP);
        }
        args.extend_from_slice(extra);

        let commits = parse_log(&git::run(&self.path, &args)?);
        Ok(if merges_only {
            commits.into_iter().filter(Commit::is_pr).collect()
        } else {
            commits
        })
    }

    /// Write `contents` to `file` in the working tree, commit it and push
    /// the current branch. Returns the new commit's SHA.
    ///
    /// Fails with [`Error::NoContentChange`] when the file already has
    /// exactly this content.
    pub fn commit_file(&self, file: &str, contents: &str, message: &str) -> Result<String> {
        let target = self.path.join(file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, contents)?;

        git::run(&self.path, &["add", "--", file])?;
        if git::succeeds(&self.path, &["diff", "--cached", "--quiet", "--", file])? {
            return Err(Error::NoContentChange {
                file: file.to_string(),
            });
        }

        git::run(&self.path, &["commit", "-q", "-m", message, "--", file])?;
        git::run(&self.path, &["push", "-q", "origin", "HEAD"])?;
        self.current_commit()
    }

    /// SHA of the most recent commit that changed `file`.
    pub fn last_commit_touching(&self, file: &str) -> Result<String> {
        let sha = git::run(&self.path, &["log", "-1", "--format=%H", "--", file])?;
        let sha = sha.trim();
        if sha.is_empty() {
            return Err(Error::CommitNotFound {
                reference: format!("last commit of {}", file),
                repository: self.display_name(),
            });
        }
        Ok(sha.to_string())
    }
}

impl Repository for GitRepository {
    fn path(&self) -> &Path {
        &self.path
    }

    fn identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn current_commit(&self) -> Result<String> {
        Ok(git::run(&self.path, &["rev-parse", "HEAD"])?.trim().to_string())
    }

    fn find_commit(&self, reference: &str) -> Result<Commit> {
        let spec = format!("{}^{{commit}}", reference);
        let not_found = || Error::CommitNotFound {
            reference: reference.to_string(),
            repository: self.display_name(),
        };

        if reference.is_empty()
            || !git::succeeds(&self.path, &["rev-parse", "--verify", "-q", spec.as_str()])?
        {
            return Err(not_found());
        }

        self.log(&["-1", spec.as_str()], false)?
            .into_iter()
            .next()
            .ok_or_else(not_found)
    }

    fn tags_at(&self, reference: &str) -> Result<Vec<String>> {
        Ok(lines(&git::run(
            &self.path,
            &["tag", "--points-at", reference],
        )?))
    }

    fn diff_text(&self, from: &str, to: &str) -> Result<String> {
        git::run(&self.path, &["diff", "--no-color", "--no-ext-diff", from, to])
    }

    fn show_text(&self, reference: &str) -> Result<String> {
        git::run(
            &self.path,
            &["show", "--no-color", "--no-ext-diff", "--format=", reference],
        )
    }

    fn file_at(&self, reference: &str, file: &str) -> Result<String> {
        git::run(&self.path, &["show", format!("{}:{}", reference, file).as_str()])
    }

    fn commits_between(&self, from: &str, to: &str, merges_only: bool) -> Result<Vec<Commit>> {
        let range = format!("{}..{}", from, to);
        self.log(&["--reverse", range.as_str()], merges_only)
    }

    fn recent_commits(&self, limit: usize, merges_only: bool) -> Result<Vec<Commit>> {
        let max_count = format!("--max-count={}", limit);
        self.log(&[max_count.as_str()], merges_only)
    }

    fn tag_names(&self) -> Result<Vec<String>> {
        Ok(lines(&git::run(&self.path, &["tag", "--list"])?))
    }

    fn tag_annotation(&self, name: &str) -> Result<String> {
        git::run(&self.path, &["cat-file", "-p", format!("refs/tags/{}", name).as_str()])
    }

    fn create_annotated_tag(&self, name: &str, target: &str, message: &str) -> Result<()> {
        git::run(&self.path, &["tag", "-a", name, target, "-m", message])?;
        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        git::run(
            &self.path,
            &["push", "-q", "origin", format!("refs/tags/{}", name).as_str()],
        )?;
        Ok(())
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        git::run(&self.path, &["checkout", "-q", reference])?;
        Ok(())
    }

    fn fetch(&self) -> Result<()> {
        git::run(&self.path, &["fetch", "-q", "--all", "--tags"])?;
        Ok(())
    }
}

/// Find every git working tree directly inside the search paths.
///
/// Only immediate subdirectories are considered; results are ordered by
/// search path, then by directory name.
pub fn discover<P: AsRef<Path>>(search_paths: &[P]) -> Result<Vec<Arc<dyn Repository>>> {
    let mut repositories: Vec<Arc<dyn Repository>> = Vec::new();

    for search_path in search_paths {
        for entry in WalkDir::new(search_path.as_ref())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(repository) = GitRepository::load(entry.path()) {
                debug!("Found repository {}", entry.path().display());
                repositories.push(Arc::new(repository));
            }
        }
    }

    Ok(repositories)
}
