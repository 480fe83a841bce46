//! # Manifest Changelogs
//!
//! Compares two manifests entry by entry and describes, as markdown, which
//! pull requests each repository gained (or lost) between them.
//!
//! Entries are matched by working-directory label. For a matched entry the
//! merged pull requests strictly after the old commit up to the new one
//! are listed. When that range is empty the reverse range is tried: commits
//! found there mean the manifest moved backwards and they are reported as
//! rolled back.

use log::debug;

use crate::commit::{abbreviate_sha, Commit};
use crate::error::Result;
use crate::manifest::{Manifest, ManifestItem};

const TITLE: &str = "# Manifest Diff";
const UNKNOWN_SOURCE: &str = "Manifest source info is *unknown*.";
const NEW_ENTRY: &str =
    "* This manifest item was not in the prior manifest, so all of its commits are new.";
const NO_CHANGES: &str = "* There were no pull requests merged in this range of commits.";
const ROLLED_BACK: &str = "These commits were *rolled back*:";

/// What happened to one entry between the two manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Changes {
    /// The entry did not exist in the older manifest.
    NewEntry,
    /// Pull requests merged after the old commit, oldest first.
    Forward(Vec<Commit>),
    /// Pull requests between the new commit and the old one, which the
    /// newer manifest no longer includes.
    Rollback(Vec<Commit>),
    NoChanges,
}

/// The changelog section for one entry of the newer manifest.
#[derive(Debug, Clone)]
pub struct ItemDiff {
    pub directory: String,
    /// Repository name used in pull request links.
    pub display_name: String,
    pub from_sha: Option<String>,
    pub to_sha: String,
    pub changes: Changes,
}

impl ItemDiff {
    fn new(from: Option<&ManifestItem>, to: &ManifestItem) -> Result<Self> {
        let Some(from) = from else {
            return Ok(Self {
                directory: to.directory().to_string(),
                display_name: to.repository().display_name(),
                from_sha: None,
                to_sha: to.commit().to_string(),
                changes: Changes::NewEntry,
            });
        };

        let repository = from.repository();
        let forward = repository.commits_between(from.commit(), to.commit(), true)?;
        let changes = if !forward.is_empty() {
            Changes::Forward(forward)
        } else {
            let backward = repository.commits_between(to.commit(), from.commit(), true)?;
            if backward.is_empty() {
                Changes::NoChanges
            } else {
                debug!("{} moved back from {}", from.directory(), from.commit());
                Changes::Rollback(backward)
            }
        };

        Ok(Self {
            directory: to.directory().to_string(),
            display_name: repository.display_name(),
            from_sha: Some(from.commit().to_string()),
            to_sha: to.commit().to_string(),
            changes,
        })
    }

    pub fn is_rollback(&self) -> bool {
        matches!(self.changes, Changes::Rollback(_))
    }

    fn heading(&self) -> String {
        match &self.from_sha {
            Some(from) => format!(
                "## {} ({} to {})",
                self.directory,
                abbreviate_sha(from),
                abbreviate_sha(&self.to_sha)
            ),
            None => format!("## {} (new manifest entry)", self.directory),
        }
    }

    fn commit_line(&self, commit: &Commit) -> String {
        let summary = commit.summarized_message();
        match commit.pr_number() {
            Some(number) if commit.is_pr() => format!(
                "1. [{}](https://github.com/{}/pull/{})",
                summary, self.display_name, number
            ),
            _ => format!("1. {}", summary),
        }
    }

    fn commit_list(&self, commits: &[Commit]) -> String {
        commits
            .iter()
            .map(|commit| self.commit_line(commit))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_markdown(&self) -> String {
        let body = match &self.changes {
            Changes::NewEntry => NEW_ENTRY.to_string(),
            Changes::NoChanges => NO_CHANGES.to_string(),
            Changes::Forward(commits) => self.commit_list(commits),
            Changes::Rollback(commits) => {
                format!("{}\n\n{}", ROLLED_BACK, self.commit_list(commits))
            }
        };
        format!("{}\n\n{}\n", self.heading(), body)
    }
}

/// Changelog between two manifests.
#[derive(Debug, Clone)]
pub struct ManifestDiff {
    source_info: Option<String>,
    items: Vec<ItemDiff>,
}

impl ManifestDiff {
    /// Compare `from` (older) with `to` (newer). Sections follow the order
    /// of `to`; entries only present in `from` are not reported.
    pub fn new(from: &Manifest, to: &Manifest) -> Result<Self> {
        let items = to
            .items()
            .iter()
            .map(|to_item| {
                let from_item = from
                    .items()
                    .iter()
                    .find(|item| item.directory() == to_item.directory());
                ItemDiff::new(from_item, to_item)
            })
            .collect::<Result<Vec<_>>>()?;

        let source_info = match (from.source(), to.source()) {
            (Some(from_source), Some(to_source)) => Some(format!(
                "Comparing manifest *{}* on repository *{}* from commit {} to {}.",
                from_source.file,
                from_source.repository.display_name(),
                abbreviate_sha(&from_source.sha),
                abbreviate_sha(&to_source.sha)
            )),
            _ => None,
        };

        Ok(Self { source_info, items })
    }

    pub fn items(&self) -> &[ItemDiff] {
        &self.items
    }

    pub fn to_markdown(&self) -> String {
        let sections = self
            .items
            .iter()
            .map(ItemDiff::to_markdown)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\n{}\n\n{}",
            TITLE,
            self.source_info.as_deref().unwrap_or(UNKNOWN_SOURCE),
            sections
        )
    }
}
