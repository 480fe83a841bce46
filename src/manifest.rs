//! # Manifest Documents
//!
//! A [`Manifest`] is an ordered list of [`ManifestItem`]s, each one a
//! decoded [`ManifestEntry`] bound to the live [`Repository`] it describes.
//! Repositories are bound when the manifest is loaded, so a manifest that
//! names a repository which cannot be found never exists in memory.
//!
//! Manifests loaded from a commit of a manifest repository also remember
//! where they came from ([`ManifestSource`]); the changelog uses this to
//! describe what is being compared.
//!
//! ## File Format
//!
//! One entry per line, in any syntax accepted by [`crate::entry`]. Blank
//! lines and `#` comments are ignored. Files are always written in the
//! current syntax, sorted by working directory, so the output does not
//! depend on the order in which repositories were added.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::entry::{split_comment, LineCodec, ManifestEntry};
use crate::error::{Error, Result};
use crate::repository::Repository;

/// One manifest entry bound to its repository.
#[derive(Clone)]
pub struct ManifestItem {
    pub entry: ManifestEntry,
    repository: Arc<dyn Repository>,
}

impl ManifestItem {
    /// An entry for `repository` at its current commit, carrying the tags
    /// that point at that commit.
    pub fn new(repository: Arc<dyn Repository>) -> Result<Self> {
        let commit = repository.current_commit()?;
        let tags = repository.tags_at(&commit)?;
        let entry = ManifestEntry::new(repository.identity(), repository.directory_label(), commit)
            .with_tags(tags);
        Ok(Self { entry, repository })
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    pub fn directory(&self) -> &str {
        &self.entry.directory
    }

    pub fn commit(&self) -> &str {
        &self.entry.commit
    }

    /// Point this entry at another commit, which must exist.
    pub fn set_commit(&mut self, reference: &str) -> Result<()> {
        let commit = self.repository.find_commit(reference)?;
        self.entry.tags = self.repository.tags_at(&commit.sha)?;
        self.entry.commit = commit.sha;
        Ok(())
    }

    fn is_bound_to(&self, repository: &dyn Repository) -> bool {
        self.repository.path() == repository.path()
    }
}

impl std::fmt::Debug for ManifestItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestItem")
            .field("entry", &self.entry)
            .field("repository", &self.repository.path())
            .finish()
    }
}

/// Where a manifest loaded from a manifest repository came from.
#[derive(Clone)]
pub struct ManifestSource {
    pub repository: Arc<dyn Repository>,
    pub file: String,
    pub sha: String,
}

/// An ordered collection of manifest entries.
#[derive(Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    source: Option<ManifestSource>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of `text` that carry an entry: comments removed, trimmed,
    /// blank results dropped.
    pub fn significant_lines(text: &str) -> Vec<&str> {
        text.lines()
            .map(|line| split_comment(line).0)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Parse manifest text and bind every entry to one of `repositories`.
    ///
    /// Any line that fails to decode or resolve fails the whole load.
    pub fn parse(text: &str, repositories: &[Arc<dyn Repository>]) -> Result<Self> {
        let codec = LineCodec::new()?;
        let mut manifest = Self::new();

        for line in text.lines() {
            if split_comment(line).0.is_empty() {
                continue;
            }

            let entry = codec.decode(line)?;
            let repository = entry.resolve(repositories)?;
            if manifest.includes(repository.as_ref()) {
                return Err(Error::DuplicateEntry {
                    directory: entry.directory,
                });
            }

            manifest.items.push(ManifestItem { entry, repository });
        }

        debug!("Loaded manifest with {} entries", manifest.len());
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn read_file(path: &Path, repositories: &[Arc<dyn Repository>]) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, repositories)
    }

    /// Load the manifest stored as `file` at commit `sha` of `source`.
    pub fn from_commit(
        source: Arc<dyn Repository>,
        sha: &str,
        file: &str,
        repositories: &[Arc<dyn Repository>],
    ) -> Result<Self> {
        let commit = source.find_commit(sha)?;
        let text = source.file_at(&commit.sha, file)?;
        let mut manifest = Self::parse(&text, repositories)?;
        manifest.source = Some(ManifestSource {
            repository: source,
            file: file.to_string(),
            sha: commit.sha,
        });
        Ok(manifest)
    }

    pub fn source(&self) -> Option<&ManifestSource> {
        self.source.as_ref()
    }

    pub fn items(&self) -> &[ManifestItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&ManifestItem> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ManifestItem> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `repository` already has an entry.
    pub fn includes(&self, repository: &dyn Repository) -> bool {
        self.items.iter().any(|item| item.is_bound_to(repository))
    }

    /// Add `repository` at its current commit.
    pub fn add_repository(&mut self, repository: Arc<dyn Repository>) -> Result<()> {
        if self.includes(repository.as_ref()) {
            return Err(Error::DuplicateEntry {
                directory: repository.directory_label(),
            });
        }
        self.items.push(ManifestItem::new(repository)?);
        Ok(())
    }

    /// Remove the entry for `repository`; returns whether one was removed.
    pub fn remove_repository(&mut self, repository: &dyn Repository) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.is_bound_to(repository));
        self.items.len() != before
    }

    /// Remove entries by position. Out-of-range indices are ignored.
    pub fn remove_by_indices(&mut self, indices: &[usize]) {
        let mut index = 0;
        self.items.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
    }

    /// Shorten every commit reference to at most `length` characters.
    pub fn abbreviate_commits(&mut self, length: usize) {
        for item in &mut self.items {
            item.entry.abbreviate(length);
        }
    }

    /// The file form: one line per entry, sorted by working directory.
    pub fn to_file_string(&self) -> String {
        let mut lines: Vec<(&str, String)> = self
            .items
            .iter()
            .map(|item| (item.directory(), item.entry.to_string()))
            .collect();
        lines.sort();

        lines
            .into_iter()
            .map(|(_, line)| format!("{}\n", line))
            .collect()
    }

    /// Write the manifest to `path`, replacing it in one step.
    pub fn write(&self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "manifest".to_string());
        let staging = path.with_file_name(format!(".{}.tmp", name));

        fs::write(&staging, self.to_file_string())?;
        fs::rename(&staging, path)?;
        debug!("Wrote {} entries to {}", self.len(), path.display());
        Ok(())
    }
}

impl std::ops::Index<usize> for Manifest {
    type Output = ManifestItem;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}
