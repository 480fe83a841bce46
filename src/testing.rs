//! In-memory [`Repository`] used by unit tests.
//!
//! History is linear: commits are kept oldest first and a commit range
//! `a..b` is the slice strictly after `a` up to and including `b`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::repository::Repository;

#[derive(Debug, Clone)]
pub struct FakeTag {
    pub name: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct FakeRepository {
    path: PathBuf,
    identity: Option<String>,
    commits: Vec<Commit>,
    head: Mutex<Option<String>>,
    show: HashMap<String, String>,
    files: HashMap<(String, String), String>,
    tags: Mutex<Vec<FakeTag>>,
    pushed: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            ..Self::default()
        }
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = Some(identity.to_string());
        self
    }

    /// Append a commit; the newest commit becomes `HEAD`.
    pub fn with_commit(mut self, sha: &str, message: &str) -> Self {
        self.commits.push(Commit::new(sha, message));
        *self.head.get_mut().unwrap() = Some(sha.to_string());
        self
    }

    pub fn with_show(mut self, sha: &str, diff: &str) -> Self {
        self.show.insert(sha.to_string(), diff.to_string());
        self
    }

    pub fn with_file(mut self, sha: &str, file: &str, contents: &str) -> Self {
        self.files
            .insert((sha.to_string(), file.to_string()), contents.to_string());
        self
    }

    /// Add a tag whose annotation body is exactly `annotation`.
    pub fn with_raw_tag(self, name: &str, annotation: &str) -> Self {
        self.tags.lock().unwrap().push(FakeTag {
            name: name.to_string(),
            target: String::new(),
            message: annotation.to_string(),
        });
        self
    }

    pub fn into_handle(self) -> Arc<dyn Repository> {
        Arc::new(self)
    }

    pub fn created_tags(&self) -> Vec<FakeTag> {
        self.tags.lock().unwrap().clone()
    }

    pub fn pushed_tags(&self) -> Vec<String> {
        self.pushed.lock().unwrap().clone()
    }

    fn position(&self, reference: &str) -> Option<usize> {
        if reference.is_empty() {
            return None;
        }
        self.commits
            .iter()
            .position(|commit| commit.sha.starts_with(reference))
    }

    fn missing(&self, reference: &str) -> Error {
        Error::CommitNotFound {
            reference: reference.to_string(),
            repository: self.display_name(),
        }
    }
}

impl Repository for FakeRepository {
    fn path(&self) -> &Path {
        &self.path
    }

    fn identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn current_commit(&self) -> Result<String> {
        self.head
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| self.missing("HEAD"))
    }

    fn find_commit(&self, reference: &str) -> Result<Commit> {
        self.position(reference)
            .map(|index| self.commits[index].clone())
            .ok_or_else(|| self.missing(reference))
    }

    fn tags_at(&self, reference: &str) -> Result<Vec<String>> {
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|tag| tag.target == reference)
            .map(|tag| tag.name.clone())
            .collect())
    }

    fn diff_text(&self, _from: &str, to: &str) -> Result<String> {
        self.show_text(to)
    }

    fn show_text(&self, reference: &str) -> Result<String> {
        Ok(self.show.get(reference).cloned().unwrap_or_default())
    }

    fn file_at(&self, reference: &str, file: &str) -> Result<String> {
        self.files
            .get(&(reference.to_string(), file.to_string()))
            .cloned()
            .ok_or_else(|| self.missing(&format!("{}:{}", reference, file)))
    }

    fn commits_between(&self, from: &str, to: &str, merges_only: bool) -> Result<Vec<Commit>> {
        let from = self.position(from).ok_or_else(|| self.missing(from))?;
        let to = self.position(to).ok_or_else(|| self.missing(to))?;
        if from >= to {
            return Ok(Vec::new());
        }
        Ok(self.commits[from + 1..=to]
            .iter()
            .filter(|commit| !merges_only || commit.is_pr())
            .cloned()
            .collect())
    }

    fn recent_commits(&self, limit: usize, merges_only: bool) -> Result<Vec<Commit>> {
        Ok(self
            .commits
            .iter()
            .rev()
            .filter(|commit| !merges_only || commit.is_pr())
            .take(limit)
            .cloned()
            .collect())
    }

    fn tag_names(&self) -> Result<Vec<String>> {
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .map(|tag| tag.name.clone())
            .collect())
    }

    fn tag_annotation(&self, name: &str) -> Result<String> {
        let tags = self.tags.lock().unwrap();
        let tag = tags
            .iter()
            .find(|tag| tag.name == name)
            .ok_or_else(|| self.missing(name))?;
        if tag.target.is_empty() {
            return Ok(tag.message.clone());
        }
        Ok(format!(
            "object {}\ntype commit\ntag {}\ntagger Test <test@example.com> 0 +0000\n\n{}\n",
            tag.target, tag.name, tag.message
        ))
    }

    fn create_annotated_tag(&self, name: &str, target: &str, message: &str) -> Result<()> {
        self.tags.lock().unwrap().push(FakeTag {
            name: name.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        self.pushed.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        let commit = self.find_commit(reference)?;
        *self.head.lock().unwrap() = Some(commit.sha);
        Ok(())
    }

    fn fetch(&self) -> Result<()> {
        Ok(())
    }
}
