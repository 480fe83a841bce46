//! # Manifest Line Codec
//!
//! Reads and writes the text form of a single manifest entry. Five
//! syntaxes have been used for manifest lines over time and all of them
//! are still accepted when reading:
//!
//! | Syntax                      | Example                        |
//! |-----------------------------|--------------------------------|
//! | `[dir] org/repo @ sha`      | `[api] org/api-server@1a2b3c`  |
//! | `[dir] @ sha`               | `[api]@1a2b3c`                 |
//! | `org/repo (dir) @ sha`      | `org/api-server (api) @ 1a2b3c`|
//! | `org/repo @ sha`            | `org/api @ 1a2b3c`             |
//! | `dir @ sha`                 | `api @ 1a2b3c`                 |
//!
//! The syntaxes are tried in that order and the first match wins. The last
//! two only differ by the `/` in the repository identity, which is why the
//! order matters. Writing always produces the first form.
//!
//! A trailing `# ...` comment holds the entry's informational tags,
//! separated by commas.

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::repository::Repository;

/// One line of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// `org/name` identity of the repository, when the line carries one.
    pub repository: Option<String>,
    /// Working-directory label; the key used to match repositories.
    pub directory: String,
    /// Full or abbreviated commit SHA.
    pub commit: String,
    /// Informational labels from the trailing comment.
    pub tags: Vec<String>,
}

impl ManifestEntry {
    pub fn new(repository: Option<String>, directory: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            repository,
            directory: directory.into(),
            commit: commit.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Decode a single line with a freshly built [`LineCodec`].
    pub fn parse(line: &str) -> Result<Self> {
        LineCodec::new()?.decode(line)
    }

    /// The `[dir] org/repo` part of the line, without the commit.
    pub fn label(&self) -> String {
        match &self.repository {
            Some(repository) => format!("[{}] {}", self.directory, repository),
            None => format!("[{}]", self.directory),
        }
    }

    /// Shorten the commit reference to at most `length` characters.
    pub fn abbreviate(&mut self, length: usize) {
        if let Some((index, _)) = self.commit.char_indices().nth(length) {
            self.commit.truncate(index);
        }
    }

    /// Find the one repository whose directory label matches this entry.
    ///
    /// The repository identity on the line is only used for the error
    /// message; matching is by working directory alone.
    pub fn resolve(&self, repositories: &[Arc<dyn Repository>]) -> Result<Arc<dyn Repository>> {
        let matches: Vec<&Arc<dyn Repository>> = repositories
            .iter()
            .filter(|repository| repository.directory_label() == self.directory)
            .collect();

        match matches.as_slice() {
            [] => Err(Error::RepositoryNotFound {
                directory: self.directory.clone(),
                identity: self.repository.clone(),
            }),
            [repository] => Ok(Arc::clone(repository)),
            _ => Err(Error::DuplicateRepository {
                directory: self.directory.clone(),
                paths: matches
                    .iter()
                    .map(|repository| repository.path().display().to_string())
                    .collect(),
            }),
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.label(), self.commit)?;
        if !self.tags.is_empty() {
            write!(f, " # {}", self.tags.join(","))?;
        }
        Ok(())
    }
}

/// Split a line into its content and the text of its trailing comment.
///
/// The comment starts at the first `#` not preceded by a backslash. Both
/// halves are trimmed.
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut previous = None;
    for (index, c) in line.char_indices() {
        if c == '#' && previous != Some('\\') {
            return (line[..index].trim(), Some(line[index + 1..].trim()));
        }
        previous = Some(c);
    }
    (line.trim(), None)
}

fn parse_tags(comment: Option<&str>) -> Vec<String> {
    comment
        .map(|text| {
            text.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

type Build = fn(&Captures) -> (Option<String>, String, String);

/// One accepted line syntax.
struct LinePattern {
    regex: Regex,
    build: Build,
}

fn capture(captures: &Captures, name: &str) -> String {
    captures
        .name(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn with_identity(captures: &Captures) -> (Option<String>, String, String) {
    (
        Some(capture(captures, "repo")),
        capture(captures, "dir"),
        capture(captures, "sha"),
    )
}

fn without_identity(captures: &Captures) -> (Option<String>, String, String) {
    (None, capture(captures, "dir"), capture(captures, "sha"))
}

fn implicit_directory(captures: &Captures) -> (Option<String>, String, String) {
    let repo = capture(captures, "repo");
    let dir = repo.rsplit('/').next().unwrap_or_default().to_string();
    (Some(repo), dir, capture(captures, "sha"))
}

/// Ordered set of line syntaxes, compiled once and reused for every line
/// of a manifest.
pub struct LineCodec {
    patterns: Vec<LinePattern>,
}

impl LineCodec {
    pub fn new() -> Result<Self> {
        let specs: [(&str, Build); 5] = [
            (
                r"^\[\s*(?P<dir>[^\]]*?)\s*\]\s*(?P<repo>[^\s@\[\]()/]+/[^\s@\[\]()]+)\s*@\s*(?P<sha>\S+)$",
                with_identity,
            ),
            (
                r"^\[\s*(?P<dir>[^\]]*?)\s*\]\s*@\s*(?P<sha>\S+)$",
                without_identity,
            ),
            (
                r"^(?P<repo>[^\s@()/]+/[^\s@()]+)\s*\(\s*(?P<dir>[^)]*?)\s*\)\s*@\s*(?P<sha>\S+)$",
                with_identity,
            ),
            (
                r"^(?P<repo>[^\s@()/]+/[^\s@()]+)\s*@\s*(?P<sha>\S+)$",
                implicit_directory,
            ),
            (
                r"^(?P<dir>[^\s@/\[\]()]+)\s*@\s*(?P<sha>\S+)$",
                without_identity,
            ),
        ];

        let patterns = specs
            .into_iter()
            .map(|(pattern, build)| {
                Ok(LinePattern {
                    regex: Regex::new(pattern)?,
                    build,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Decode one manifest line. Lines matching no syntax, or yielding an
    /// empty directory or commit, are rejected.
    pub fn decode(&self, line: &str) -> Result<ManifestEntry> {
        let (content, comment) = split_comment(line);

        let (repository, directory, commit) = self
            .patterns
            .iter()
            .find_map(|pattern| pattern.regex.captures(content).map(|c| (pattern.build)(&c)))
            .ok_or_else(|| Error::ManifestLine {
                line: line.to_string(),
            })?;

        if directory.is_empty() || commit.is_empty() {
            return Err(Error::ManifestLine {
                line: line.to_string(),
            });
        }

        Ok(ManifestEntry {
            repository,
            directory,
            commit,
            tags: parse_tags(comment),
        })
    }

    /// Encode an entry in the current syntax.
    pub fn encode(&self, entry: &ManifestEntry) -> String {
        entry.to_string()
    }
}
