//! Commit records and the one-line summaries used in changelogs and
//! commit listings.

use regex::Regex;

/// Message prefix git hosting services use when merging a pull request.
pub const PULL_REQUEST_PREFIX: &str = "Merge pull request";

/// Longest summary produced by [`Commit::summarized_message`].
pub const SUMMARY_LENGTH: usize = 80;

/// A single commit as reported by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub author: String,
    /// Author date as printed by git (ISO 8601).
    pub date: String,
    pub message: String,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            author: String::new(),
            date: String::new(),
            message: message.into(),
        }
    }

    /// Whether this commit merged a pull request.
    pub fn is_pr(&self) -> bool {
        self.message.starts_with(PULL_REQUEST_PREFIX)
    }

    /// The pull request number, e.g. `12` for `Merge pull request #12 from ...`.
    pub fn pr_number(&self) -> Option<u64> {
        let rest = self.message.strip_prefix(PULL_REQUEST_PREFIX)?;
        let digits: String = rest
            .trim_start()
            .strip_prefix('#')?
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }

    /// First ten characters of the SHA.
    pub fn short_sha(&self) -> &str {
        abbreviate_sha(&self.sha)
    }

    /// The message on one line, at most [`SUMMARY_LENGTH`] characters.
    ///
    /// `Merge pull request #12 from org/branch` becomes `PR #12`.
    pub fn summarized_message(&self) -> String {
        let compressed = match pull_request_regex() {
            Some(regex) => regex.replace(&self.message, "PR $number").into_owned(),
            None => self.message.clone(),
        };
        let flattened = compressed.split_whitespace().collect::<Vec<_>>().join(" ");
        flattened.chars().take(SUMMARY_LENGTH).collect()
    }
}

fn pull_request_regex() -> Option<Regex> {
    Regex::new(r"Merge pull request (?P<number>#\w+)( from [\w-]+/[\w-]+)").ok()
}

/// First ten characters of a SHA, or the whole string if shorter.
pub fn abbreviate_sha(sha: &str) -> &str {
    match sha.char_indices().nth(10) {
        Some((index, _)) => &sha[..index],
        None => sha,
    }
}
