//! # Error Handling
//!
//! This module defines the centralized error type for `manifestly`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! anticipated failure, with enough context (the offending line, label,
//! commit or tag) for a caller to act on it.
//!
//! ## Error Families
//!
//! - **Format errors**: a manifest line, diff segment or tag payload that
//!   does not have the expected shape. These are always fatal to the
//!   operation that hit them.
//! - **Resolution errors**: a manifest entry that matches no repository, or
//!   a working-directory label shared by several repositories. They are
//!   separate variants so the CLI can phrase different advice.
//! - **State errors**: a missing commit, an upload with no content change,
//!   or a file that a commit never touched.
//! - **Collaborator errors**: failures of the `git` executable, I/O and the
//!   helper libraries, which are propagated untouched.
//!
//! The `Result` alias is used by every library function.

use thiserror::Error;

/// Main error type for manifestly operations
#[derive(Error, Debug)]
pub enum Error {
    /// A manifest line matched none of the accepted syntaxes.
    #[error("Malformed manifest line: '{line}'")]
    ManifestLine { line: String },

    /// A segment of unified diff text could not be interpreted.
    #[error("Malformed diff segment: {message}")]
    DiffFormat { message: String },

    /// A scoped tag's annotation did not contain the commit it points at.
    #[error("Tag payload malformed: no commit hash found in annotation of '{tag}'")]
    TagPayload { tag: String },

    /// A tag value that cannot be encoded into a scoped tag name.
    #[error("Invalid tag value '{value}': {message}")]
    InvalidTagValue { value: String, message: String },

    /// No repository in the search paths has the entry's working directory.
    #[error("Repository not found for manifest entry '{directory}'{}", identity.as_ref().map(|i| format!(" ({})", i)).unwrap_or_default())]
    RepositoryNotFound {
        directory: String,
        /// Repository identity from the manifest line, if it carried one
        identity: Option<String>,
    },

    /// Several repositories in the search paths share a working directory.
    #[error("Duplicate repository name '{directory}' found at: {}", paths.join(", "))]
    DuplicateRepository {
        directory: String,
        paths: Vec<String>,
    },

    /// The same repository appears twice in one manifest.
    #[error("Repository '{directory}' is already in the manifest")]
    DuplicateEntry { directory: String },

    /// A commit reference that does not exist in a repository.
    #[error("Commit not found: {reference} in {repository}")]
    CommitNotFound {
        reference: String,
        repository: String,
    },

    /// An upload whose content is identical to what is already committed.
    #[error("No content change to commit for '{file}'")]
    NoContentChange { file: String },

    /// A commit that does not touch the file a tag was scoped to.
    #[error("File '{file}' is not changed by commit {sha}")]
    FileNotInCommit { file: String, sha: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {dir}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A timestamp could not be formatted into a tag name.
    #[error("Timestamp formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),

    /// A tag timestamp could not be parsed back.
    #[error("Timestamp parsing error: {0}")]
    TimeParse(#[from] time::error::Parse),

    /// The operating system random source failed.
    #[error("Random token generation failed: {message}")]
    Random { message: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
