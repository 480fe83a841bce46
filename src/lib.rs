//! # Manifestly
//!
//! A manifest is a plain-text, ordered list of `(repository, commit)` pairs
//! describing what is deployed across many repositories at once. This
//! library reads and writes manifests, stores them in a git repository of
//! their own, tags them, and turns the difference between two of them into
//! a changelog of merged pull requests. It is used by the `manifestly`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use manifestly::entry::ManifestEntry;
//! use manifestly::unified_diff::Diff;
//!
//! let entry = ManifestEntry::parse("org/api-server (api) @ 1a2b3c4d5e").unwrap();
//! assert_eq!(entry.directory, "api");
//! assert_eq!(entry.to_string(), "[api] org/api-server@1a2b3c4d5e");
//!
//! let diff = Diff::parse(
//!     "diff --git a/prod.manifest b/prod.manifest\n\
//!      --- a/prod.manifest\n\
//!      +++ b/prod.manifest\n\
//!      @@ -1 +1 @@\n\
//!      -[api]@1111111111\n\
//!      +[api]@2222222222\n",
//! )
//! .unwrap();
//! assert!(diff.has_surviving_file("prod.manifest"));
//! assert_eq!(diff[0].to_content, "[api]@2222222222");
//! ```
//!
//! ## Core Concepts
//!
//! - **Entries (`entry`)**: the line codec. Five historical line syntaxes
//!   are accepted; one is written.
//! - **Manifests (`manifest`)**: entries bound to live repositories, with
//!   sorted, atomic serialization.
//! - **Scoped tags (`tag`)**: file-scoped, time-ordered, repeatable labels
//!   encoded into ordinary git tag names.
//! - **Changelogs (`changelog`)**: per-entry pull request history between
//!   two manifests, including rollbacks.
//! - **Diffs (`unified_diff`)**: extraction of one file's before and after
//!   content from `git diff` / `git show` output.
//! - **Repositories (`repository`, `git`)**: the [`repository::Repository`]
//!   trait and its implementation on top of the `git` command.

pub mod changelog;
pub mod commit;
pub mod defaults;
pub mod entry;
pub mod error;
pub mod git;
pub mod manifest;
pub mod repository;
pub mod suggestions;
pub mod tag;
pub mod unified_diff;
pub mod view;

#[cfg(test)]
mod entry_proptest;
#[cfg(test)]
pub(crate) mod testing;
