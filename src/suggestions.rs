//! # Error Suggestions
//!
//! Command-level errors that tell the user what went wrong and how to fix
//! it. Library errors that have an obvious remedy are turned into these by
//! [`explain`]; everything else passes through unchanged.
//!
//! ```rust,ignore
//! let manifest = Manifest::read_file(&path, &repositories)
//!     .map_err(|e| suggestions::explain(e, &repositories))?;
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::error::Error;
use crate::repository::Repository;

/// Replace library errors that have a known remedy with hinted errors.
pub fn explain(error: Error, repositories: &[Arc<dyn Repository>]) -> anyhow::Error {
    match error {
        Error::RepositoryNotFound {
            directory,
            identity,
        } => {
            let labels: Vec<String> = repositories
                .iter()
                .map(|repository| repository.directory_label())
                .collect();
            repository_not_found(&directory, identity.as_deref(), &labels)
        }
        Error::DuplicateRepository { directory, paths } => duplicate_repository(&directory, &paths),
        Error::FileNotInCommit { file, sha } => file_not_in_commit(&file, &sha),
        other => other.into(),
    }
}

/// A manifest entry whose working directory is not under any search path.
pub fn repository_not_found(
    directory: &str,
    identity: Option<&str>,
    known: &[String],
) -> anyhow::Error {
    let described = match identity {
        Some(identity) => format!("{directory} ({identity})"),
        None => directory.to_string(),
    };
    let candidates: Vec<&str> = known.iter().map(String::as_str).collect();
    let did_you_mean = find_similar(directory, &candidates)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Repository not found: {described}{did_you_mean}\n\n\
         hint: Add the directory containing '{directory}' with --search-paths\n\
         hint: Clone the repository next to the others if it is missing"
    )
}

/// Two repositories under the search paths share a directory name.
pub fn duplicate_repository(directory: &str, paths: &[String]) -> anyhow::Error {
    anyhow::anyhow!(
        "More than one repository is named '{directory}':\n  {paths}\n\n\
         hint: Narrow --search-paths so only one of them is found",
        paths = paths.join("\n  ")
    )
}

/// A commit needed by `apply` is not in the local clone.
pub fn update_required(directory: &str, reference: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Commit {reference} not found in '{directory}'\n\n\
         hint: Try running again with the `--update` option."
    )
}

/// The manifest file given on the command line does not exist.
pub fn manifest_file_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest file not found: {path}\n\n\
         hint: Check the path passed to --file\n\
         hint: Create one with 'manifestly create'",
        path = path.display()
    )
}

/// A tag was requested for a file the commit does not touch.
pub fn file_not_in_commit(file: &str, sha: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "File '{file}' is not changed by commit {sha}\n\n\
         hint: Leave out --file to tag every file the commit changes\n\
         hint: Use 'manifestly find' to look up the commit that last changed it"
    )
}

/// `diff --repo` could not work out which manifest file to compare.
pub fn ambiguous_manifest_file(changed: &[&str]) -> anyhow::Error {
    let found = if changed.is_empty() {
        "no manifest files changed".to_string()
    } else {
        format!("{} files changed: {}", changed.len(), changed.join(", "))
    };
    anyhow::anyhow!(
        "Cannot tell which manifest to compare ({found})\n\n\
         hint: Name the manifest with --repo-file"
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance, single-row variant.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b_chars.len()]
}
