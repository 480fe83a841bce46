//! # Unified Diff Parsing
//!
//! Extracts per-file before/after content and names from the raw unified
//! diff text that `git diff` and `git show` print. Only the information
//! needed to reconstruct a small text file (such as a manifest) is kept;
//! hunk positions are ignored and no patch is ever applied.
//!
//! The parser is built on [`classify`], a single line-classification
//! function, so that the rules for each kind of line can be tested on
//! their own.

use crate::error::{Error, Result};

/// Delimiter that starts every per-file section of git diff output.
pub const FILE_DELIMITER: &str = "diff --git ";

/// Name git prints in place of a file that does not exist on one side.
pub const NULL_DEVICE: &str = "/dev/null";

/// The role of one line inside a per-file diff section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `@@ -a,b +c,d @@`
    HunkHeader,
    /// `--- a/name`
    OldFile,
    /// `+++ b/name`
    NewFile,
    /// `+line`
    Added,
    /// `-line`
    Removed,
    /// ` line`, or an empty line inside a hunk
    Context,
    /// `\ No newline at end of file`
    NoNewline,
    /// Anything else (extended headers such as `index` or `new file mode`)
    Other,
}

/// Classify a single line of diff text.
///
/// File markers take precedence over added/removed lines, so this is only
/// reliable for header lines and for lines after the first hunk header;
/// [`FileDiff::parse`] never asks about header lines inside a hunk.
pub fn classify(line: &str) -> LineKind {
    if line.starts_with("@@ ") {
        LineKind::HunkHeader
    } else if line.starts_with("--- ") {
        LineKind::OldFile
    } else if line.starts_with("+++ ") {
        LineKind::NewFile
    } else {
        classify_content(line)
    }
}

/// Classify a line known to be inside a hunk.
fn classify_content(line: &str) -> LineKind {
    match line.chars().next() {
        Some('+') => LineKind::Added,
        Some('-') => LineKind::Removed,
        Some(' ') | None => LineKind::Context,
        Some('\\') => LineKind::NoNewline,
        Some('@') if line.starts_with("@@ ") => LineKind::HunkHeader,
        _ => LineKind::Other,
    }
}

/// One file's change within a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Name before the change; `None` when the file was added.
    pub from_name: Option<String>,
    /// Name after the change; `None` when the file was deleted.
    pub to_name: Option<String>,
    /// Content reconstructed from removed and context lines.
    pub from_content: String,
    /// Content reconstructed from added and context lines.
    pub to_content: String,
}

impl FileDiff {
    /// Parse one per-file section, with the leading `diff --git ` already
    /// removed.
    pub fn parse(segment: &str) -> Result<Self> {
        let lines: Vec<&str> = segment.lines().collect();
        let hunk_start = lines
            .iter()
            .position(|line| classify(line) == LineKind::HunkHeader);

        let (from_name, to_name, from_content, to_content) = match hunk_start {
            None => {
                let (from, to) = names_from_first_line(&lines, segment)?;
                (from, to, String::new(), String::new())
            }
            Some(index) => {
                let header = &lines[..index];
                let content = &lines[index + 1..];
                let from = marker_name(header, LineKind::OldFile, "a/");
                let to = marker_name(header, LineKind::NewFile, "b/");
                let (from_content, to_content) = reconstruct(content);
                (from, to, from_content, to_content)
            }
        };

        if from_name.is_none() && to_name.is_none() {
            return Err(Error::DiffFormat {
                message: format!(
                    "no file name on either side of '{}'",
                    lines.first().copied().unwrap_or_default()
                ),
            });
        }

        Ok(Self {
            from_name,
            to_name,
            from_content,
            to_content,
        })
    }

    /// Whether the file still exists after the change.
    pub fn is_surviving(&self) -> bool {
        self.to_name.is_some()
    }
}

/// Names for a section without hunks (empty files, pure renames, mode
/// changes), taken from the `a/<old> b/<new>` first line.
fn names_from_first_line(
    lines: &[&str],
    segment: &str,
) -> Result<(Option<String>, Option<String>)> {
    let first = lines.first().copied().unwrap_or_default();
    let (old, new) = first.split_once(" b/").ok_or_else(|| Error::DiffFormat {
        message: format!("cannot find file names in '{}'", first),
    })?;

    let mut from = Some(old.get(2..).unwrap_or_default().to_string());
    let mut to = Some(new.to_string());

    if segment.contains("deleted file mode") {
        to = None;
    } else if segment.contains("new file mode") {
        from = None;
    }

    Ok((from, to))
}

/// The name on a `---`/`+++` header line, with the side prefix removed and
/// the null device mapped to `None`.
fn marker_name(header: &[&str], kind: LineKind, side_prefix: &str) -> Option<String> {
    let line = header.iter().find(|line| classify(line) == kind)?;
    let name = line.get(4..).unwrap_or_default().trim_end_matches('\t');
    if name == NULL_DEVICE {
        return None;
    }
    Some(name.strip_prefix(side_prefix).unwrap_or(name).to_string())
}

fn reconstruct(content: &[&str]) -> (String, String) {
    let mut from = Vec::new();
    let mut to = Vec::new();

    for line in content {
        let text = line.get(1..).unwrap_or_default();
        match classify_content(line) {
            LineKind::Context => {
                from.push(text);
                to.push(text);
            }
            LineKind::Removed => from.push(text),
            LineKind::Added => to.push(text),
            _ => {}
        }
    }

    (from.join("\n"), to.join("\n"))
}

/// A parsed multi-file diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    files: Vec<FileDiff>,
}

impl Diff {
    /// Parse raw diff text into per-file records.
    ///
    /// Text before the first `diff --git ` delimiter (a commit header, for
    /// instance) is ignored. Any section that fails to parse fails the
    /// whole call.
    pub fn parse(raw: &str) -> Result<Self> {
        let files = raw
            .split(FILE_DELIMITER)
            .skip(1)
            .filter(|segment| !segment.trim().is_empty())
            .map(FileDiff::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { files })
    }

    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    pub fn get(&self, index: usize) -> Option<&FileDiff> {
        self.files.get(index)
    }

    pub fn files(&self) -> &[FileDiff] {
        &self.files
    }

    /// Whether any record names `filename` on either side, regardless of
    /// whether it was added, renamed or deleted.
    pub fn has_file(&self, filename: &str) -> bool {
        self.files.iter().any(|file| {
            file.from_name.as_deref() == Some(filename) || file.to_name.as_deref() == Some(filename)
        })
    }

    /// Whether `filename` exists after the change.
    pub fn has_surviving_file(&self, filename: &str) -> bool {
        self.files
            .iter()
            .any(|file| file.to_name.as_deref() == Some(filename))
    }

    /// Names of every file that exists after the change, in diff order.
    pub fn surviving_files(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter_map(|file| file.to_name.as_deref())
            .collect()
    }
}

impl std::ops::Index<usize> for Diff {
    type Output = FileDiff;

    fn index(&self, index: usize) -> &Self::Output {
        &self.files[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_FILE_DIFF: &str = "diff --git a/foo b/foo
new file mode 100644
index 0000000..0f7aa75
--- /dev/null
+++ b/foo
@@ -0,0 +1,2 @@
+org/repo1 @ sha1
+org/repo2 @ sha2
";

    const DELETED_FILE_DIFF: &str = "diff --git a/foo b/foo
deleted file mode 100644
index 0f7aa75..0000000
--- a/foo
+++ /dev/null
@@ -1,2 +0,0 @@
-org/repo1 @ sha1
-org/repo2 @ sha2
";

    #[test]
    fn test_parse_new_file_diff() {
        let diff = Diff::parse(NEW_FILE_DIFF).unwrap();

        assert_eq!(diff.num_files(), 1);
        assert!(diff.has_surviving_file("foo"));
        assert_eq!(diff[0].from_name, None);
        assert_eq!(diff[0].to_name.as_deref(), Some("foo"));
        assert_eq!(diff[0].from_content, "");
        assert_eq!(diff[0].to_content, "org/repo1 @ sha1\norg/repo2 @ sha2");
    }

    #[test]
    fn test_parse_deleted_file_diff() {
        let diff = Diff::parse(DELETED_FILE_DIFF).unwrap();

        assert_eq!(diff.num_files(), 1);
        assert!(!diff.has_surviving_file("foo"));
        assert!(diff.has_file("foo"));
        assert_eq!(diff[0].from_name.as_deref(), Some("foo"));
        assert_eq!(diff[0].to_name, None);
        assert_eq!(diff[0].from_content, "org/repo1 @ sha1\norg/repo2 @ sha2");
        assert_eq!(diff[0].to_content, "");
    }

    #[test]
    fn test_parse_modified_file_with_context() {
        let raw = "diff --git a/deploy.manifest b/deploy.manifest
index 1111111..2222222 100644
--- a/deploy.manifest
+++ b/deploy.manifest
@@ -1,3 +1,3 @@
 [api] org/api@aaaa
-[web] org/web@bbbb
+[web] org/web@cccc
 [worker]@dddd
";
        let diff = Diff::parse(raw).unwrap();
        let file = &diff[0];

        assert_eq!(file.from_name.as_deref(), Some("deploy.manifest"));
        assert_eq!(file.to_name.as_deref(), Some("deploy.manifest"));
        assert_eq!(
            file.from_content,
            "[api] org/api@aaaa\n[web] org/web@bbbb\n[worker]@dddd"
        );
        assert_eq!(
            file.to_content,
            "[api] org/api@aaaa\n[web] org/web@cccc\n[worker]@dddd"
        );
    }

    #[test]
    fn test_parse_empty_new_file_without_hunk() {
        let raw = "diff --git a/foo.manifest b/foo.manifest
new file mode 100644
index 0000000..e69de29
";
        let diff = Diff::parse(raw).unwrap();

        assert_eq!(diff[0].from_name, None);
        assert_eq!(diff[0].to_name.as_deref(), Some("foo.manifest"));
        assert_eq!(diff[0].to_content, "");
    }

    #[test]
    fn test_parse_empty_deleted_file_without_hunk() {
        let raw = "diff --git a/foo.manifest b/foo.manifest
deleted file mode 100644
index e69de29..0000000
";
        let diff = Diff::parse(raw).unwrap();

        assert_eq!(diff[0].from_name.as_deref(), Some("foo.manifest"));
        assert_eq!(diff[0].to_name, None);
        assert!(!diff.has_surviving_file("foo.manifest"));
    }

    #[test]
    fn test_parse_pure_rename() {
        let raw = "diff --git a/old.manifest b/new.manifest
similarity index 100%
rename from old.manifest
rename to new.manifest
";
        let diff = Diff::parse(raw).unwrap();

        assert_eq!(diff[0].from_name.as_deref(), Some("old.manifest"));
        assert_eq!(diff[0].to_name.as_deref(), Some("new.manifest"));
        assert!(diff.has_file("old.manifest"));
        assert!(diff.has_file("new.manifest"));
        assert!(!diff.has_surviving_file("old.manifest"));
    }

    #[test]
    fn test_parse_multiple_files_with_preamble() {
        let raw = format!(
            "commit 0123456789abcdef\nAuthor: someone\n\n    message\n\n{}{}",
            NEW_FILE_DIFF, DELETED_FILE_DIFF
        );
        let diff = Diff::parse(&raw).unwrap();

        assert_eq!(diff.num_files(), 2);
        assert_eq!(diff.surviving_files(), vec!["foo"]);
        assert!(diff.get(2).is_none());
    }

    #[test]
    fn test_parse_ignores_no_newline_marker_and_extra_hunks() {
        let raw = "diff --git a/foo b/foo
index 1111111..2222222 100644
--- a/foo
+++ b/foo
@@ -1 +1 @@
-one
\\ No newline at end of file
+two
@@ -10 +10 @@
 ten
";
        let diff = Diff::parse(raw).unwrap();

        assert_eq!(diff[0].from_content, "one\nten");
        assert_eq!(diff[0].to_content, "two\nten");
    }

    #[test]
    fn test_parse_empty_input() {
        let diff = Diff::parse("").unwrap();
        assert_eq!(diff.num_files(), 0);
        assert!(!diff.has_file("foo"));
    }

    #[test]
    fn test_parse_rejects_segment_without_names() {
        let result = Diff::parse("diff --git garbage\n");
        assert!(matches!(result, Err(Error::DiffFormat { .. })));
    }

    #[test]
    fn test_parse_rejects_null_on_both_sides() {
        let raw = "diff --git a/foo b/foo
--- /dev/null
+++ /dev/null
@@ -0,0 +0,0 @@
";
        let result = Diff::parse(raw);
        assert!(matches!(result, Err(Error::DiffFormat { .. })));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("@@ -1,2 +1,2 @@"), LineKind::HunkHeader);
        assert_eq!(classify("--- a/foo"), LineKind::OldFile);
        assert_eq!(classify("+++ b/foo"), LineKind::NewFile);
        assert_eq!(classify("+added"), LineKind::Added);
        assert_eq!(classify("-removed"), LineKind::Removed);
        assert_eq!(classify(" context"), LineKind::Context);
        assert_eq!(classify(""), LineKind::Context);
        assert_eq!(classify("\\ No newline at end of file"), LineKind::NoNewline);
        assert_eq!(classify("index 123..456"), LineKind::Other);
    }
}
