//! # Scoped Tags
//!
//! Git has a single flat namespace of tag names, but manifest repositories
//! need tags that are scoped to one manifest file and that can be applied
//! many times (every release to QA, say) without coordination between the
//! people or machines doing the tagging. Each logical tag is therefore
//! stored as a unique git tag whose name encodes everything needed to find
//! it again:
//!
//! ```text
//! 2024-03-01T142233.918273Z/4f2a/deploy.manifest/release-to-qa
//! └──── UTC timestamp ────┘ └tok┘ └──── file ───┘ └── value ──┘
//! ```
//!
//! The timestamp is fixed width, so sorting names as strings sorts them in
//! time order. The four hex digit token only keeps names created in the
//! same microsecond apart and is ignored when querying.

use std::fmt;

use log::{debug, info};
use regex::Regex;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{Error, Result};
use crate::repository::Repository;
use crate::unified_diff::Diff;

/// Fixed-width, lexically sortable UTC timestamp used in tag names.
pub const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour][minute][second].[subsecond digits:6]Z");

const TIMESTAMP_PATTERN: &str = r"\d{4}-\d{2}-\d{2}T\d{6}\.\d{6}Z";
const TOKEN_PATTERN: &str = r"[0-9a-f]{4}";

/// Order of query results by tag creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagOrder {
    /// Most recent first.
    #[default]
    Descending,
    Ascending,
}

/// A decoded scoped tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedTag {
    pub timestamp: OffsetDateTime,
    pub token: String,
    pub file: String,
    pub value: String,
    /// The full tag name as stored in git.
    pub raw: String,
}

impl ScopedTag {
    /// Build a tag, validating the value and computing its encoded name.
    pub fn new(timestamp: OffsetDateTime, token: &str, file: &str, value: &str) -> Result<Self> {
        let raw = encode(timestamp, token, file, value)?;
        Ok(Self {
            timestamp,
            token: token.to_string(),
            file: file.to_string(),
            value: value.to_string(),
            raw,
        })
    }

    /// Decode a tag name; `None` for names not produced by this scheme.
    pub fn decode(raw: &str) -> Option<Self> {
        let pattern = format!(
            r"^(?P<ts>{})/(?P<token>{})/(?P<file>.+)/(?P<value>[^/]+)$",
            TIMESTAMP_PATTERN, TOKEN_PATTERN
        );
        let captures = Regex::new(&pattern).ok()?.captures(raw)?;
        let timestamp = PrimitiveDateTime::parse(&captures["ts"], TIMESTAMP_FORMAT)
            .ok()?
            .assume_utc();

        Some(Self {
            timestamp,
            token: captures["token"].to_string(),
            file: captures["file"].to_string(),
            value: captures["value"].to_string(),
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for ScopedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Reject tag values that cannot be encoded.
pub fn validate_value(value: &str) -> Result<()> {
    let message = if value.is_empty() {
        "tag values cannot be empty"
    } else if value.contains('/') {
        "tag values cannot contain '/'"
    } else {
        return Ok(());
    };

    Err(Error::InvalidTagValue {
        value: value.to_string(),
        message: message.to_string(),
    })
}

/// Encode a scoped tag name.
pub fn encode(timestamp: OffsetDateTime, token: &str, file: &str, value: &str) -> Result<String> {
    validate_value(value)?;
    let timestamp = timestamp.to_offset(time::UtcOffset::UTC);
    Ok(format!(
        "{}/{}/{}/{}",
        timestamp.format(TIMESTAMP_FORMAT)?,
        token,
        file,
        value
    ))
}

/// Four random hex digits.
pub fn random_token() -> Result<String> {
    let mut bytes = [0u8; 2];
    getrandom::getrandom(&mut bytes).map_err(|e| Error::Random {
        message: e.to_string(),
    })?;
    Ok(format!("{:02x}{:02x}", bytes[0], bytes[1]))
}

/// Matches encoded names by their `file/value` suffix, whatever their
/// timestamp and token.
pub struct TagMatcher {
    regex: Regex,
}

impl TagMatcher {
    /// `file` of `None` matches tags scoped to any file.
    pub fn new(file: Option<&str>, value: &str) -> Result<Self> {
        let file = file.map(regex::escape).unwrap_or_else(|| ".+".to_string());
        let pattern = format!(
            "^{}/{}/{}/{}$",
            TIMESTAMP_PATTERN,
            TOKEN_PATTERN,
            file,
            regex::escape(value)
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// The commit SHA recorded in a tag's annotation.
fn annotated_commit(repository: &dyn Repository, name: &str) -> Result<String> {
    let annotation = repository.tag_annotation(name)?;
    let regex = Regex::new(r"\b[0-9a-f]{40}\b")?;
    regex
        .find(&annotation)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::TagPayload {
            tag: name.to_string(),
        })
}

fn matching_names(
    repository: &dyn Repository,
    file: Option<&str>,
    value: &str,
) -> Result<Vec<String>> {
    let matcher = TagMatcher::new(file, value)?;
    let mut names: Vec<String> = repository
        .tag_names()?
        .into_iter()
        .filter(|name| matcher.matches(name))
        .collect();
    names.sort();
    Ok(names)
}

/// Every commit tagged `value` (scoped to `file`, or to any file), ordered
/// by when the tag was created.
pub fn find_tagged_commits(
    repository: &dyn Repository,
    file: Option<&str>,
    value: &str,
    order: TagOrder,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    let mut names = matching_names(repository, file, value)?;
    if order == TagOrder::Descending {
        names.reverse();
    }
    if let Some(limit) = limit {
        names.truncate(limit);
    }
    debug!("{} tags match {:?}/{}", names.len(), file, value);

    names
        .iter()
        .map(|name| annotated_commit(repository, name))
        .collect()
}

/// Result of [`tag_commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// A new tag with this name was created.
    Created(String),
    /// The commit already carried this tag for this file, under this name.
    AlreadyTagged(String),
}

/// Tag commit `sha` with `value`, scoped to `file`.
///
/// Nothing is created when the same commit already has the same tag for
/// the same file. The check runs against the current tag list and is not
/// atomic with the creation that follows.
pub fn tag_commit(
    repository: &dyn Repository,
    sha: &str,
    file: &str,
    value: &str,
    message: &str,
) -> Result<TagOutcome> {
    validate_value(value)?;
    let commit = repository.find_commit(sha)?;

    for name in matching_names(repository, Some(file), value)? {
        if annotated_commit(repository, &name)? == commit.sha {
            info!("{} is already tagged {} for {}", commit.short_sha(), value, file);
            return Ok(TagOutcome::AlreadyTagged(name));
        }
    }

    let tag = ScopedTag::new(OffsetDateTime::now_utc(), &random_token()?, file, value)?;
    repository.create_annotated_tag(&tag.raw, &commit.sha, message)?;
    info!("Created tag {} on {}", tag, commit.short_sha());
    Ok(TagOutcome::Created(tag.raw))
}

/// Files a tag on commit `sha` is scoped to: `file` when given, which the
/// commit must touch, otherwise every file that survives the commit.
pub fn files_to_tag(diff: &Diff, file: Option<&str>, sha: &str) -> Result<Vec<String>> {
    match file {
        Some(file) if diff.has_file(file) => Ok(vec![file.to_string()]),
        Some(file) => Err(Error::FileNotInCommit {
            file: file.to_string(),
            sha: sha.to_string(),
        }),
        None => Ok(diff
            .surviving_files()
            .into_iter()
            .map(str::to_string)
            .collect()),
    }
}
