//! Thin wrappers around the system `git` command.
//!
//! Using the `git` executable (rather than a library) means the user's SSH
//! keys, credential helpers and `~/.gitconfig` all apply unchanged.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

fn spawn(dir: &Path, args: &[&str]) -> Result<Output> {
    debug!("git {} (in {})", args.join(" "), dir.display());
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Run git in `dir` and return its standard output.
pub fn run(dir: &Path, args: &[&str]) -> Result<String> {
    let output = spawn(dir, args)?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run git in `dir` and report only whether it exited successfully.
///
/// Used for commands whose exit status is the answer, such as
/// `diff --quiet` or `rev-parse --verify`.
pub fn succeeds(dir: &Path, args: &[&str]) -> Result<bool> {
    Ok(spawn(dir, args)?.status.success())
}

/// Whether `path` is the top level of a non-bare git working tree.
pub fn is_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Clone `url` into `target_dir`, replacing anything already there.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }

    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    // Relative URLs and targets are resolved against the process directory.
    let here = Path::new(".");
    let target = target_dir.to_string_lossy().into_owned();
    let output = spawn(here, &["clone", "-q", url, target.as_str()])?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        let stderr = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                Error: {}",
                stderr
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitCommand {
            command: format!("clone {}", url),
            dir: target,
            stderr,
        });
    }

    Ok(())
}

/// Where a clone of `url` lives inside the cache directory.
pub fn url_to_cache_path(cache_root: &Path, url: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    let url_hash = format!("{:x}", hasher.finish());

    let name = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default()
        .trim_end_matches(".git");

    cache_root.join(format!("{}-{}", url_hash, encode_path_component(name)))
}

/// Replace characters that are unsafe in a single path component.
fn encode_path_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect()
}

/// Extract the `org/name` identity from a remote URL.
///
/// Handles scp-style (`git@github.com:org/name.git`) and URL-style
/// (`https://github.com/org/name`) remotes. Local paths have no identity.
pub fn remote_identity(url: &str) -> Option<String> {
    let patterns = [
        r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^/]+/(?P<name>.+?)(?:\.git)?/?$",
        r"^[^@/]+@[^:/]+:(?P<name>.+?)(?:\.git)?/?$",
    ];

    patterns.iter().find_map(|pattern| {
        let regex = Regex::new(pattern).ok()?;
        let captures = regex.captures(url.trim())?;
        Some(captures.name("name")?.as_str().to_string())
    })
}
