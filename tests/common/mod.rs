//! Shared test utilities for the E2E tests.
//!
//! Tests build real git repositories inside a temporary directory: working
//! copies under `src/` (the search path) and bare "remote" manifest
//! repositories under `remotes/`. Every git invocation, including the ones
//! made by the binary, runs with a fixed author identity so commits can be
//! created on machines without a global git configuration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! #[allow(dead_code)]
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! #[cfg_attr(not(feature = "integration-tests"), ignore)]
//! fn test_example() {
//!     let fixture = TestFixture::new();
//!     let api = fixture.repository("api", Some("git@github.com:org/api.git"));
//!     fixture.command().args(["create", "--search-paths", "src"]);
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

const GIT_ENV: [(&str, &str); 4] = [
    ("GIT_AUTHOR_NAME", "Manifestly Test"),
    ("GIT_AUTHOR_EMAIL", "test@example.com"),
    ("GIT_COMMITTER_NAME", "Manifestly Test"),
    ("GIT_COMMITTER_EMAIL", "test@example.com"),
];

/// Run git in `dir`, panicking on failure, and return trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(GIT_ENV)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A temporary directory holding repositories, manifests and the cache.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.write(path, content);
        self
    }

    /// Write a file relative to the fixture root.
    pub fn write(&self, path: &str, content: &str) {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
    }

    /// Read a file relative to the fixture root.
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Create a working copy at `src/<name>` with one initial commit and,
    /// optionally, an `origin` remote.
    pub fn repository(&self, name: &str, origin: Option<&str>) -> PathBuf {
        let dir = self.path().join("src").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create repository directory");
        git(&dir, &["init", "-q", "-b", "main"]);
        if let Some(url) = origin {
            git(&dir, &["remote", "add", "origin", url]);
        }
        commit(&dir, "Initial commit");
        dir
    }

    /// Create a bare repository at `remotes/<name>.git` seeded with a
    /// README, and return its path for use as `--repo`.
    pub fn remote(&self, name: &str) -> String {
        let bare = self.path().join("remotes").join(format!("{}.git", name));
        std::fs::create_dir_all(&bare).expect("Failed to create remote directory");
        git(&bare, &["init", "-q", "--bare", "-b", "main"]);

        let seed = self.path().join("seed").join(name);
        std::fs::create_dir_all(&seed).expect("Failed to create seed directory");
        git(&seed, &["init", "-q", "-b", "main"]);
        std::fs::write(seed.join("README.md"), "# Manifests\n").expect("Failed to write README");
        git(&seed, &["add", "README.md"]);
        git(&seed, &["commit", "-q", "-m", "Initial commit"]);
        git(&seed, &["remote", "add", "origin", &bare.to_string_lossy()]);
        git(&seed, &["push", "-q", "origin", "main"]);

        bare.to_string_lossy().into_owned()
    }

    /// Create a command configured to run in this fixture's directory with
    /// a private cache and a fixed git identity.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("manifestly");
        cmd.current_dir(self.path())
            .env("MANIFESTLY_CACHE", self.path().join("cache"))
            .env_remove("RUST_LOG")
            .envs(GIT_ENV);
        cmd
    }

    /// Run the binary, assert success and return stdout.
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.command().args(args).output().expect("Failed to run manifestly");
        assert!(
            output.status.success(),
            "manifestly {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an empty commit and return its SHA.
pub fn commit(dir: &Path, message: &str) -> String {
    git(dir, &["commit", "-q", "--allow-empty", "-m", message]);
    head(dir)
}

/// Create an empty commit that looks like a merged pull request.
pub fn merge_pull_request(dir: &Path, number: u32, branch: &str, title: &str) -> String {
    commit(
        dir,
        &format!("Merge pull request #{} from {}\n\n{}", number, branch, title),
    )
}

pub fn head(dir: &Path) -> String {
    git(dir, &["rev-parse", "HEAD"])
}

pub fn short(sha: &str) -> &str {
    &sha[..10]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("test.manifest", "[api]@abc\n");
        assert_eq!(fixture.read("test.manifest"), "[api]@abc\n");
    }
}
