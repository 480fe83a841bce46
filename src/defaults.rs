//! Default values for manifestly configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Length commit references are abbreviated to when writing manifests.
pub const SHA_LENGTH: usize = 10;

/// Commit message used by `upload` when none is given.
pub const UPLOAD_MESSAGE: &str = "Update manifest";

/// Tag message used by `tag` when none is given.
pub const TAG_MESSAGE: &str = "Tagged by manifestly";

/// Returns the default cache root directory for clones of remote
/// manifest repositories.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/manifestly` (XDG Base Directory)
/// - macOS: `~/Library/Caches/manifestly`
/// - Windows: `{FOLDERID_LocalAppData}\manifestly`
///
/// Falls back to `.manifestly-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `MANIFESTLY_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".manifestly-cache"))
        .join("manifestly")
}
