//! Tag command implementation
//!
//! Tags a commit of a manifest repository. Tags are scoped to manifest
//! files: to `--file` when given, otherwise to every file the commit
//! leaves in place. Re-tagging a commit that already carries the tag for a
//! file does nothing and prints nothing.

use anyhow::Result;
use clap::Args;
use log::info;

use manifestly::defaults::TAG_MESSAGE;
use manifestly::repository::Repository;
use manifestly::suggestions;
use manifestly::tag::{self, TagOutcome};
use manifestly::unified_diff::Diff;

use super::RemoteArgs;

/// Arguments for the tag command
#[derive(Args, Debug)]
pub struct TagArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Commit to tag
    #[arg(long)]
    pub sha: String,

    /// Tag value, e.g. `release-to-qa`
    #[arg(long, value_name = "VALUE")]
    pub tag: String,

    /// Manifest file the tag applies to (defaults to every file the commit changes)
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Tag message
    #[arg(short, long)]
    pub message: Option<String>,

    /// Create the tags locally without pushing them
    #[arg(long)]
    pub no_push: bool,
}

/// Execute the tag command
pub fn execute(args: TagArgs) -> Result<()> {
    tag::validate_value(&args.tag)?;

    let repository = args.remote.open()?;
    let commit = repository.find_commit(&args.sha)?;
    let diff = Diff::parse(&repository.show_text(&commit.sha)?)?;
    let files = tag::files_to_tag(&diff, args.file.as_deref(), &commit.sha)
        .map_err(|e| suggestions::explain(e, &[]))?;

    let message = args.message.as_deref().unwrap_or(TAG_MESSAGE);
    for file in files {
        match tag::tag_commit(&repository, &commit.sha, &file, &args.tag, message)? {
            TagOutcome::Created(name) => {
                if !args.no_push {
                    repository.push_tag(&name)?;
                }
                println!("{}", name);
            }
            TagOutcome::AlreadyTagged(name) => {
                info!("{} already tagged as {}", file, name);
            }
        }
    }

    Ok(())
}
