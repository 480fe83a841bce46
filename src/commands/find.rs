//! Find command implementation
//!
//! Prints the commits of a manifest repository that carry a tag, one SHA
//! per line, most recently tagged first unless `--ascending` is given.

use anyhow::Result;
use clap::Args;

use manifestly::tag::{self, TagOrder};

use super::RemoteArgs;

/// Arguments for the find command
#[derive(Args, Debug)]
pub struct FindArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Only consider tags scoped to this manifest file
    #[arg(long, value_name = "PATH")]
    pub repo_file: Option<String>,

    /// Tag value to look for
    #[arg(long, value_name = "VALUE")]
    pub tag: String,

    /// Print at most this many commits
    #[arg(long)]
    pub limit: Option<usize>,

    /// Oldest tag first
    #[arg(long)]
    pub ascending: bool,
}

/// Execute the find command
pub fn execute(args: FindArgs) -> Result<()> {
    let repository = args.remote.open()?;
    let order = if args.ascending {
        TagOrder::Ascending
    } else {
        TagOrder::Descending
    };

    let shas = tag::find_tagged_commits(
        &repository,
        args.repo_file.as_deref(),
        &args.tag,
        order,
        args.limit,
    )?;

    for sha in shas {
        println!("{}", sha);
    }
    Ok(())
}
