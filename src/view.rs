//! Plain-text tables for manifests and commit history.
//!
//! Paging state lives in a [`CommitView`] owned by the caller; rendering is
//! a pure function of the commits and the view.

use crate::commit::{abbreviate_sha, Commit};
use crate::manifest::Manifest;

pub const COMMITS_PER_PAGE: usize = 15;

const MESSAGE_WIDTH: usize = 54;
const REPOSITORY_WIDTH: usize = 40;

/// Which page of history to show, and whether to show only merged pull
/// requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitView {
    pub page: usize,
    pub prs_only: bool,
}

impl CommitView {
    pub fn new(page: usize, prs_only: bool) -> Self {
        Self { page, prs_only }
    }

    pub fn next_page(&mut self) {
        self.page += 1;
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Switch the pull request filter. The listing changes, so paging
    /// starts over.
    pub fn toggle_prs_only(&mut self) {
        self.prs_only = !self.prs_only;
        self.page = 0;
    }

    /// Index of the first commit on the current page.
    pub fn offset(&self) -> usize {
        self.page * COMMITS_PER_PAGE
    }

    /// How many of the most recent commits must be fetched to fill the
    /// current page.
    pub fn fetch_limit(&self) -> usize {
        self.offset() + COMMITS_PER_PAGE
    }

    /// The commits on the current page, out of a newest-first listing.
    pub fn page_of<'a>(&self, commits: &'a [Commit]) -> &'a [Commit] {
        let start = self.offset().min(commits.len());
        let end = self.fetch_limit().min(commits.len());
        &commits[start..end]
    }
}

fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{:<width$}", clipped, width = width)
}

/// One page of a newest-first commit listing as a table.
///
/// `commits` must include everything before the page (see
/// [`CommitView::fetch_limit`]). The `#` column is the commit's position in
/// the whole listing, which stays stable when paging.
pub fn render_commits(commits: &[Commit], view: &CommitView) -> String {
    let mut out = format!(
        "{:>4}  {:<10}  {}  {}\n",
        "#",
        "SHA",
        fit("Message", MESSAGE_WIDTH),
        "Date"
    );

    let page = view.page_of(commits);
    if page.is_empty() {
        out.push_str(&format!("{:>4}  {}\n", "", "----- NO COMMITS -----"));
        return out;
    }

    for (index, commit) in page.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<10}  {}  {}\n",
            view.offset() + index,
            commit.short_sha(),
            fit(&commit.summarized_message(), MESSAGE_WIDTH),
            commit.date
        ));
    }

    let filter = if view.prs_only { ", pull requests only" } else { "" };
    out.push_str(&format!("\nPage {}{}\n", view.page + 1, filter));
    out
}

/// A manifest as a numbered table of entries.
pub fn render_manifest(manifest: &Manifest) -> String {
    let mut out = format!(
        "{:>4}  {}  {}\n",
        "#",
        fit("Repository", REPOSITORY_WIDTH),
        "SHA"
    );

    if manifest.is_empty() {
        out.push_str(&format!("{:>4}  {}\n", "", "----- EMPTY -----"));
        return out;
    }

    for (index, item) in manifest.items().iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {}  {}\n",
            format!("({})", index),
            fit(&item.entry.label(), REPOSITORY_WIDTH),
            abbreviate_sha(item.commit())
        ));
    }
    out
}
