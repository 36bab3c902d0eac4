//! Multi-page timeline aggregation.
//!
//! Paging works on the oldest *own-authored* id seen so far. Re-shared posts
//! keep their original ids, which can be numerically far older or newer than
//! the surrounding posts, so using just any minimum would jump the window
//! wildly. Overlap between pages is expected and removed by id.

use std::collections::HashSet;

use log::warn;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::options::Options;
use crate::result::{Post, Profile};
use crate::url_utils::{bare_user, DEFAULT_SCHEME, MOBILE_HOST};

/// Outcome of a collection run.
#[derive(Debug)]
pub enum Update {
    /// The newest own post matches the id the caller already has; nothing to
    /// write.
    Unchanged,
    /// Fresh content was collected.
    New(TimelineUpdate),
}

/// Aggregated result of paging through a timeline.
#[derive(Debug)]
pub struct TimelineUpdate {
    pub profile: Profile,
    /// Posts across all pages, document order, duplicates removed.
    pub posts: Vec<Post>,
    /// Newest own-authored post id, for the caller to persist.
    pub latest_id: i64,
}

/// Fetches and parses up to `pages` pages of `user`'s timeline.
///
/// `old_latest_id` is the newest own post id from the previous run (0 for
/// none); when the first page still starts with it, the run short-circuits
/// to [`Update::Unchanged`] without fetching further pages.
pub fn collect_timeline(
    fetcher: &dyn Fetcher,
    user: &str,
    old_latest_id: i64,
    pages: usize,
    opts: Options,
) -> Result<Update> {
    let user = bare_user(user);
    let base = format!("{DEFAULT_SCHEME}://{MOBILE_HOST}/{user}");

    let mut url = base.clone();
    let mut seen = HashSet::new();
    let mut posts: Vec<Post> = Vec::new();
    let mut profile: Option<Profile> = None;

    for page in 0..pages.max(1) {
        let bytes = fetcher.fetch(&url, false)?;
        let timeline = crate::parse_timeline_bytes(&bytes, fetcher, opts)?;

        let own_ids: Vec<i64> = timeline
            .posts
            .iter()
            .filter(|p| p.author.user.eq_ignore_ascii_case(user))
            .map(|p| p.id)
            .collect();

        if page == 0 && old_latest_id != 0 && own_ids.iter().max() == Some(&old_latest_id) {
            return Ok(Update::Unchanged);
        }

        profile.get_or_insert(timeline.profile);
        for post in timeline.posts {
            if seen.insert(post.id) {
                posts.push(post);
            }
        }

        let Some(oldest_own) = own_ids.iter().min().copied() else {
            warn!("page {url} has no posts by {user}; stopping (possible gap)");
            break;
        };
        let next = timeline
            .next_page
            .unwrap_or_else(|| format!("{base}?max_id={oldest_own}"));
        if next == url {
            warn!("pagination is not advancing past {url}; stopping");
            break;
        }
        url = next;
    }

    let profile = profile.ok_or_else(|| Error::structure("no pages were parsed"))?;
    let latest_id = posts
        .iter()
        .filter(|p| p.author.user.eq_ignore_ascii_case(user))
        .map(|p| p.id)
        .max()
        .or_else(|| posts.iter().map(|p| p.id).max())
        .unwrap_or(old_latest_id);

    Ok(Update::New(TimelineUpdate {
        profile,
        posts,
        latest_id,
    }))
}
