//! Data model: the timeline owner's profile and the extracted posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Avatar size suffixes used to derive one avatar URL from the other.
const ICON_SUFFIX: &str = "_normal.";
const IMAGE_SUFFIX: &str = "_400x400.";

/// The timeline owner, extracted once per document from its profile region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Bare handle, without the '@' sigil.
    pub user: String,
    /// Display name (free text).
    pub name: String,
    /// Small avatar URL.
    pub icon_url: String,
    /// Large avatar URL, derived from `icon_url` or vice versa.
    pub image_url: String,
}

impl Profile {
    /// "Full Name (@handle)".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} (@{})", self.name, self.user)
    }

    /// Fills both avatar URLs from whichever size `src` happens to be.
    pub(crate) fn set_avatar(&mut self, src: &str) {
        if src.contains(IMAGE_SUFFIX) {
            self.image_url = src.to_string();
            self.icon_url = src.replacen(IMAGE_SUFFIX, ICON_SUFFIX, 1);
        } else {
            self.icon_url = src.to_string();
            self.image_url = src.replacen(ICON_SUFFIX, IMAGE_SUFFIX, 1);
        }
    }
}

/// A post's author. Differs from the timeline owner on re-shares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Bare handle, without the '@' sigil.
    pub user: String,
    /// Display name.
    pub name: String,
}

impl Author {
    /// "Full Name (@handle)".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} (@{})", self.name, self.user)
    }
}

/// One timeline entry.
///
/// Ids are assigned monotonically per author by the source system, but a
/// re-shared post keeps its original author's id, which can be numerically
/// far out of order relative to the surrounding posts. Anything that pages
/// through a timeline must track the oldest *own-authored* id separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique positive id parsed from the canonical post URL or data attribute.
    pub id: i64,
    /// Absolute canonical URL of the post.
    pub href: String,
    /// The post's author.
    pub author: Author,
    /// Absolute instant, reconstructed from the page's textual form.
    pub timestamp: DateTime<Utc>,
    /// Sanitized, self-contained HTML fragment with absolute links.
    pub content: String,
    /// Plain-text rendering of `content`, whitespace-collapsed.
    pub text: String,
    /// Handles this post replies to, in document order. Empty when the post
    /// is not a reply.
    pub reply_to: Vec<String>,
}

impl Post {
    /// True when the post replies to at least one other handle.
    #[must_use]
    pub fn is_reply(&self) -> bool {
        !self.reply_to.is_empty()
    }
}

/// Result of parsing one timeline document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub profile: Profile,
    /// Posts in document order, newest first.
    pub posts: Vec<Post>,
    /// Absolute URL of the next page, when the markup carries a pagination
    /// link (only the legacy markup does).
    pub next_page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_urls_derive_from_either_size() {
        let mut p = Profile::default();
        p.set_avatar("https://pbs.example.com/profile_images/123/abc_normal.jpg");
        assert!(p.image_url.ends_with("abc_400x400.jpg"));

        let mut p = Profile::default();
        p.set_avatar("https://pbs.example.com/profile_images/123/abc_400x400.jpg");
        assert!(p.icon_url.ends_with("abc_normal.jpg"));
    }

    #[test]
    fn display_names_include_handle() {
        let a = Author {
            user: "biff_tannen".into(),
            name: "Biff Tannen".into(),
        };
        assert_eq!(a.display_name(), "Biff Tannen (@biff_tannen)");
    }
}
