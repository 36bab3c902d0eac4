//! URL helpers for the canonical site hosts.

use url::Url;

use crate::patterns::STATUS_ID;

/// Scheme used when absolutizing host-less links.
pub const DEFAULT_SCHEME: &str = "https";
/// Canonical host serving the full site.
pub const DEFAULT_HOST: &str = "twitter.com";
/// Host serving the basic-HTML pages used for embedded resources.
pub const MOBILE_HOST: &str = "mobile.twitter.com";

/// Strips a leading '@' if present.
pub fn bare_user(u: &str) -> &str {
    u.strip_prefix('@').filter(|rest| !rest.is_empty()).unwrap_or(u)
}

/// Canonical URL of a user's timeline.
pub fn user_url(user: &str) -> String {
    format!("{DEFAULT_SCHEME}://{DEFAULT_HOST}/{user}")
}

/// Rewrites `s` to an absolute URL on the canonical host.
///
/// Absolute URLs come back unchanged; anything without a host is joined onto
/// `https://twitter.com/`. Returns `None` for empty or unparseable input.
pub fn absolute_url(s: &str) -> Option<String> {
    if s.is_empty() {
        return None;
    }
    match Url::parse(s) {
        Ok(u) => Some(u.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(&format!("{DEFAULT_SCHEME}://{DEFAULT_HOST}/")).ok()?;
            Some(base.join(s).ok()?.to_string())
        }
        Err(_) => None,
    }
}

/// Rewrites `u` to the mobile host, which serves plain HTML without
/// client-side rendering. Returns `None` when `u` points somewhere else
/// entirely.
pub fn mobile_url(u: &str) -> Option<String> {
    let mut url = Url::parse(u).ok()?;
    if url.host_str() == Some(DEFAULT_HOST) {
        url.set_host(Some(MOBILE_HOST)).ok()?;
    }
    if url.host_str() != Some(MOBILE_HOST) {
        return None;
    }
    Some(url.to_string())
}

/// Extracts the numeric post id from a canonical post URL,
/// e.g. `https://twitter.com/biff_tannen/status/128132325431`.
pub fn status_id(u: &str) -> Option<i64> {
    STATUS_ID.captures(u)?.get(1)?.as_str().parse().ok()
}
