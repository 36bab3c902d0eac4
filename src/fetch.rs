//! Page fetching with an on-disk cache.
//!
//! Everything downstream of the parser talks to a [`Fetcher`] trait object,
//! so tests can serve canned pages from a directory and the embed resolver
//! never hard-codes a transport.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};

/// Browser-like headers. The mobile site serves the legacy markup only to
/// clients that look like real browsers.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:68.0) Gecko/20100101 Firefox/68.0";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw page bytes.
pub trait Fetcher {
    /// Fetches `url`. With `use_cache` set, a previously stored copy may be
    /// returned and a fresh download is stored for next time.
    fn fetch(&self, url: &str, use_cache: bool) -> Result<Vec<u8>>;
}

/// Fetches over HTTP, mirroring successful responses into a cache directory.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    cache_dir: PathBuf,
}

impl HttpFetcher {
    /// Creates a fetcher caching under `cache_dir`. The directory is created
    /// on first store, not here.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
        })
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(cache_file_name(url))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, use_cache: bool) -> Result<Vec<u8>> {
        let path = self.cache_path(url);
        if use_cache {
            if let Ok(body) = fs::read(&path) {
                debug!("cache hit for {url}");
                return Ok(body);
            }
        }

        debug!("fetching {url}");
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{url}: status {status}")));
        }
        let body = resp
            .bytes()
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?
            .to_vec();

        if use_cache {
            fs::create_dir_all(&self.cache_dir)?;
            fs::write(&path, &body)?;
        }
        Ok(body)
    }
}

/// Serves pages from a directory of files named after their URLs. Used in
/// tests and for replaying cached sessions; never touches the network.
pub struct DirFetcher {
    dir: PathBuf,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Fetcher for DirFetcher {
    fn fetch(&self, url: &str, _use_cache: bool) -> Result<Vec<u8>> {
        let path = self.dir.join(cache_file_name(url));
        fs::read(&path).map_err(|_| Error::Fetch(format!("{url}: not in {}", self.dir.display())))
    }
}

/// Refuses every fetch. For parsing with embeds disabled.
pub struct NullFetcher;

impl Fetcher for NullFetcher {
    fn fetch(&self, url: &str, _use_cache: bool) -> Result<Vec<u8>> {
        Err(Error::Fetch(format!("{url}: fetching disabled")))
    }
}

/// Cache file name for a URL: percent-encoded so it is a single safe path
/// component on any filesystem.
pub fn cache_file_name(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}

/// Writes `body` into `dir` under the cache name for `url`. Test fixtures and
/// session replays use this to seed a [`DirFetcher`].
pub fn store_page(dir: &Path, url: &str, body: &[u8]) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(cache_file_name(url)), body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_names_are_single_path_components() {
        let name = cache_file_name("https://mobile.twitter.com/user?max_id=5");
        assert!(!name.contains('/'));
        assert!(!name.contains('?'));
        assert!(name.contains("max_id"));
    }

    #[test]
    fn dir_fetcher_round_trips_stored_pages() {
        let dir = std::env::temp_dir().join("featherfeed-fetch-test");
        let url = "https://mobile.twitter.com/someuser";
        store_page(&dir, url, b"<html></html>").unwrap();
        let fetcher = DirFetcher::new(&dir);
        assert_eq!(fetcher.fetch(url, true).unwrap(), b"<html></html>");
        assert!(fetcher.fetch("https://example.com/missing", true).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
