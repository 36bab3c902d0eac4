//! Syndication feed output: Atom, RSS 2.0, and JSON Feed.
//!
//! Every format embeds the newest own post id so the next run can skip work
//! when nothing changed: XML formats append it as a trailing comment after
//! the document element, JSON Feed carries it in `user_comment`.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::json;

use crate::error::{Error, Result};
use crate::patterns::{JSON_LATEST_ID, XML_LATEST_ID};
use crate::result::{Post, Profile};
use crate::url_utils::user_url;

/// Item titles longer than this are cut and ellipsized.
const MAX_TITLE_CHARS: usize = 80;

/// Output feed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FeedFormat {
    Atom,
    Rss,
    Json,
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFormat::Atom => write!(f, "atom"),
            FeedFormat::Rss => write!(f, "rss"),
            FeedFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for FeedFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "atom" => Ok(FeedFormat::Atom),
            "rss" => Ok(FeedFormat::Rss),
            "json" => Ok(FeedFormat::Json),
            other => Err(Error::Feed(format!("unknown feed format {other:?}"))),
        }
    }
}

/// Writes a feed for `posts` to `w`.
///
/// Replies are skipped unless `include_replies` is set. `latest_id` is the
/// newest own post id, embedded for [`read_latest_id`] to recover.
pub fn write_feed(
    w: &mut dyn Write,
    format: FeedFormat,
    profile: &Profile,
    posts: &[Post],
    latest_id: i64,
    include_replies: bool,
) -> Result<()> {
    let posts: Vec<&Post> = posts
        .iter()
        .filter(|p| include_replies || !p.is_reply())
        .collect();
    match format {
        FeedFormat::Atom => write_atom(w, profile, &posts, latest_id),
        FeedFormat::Rss => write_rss(w, profile, &posts, latest_id),
        FeedFormat::Json => write_json(w, profile, &posts, latest_id),
    }
}

/// Recovers the latest-id marker from a previously written feed file.
///
/// A missing file or a file without a marker both yield 0, which callers
/// treat as "fetch everything".
pub fn read_latest_id(path: &Path, format: FeedFormat) -> Result<i64> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let id = match format {
        FeedFormat::Atom | FeedFormat::Rss => XML_LATEST_ID
            .captures(&content)
            .and_then(|c| c[1].parse().ok()),
        FeedFormat::Json => serde_json::from_str::<serde_json::Value>(&content)
            .ok()
            .and_then(|v| {
                v.get("user_comment")
                    .and_then(|c| c.as_str())
                    .and_then(|c| JSON_LATEST_ID.captures(c))
                    .and_then(|c| c[1].parse().ok())
            }),
    };
    Ok(id.unwrap_or(0))
}

/// Feed-wide update time: the newest post, or now for an empty feed.
fn updated_at(posts: &[&Post]) -> DateTime<Utc> {
    posts
        .iter()
        .map(|p| p.timestamp)
        .max()
        .unwrap_or_else(Utc::now)
}

/// Cuts `text` to a one-line title.
fn item_title(text: &str) -> String {
    if text.chars().count() <= MAX_TITLE_CHARS {
        return text.to_string();
    }
    let mut title: String = text.chars().take(MAX_TITLE_CHARS - 1).collect();
    title.push('…');
    title
}

type XmlWriter<'a> = Writer<&'a mut Vec<u8>>;

fn xml_err(e: impl fmt::Display) -> Error {
    Error::Feed(e.to_string())
}

fn text_element(xml: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    xml.write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    xml.write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

fn start(xml: &mut XmlWriter, name: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn end(xml: &mut XmlWriter, name: &str) -> Result<()> {
    xml.write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)
}

fn write_atom(w: &mut dyn Write, profile: &Profile, posts: &[&Post], latest_id: i64) -> Result<()> {
    let home = user_url(&profile.user);
    let mut buf = Vec::new();
    let mut xml = Writer::new_with_indent(&mut buf, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;
    let mut feed = BytesStart::new("feed");
    feed.push_attribute(("xmlns", "http://www.w3.org/2005/Atom"));
    xml.write_event(Event::Start(feed)).map_err(xml_err)?;

    text_element(&mut xml, "title", &profile.display_name())?;
    text_element(&mut xml, "id", &home)?;
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", home.as_str()));
    xml.write_event(Event::Empty(link)).map_err(xml_err)?;
    text_element(&mut xml, "icon", &profile.icon_url)?;
    text_element(&mut xml, "logo", &profile.image_url)?;
    text_element(&mut xml, "updated", &updated_at(posts).to_rfc3339())?;
    start(&mut xml, "author")?;
    text_element(&mut xml, "name", &profile.display_name())?;
    end(&mut xml, "author")?;

    for post in posts {
        start(&mut xml, "entry")?;
        text_element(&mut xml, "title", &item_title(&post.text))?;
        text_element(&mut xml, "id", &post.href)?;
        let mut link = BytesStart::new("link");
        link.push_attribute(("rel", "alternate"));
        link.push_attribute(("href", post.href.as_str()));
        xml.write_event(Event::Empty(link)).map_err(xml_err)?;
        text_element(&mut xml, "published", &post.timestamp.to_rfc3339())?;
        text_element(&mut xml, "updated", &post.timestamp.to_rfc3339())?;
        start(&mut xml, "author")?;
        text_element(&mut xml, "name", &post.author.display_name())?;
        end(&mut xml, "author")?;
        let mut content = BytesStart::new("content");
        content.push_attribute(("type", "html"));
        xml.write_event(Event::Start(content)).map_err(xml_err)?;
        xml.write_event(Event::Text(BytesText::new(&post.content)))
            .map_err(xml_err)?;
        end(&mut xml, "content")?;
        end(&mut xml, "entry")?;
    }

    end(&mut xml, "feed")?;
    w.write_all(&buf)?;
    write_trailer(w, latest_id)
}

fn write_rss(w: &mut dyn Write, profile: &Profile, posts: &[&Post], latest_id: i64) -> Result<()> {
    let home = user_url(&profile.user);
    let mut buf = Vec::new();
    let mut xml = Writer::new_with_indent(&mut buf, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;
    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    xml.write_event(Event::Start(rss)).map_err(xml_err)?;
    start(&mut xml, "channel")?;

    text_element(&mut xml, "title", &profile.display_name())?;
    text_element(&mut xml, "link", &home)?;
    text_element(&mut xml, "description", &format!("Posts by @{}", profile.user))?;
    text_element(&mut xml, "lastBuildDate", &updated_at(posts).to_rfc2822())?;
    start(&mut xml, "image")?;
    text_element(&mut xml, "url", &profile.icon_url)?;
    text_element(&mut xml, "title", &profile.display_name())?;
    text_element(&mut xml, "link", &home)?;
    end(&mut xml, "image")?;

    for post in posts {
        start(&mut xml, "item")?;
        text_element(&mut xml, "title", &item_title(&post.text))?;
        text_element(&mut xml, "link", &post.href)?;
        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "true"));
        xml.write_event(Event::Start(guid)).map_err(xml_err)?;
        xml.write_event(Event::Text(BytesText::new(&post.href)))
            .map_err(xml_err)?;
        end(&mut xml, "guid")?;
        text_element(&mut xml, "pubDate", &post.timestamp.to_rfc2822())?;
        text_element(&mut xml, "description", &post.content)?;
        end(&mut xml, "item")?;
    }

    end(&mut xml, "channel")?;
    end(&mut xml, "rss")?;
    w.write_all(&buf)?;
    write_trailer(w, latest_id)
}

fn write_json(w: &mut dyn Write, profile: &Profile, posts: &[&Post], latest_id: i64) -> Result<()> {
    let items: Vec<serde_json::Value> = posts
        .iter()
        .map(|post| {
            json!({
                "id": post.href,
                "url": post.href,
                "title": item_title(&post.text),
                "content_html": post.content,
                "date_published": post.timestamp.to_rfc3339(),
                "author": { "name": post.author.display_name() },
            })
        })
        .collect();
    let feed = json!({
        "version": "https://jsonfeed.org/version/1",
        "title": profile.display_name(),
        "home_page_url": user_url(&profile.user),
        "icon": profile.image_url,
        "favicon": profile.icon_url,
        "user_comment": format!("latest id {latest_id}"),
        "items": items,
    });
    serde_json::to_writer_pretty(&mut *w, &feed).map_err(|e| Error::Feed(e.to_string()))?;
    writeln!(w)?;
    Ok(())
}

fn write_trailer(w: &mut dyn Write, latest_id: i64) -> Result<()> {
    writeln!(w, "\n<!-- latest id {latest_id} -->")?;
    Ok(())
}
