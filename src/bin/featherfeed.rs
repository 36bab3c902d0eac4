//! Command-line front end: turns a user's timeline into a feed file.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use featherfeed::{
    collect_timeline, parse_timeline_bytes, read_latest_id, write_feed, FeedFormat, HttpFetcher,
    Options, Update,
};

#[derive(Parser)]
#[command(name = "featherfeed", version, about = "Generates feeds for a twitter.com timeline")]
struct Args {
    /// User whose timeline to fetch (with or without the leading '@').
    user: String,

    /// Feed file to create or update. Required unless --debug-file is given.
    feed_file: Option<PathBuf>,

    /// Directory for cached pages.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Parse a saved timeline page and dump the posts instead of writing a
    /// feed.
    #[arg(long)]
    debug_file: Option<PathBuf>,

    /// Resolve embedded resources (quoted posts, photos).
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    embeds: bool,

    /// Rewrite the feed even when the timeline looks unchanged.
    #[arg(long)]
    force: bool,

    /// Feed format.
    #[arg(long, value_enum, default_value_t = FeedFormat::Atom)]
    format: FeedFormat,

    /// Maximum number of timeline pages to fetch.
    #[arg(long, default_value_t = 3)]
    pages: usize,

    /// Include replies in the feed.
    #[arg(long)]
    replies: bool,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn default_cache_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".cache"))
        .unwrap_or_else(std::env::temp_dir)
        .join("featherfeed")
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let cache_dir = args.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let fetcher = HttpFetcher::new(cache_dir)?;
    let opts = Options {
        embeds: args.embeds,
        ..Options::default()
    };

    if let Some(path) = &args.debug_file {
        let timeline = parse_timeline_bytes(&fs::read(path)?, &fetcher, opts)?;
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    let Some(feed_file) = &args.feed_file else {
        return Err("a feed file is required (or use --debug-file)".into());
    };

    let old_latest_id = if args.force {
        0
    } else {
        read_latest_id(feed_file, args.format)?
    };

    let update = match collect_timeline(&fetcher, &args.user, old_latest_id, args.pages, opts)? {
        Update::Unchanged => {
            info!("no new posts since id {old_latest_id}");
            return Ok(());
        }
        Update::New(update) => update,
    };

    // Write next to the destination and rename, so readers never see a
    // half-written feed.
    let tmp = feed_file.with_extension("tmp");
    {
        let mut out = fs::File::create(&tmp)?;
        write_feed(
            &mut out,
            args.format,
            &update.profile,
            &update.posts,
            update.latest_id,
            args.replies,
        )?;
    }
    fs::rename(&tmp, feed_file)?;
    info!(
        "wrote {} posts to {} (latest id {})",
        update.posts.len(),
        feed_file.display(),
        update.latest_id
    );
    Ok(())
}
