//! Post command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use photoblog_cache::{DetailReady, OpenOutcome, PostDetail};
use photoblog_core::{FilterKey, PostId};

use crate::output;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Post ID
    pub id: String,

    /// Tag the post is browsed under, for previous/next
    #[arg(long)]
    pub tag: Option<String>,

    /// Viewport width used to pick the image size
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Print the post as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON shape of a displayed post.
#[derive(Serialize)]
struct PostView<'a> {
    id: &'a str,
    title: &'a str,
    date: &'a str,
    image: Option<&'a str>,
    tags: &'a [String],
    notes: u64,
    contributor: Option<&'a str>,
    prev: Option<&'a str>,
    next: Option<&'a str>,
    url: Option<&'a str>,
}

impl<'a> From<&'a DetailReady> for PostView<'a> {
    fn from(ready: &'a DetailReady) -> Self {
        Self {
            id: ready.post.id_string.as_str(),
            title: &ready.title,
            date: &ready.date,
            image: ready.image.as_ref().map(|image| image.url.as_str()),
            tags: &ready.post.tags,
            notes: ready.post.note_count,
            contributor: ready.contributor.as_ref().map(|c| c.name.as_str()),
            prev: ready.adjacency.prev.as_ref().map(PostId::as_str),
            next: ready.adjacency.next.as_ref().map(PostId::as_str),
            url: ready.post.post_url.as_deref(),
        }
    }
}

pub async fn run(args: PostArgs, settings: &Settings) -> Result<()> {
    let key = FilterKey::from(args.tag.as_deref());
    let id = PostId::new(&args.id).context("Invalid post ID")?;

    let cache = settings.cache()?;
    cache
        .init_partition(&key)
        .await
        .with_context(|| format!("Failed to load {}", key))?;

    let detail = PostDetail::new(cache, &settings.config);
    let outcome = detail
        .open(key, id.clone(), args.width)
        .await
        .context("Failed to load post")?;
    if outcome != OpenOutcome::Ready {
        bail!("Post {} not found", id);
    }

    let state = detail.state();
    let Some(ready) = state.ready() else {
        bail!("Post {} is no longer displayed", id);
    };

    if args.json {
        return output::json_pretty(&PostView::from(ready));
    }
    print_detail(ready);
    Ok(())
}

fn print_detail(ready: &DetailReady) {
    let view = PostView::from(ready);

    println!("{}", view.title.bold());
    println!();
    output::field("ID", view.id);
    output::field("Date", view.date);
    output::field("Notes", view.notes);
    if let Some(image) = view.image {
        output::field("Image", image);
    }
    if !view.tags.is_empty() {
        output::field("Tags", &view.tags.join(", "));
    }
    if let Some(contributor) = view.contributor {
        output::field("By", contributor);
    }
    if let Some(url) = view.url {
        output::field("URL", url);
    }
    output::field("Previous", view.prev.unwrap_or("-"));
    output::field("Next", view.next.unwrap_or("-"));
}
