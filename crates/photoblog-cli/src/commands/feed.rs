//! Feed command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use photoblog_cache::{Feed, FeedStatus, FeedUpdate, RenderUnit};
use photoblog_core::FilterKey;

use crate::output;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Only show posts with this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Viewport width used to pick image sizes
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Print one JSON object per tile
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: FeedArgs, settings: &Settings) -> Result<()> {
    let key = FilterKey::from(args.tag.as_deref());
    let feed = Feed::new(settings.cache()?, &settings.config);

    let mut update = feed
        .show(key.clone(), args.width)
        .await
        .with_context(|| format!("Failed to load {}", key))?;
    print_units(&update, args.json)?;

    for _ in 1..args.pages {
        if update.status != FeedStatus::Ready {
            break;
        }
        update = feed
            .load_more(args.width)
            .await
            .with_context(|| format!("Failed to load more of {}", key))?;
        print_units(&update, args.json)?;
    }

    let shown = feed.rendered(&key).len();
    match update.status {
        FeedStatus::Empty => output::note("No posts found."),
        FeedStatus::Exhausted => output::note(&format!("{} posts, all loaded.", shown)),
        _ => output::note(&format!("{} posts, more available.", shown)),
    }

    Ok(())
}

fn print_units(update: &FeedUpdate, json: bool) -> Result<()> {
    for unit in &update.units {
        if json {
            output::json(unit)?;
        } else {
            print_unit(unit);
        }
    }
    Ok(())
}

fn print_unit(unit: &RenderUnit) {
    let image = unit
        .image
        .as_ref()
        .map_or_else(|| "-".to_string(), |image| image.url.clone());
    let tags = unit
        .tags
        .iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{:>4} {} {} {}",
        unit.index,
        unit.post_id.as_str().bold(),
        image,
        tags.dimmed()
    );
}
