//! Walk command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use photoblog_cache::{
    DetailReady, Direction, ExtendOutcome, NavigateOutcome, OpenOutcome, PostCache, PostDetail,
};
use photoblog_core::traits::ContentGateway;
use photoblog_core::{FilterKey, PostId};

use crate::output;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Post ID to start from
    pub id: String,

    /// Tag to walk through
    #[arg(long)]
    pub tag: Option<String>,

    /// Number of steps to take
    #[arg(long, default_value_t = 5)]
    pub steps: u32,

    /// Walk towards newer posts instead of older ones
    #[arg(long)]
    pub prev: bool,

    /// Viewport width used to pick image sizes
    #[arg(long, default_value_t = 1280)]
    pub width: u32,
}

pub async fn run(args: WalkArgs, settings: &Settings) -> Result<()> {
    let key = FilterKey::from(args.tag.as_deref());
    let id = PostId::new(&args.id).context("Invalid post ID")?;
    let direction = if args.prev {
        Direction::Prev
    } else {
        Direction::Next
    };
    let pause = settings.config.navigation_debounce();

    let cache = settings.cache()?;
    cache
        .init_partition(&key)
        .await
        .with_context(|| format!("Failed to load {}", key))?;

    let detail = PostDetail::new(cache.clone(), &settings.config);
    let outcome = detail
        .open(key.clone(), id.clone(), args.width)
        .await
        .context("Failed to load post")?;
    if outcome != OpenOutcome::Ready {
        bail!("Post {} not found", id);
    }
    print_step(detail.state().ready(), 0);

    for step in 1..=args.steps {
        // Steps closer together than the debounce window would be dropped.
        tokio::time::sleep(pause).await;
        let mut outcome = detail.navigate(direction, args.width).await?;

        if outcome == NavigateOutcome::AtEdge && direction == Direction::Next {
            wait_for_more(&cache, &key).await?;
            tokio::time::sleep(pause).await;
            outcome = detail.navigate(direction, args.width).await?;
        }

        match outcome {
            NavigateOutcome::Opened(OpenOutcome::Ready) => {
                print_step(detail.state().ready(), step)
            }
            NavigateOutcome::AtEdge => {
                output::note("No more posts in this direction.");
                break;
            }
            other => bail!("Navigation stopped: {:?}", other),
        }
    }

    Ok(())
}

/// Make sure the page after the loaded posts has been fetched, if any.
async fn wait_for_more<G: ContentGateway>(cache: &PostCache<G>, key: &FilterKey) -> Result<()> {
    let outcome = cache
        .extend_partition(key)
        .await
        .with_context(|| format!("Failed to load more of {}", key))?;
    if outcome == ExtendOutcome::InFlight {
        cache.wait_idle(key).await;
    }
    Ok(())
}

fn print_step(ready: Option<&DetailReady>, step: u32) {
    let Some(ready) = ready else {
        return;
    };
    println!(
        "{:>3} {} {} {}",
        step,
        ready.post.id_string.as_str().bold(),
        ready.date.dimmed(),
        ready.title
    );
}
