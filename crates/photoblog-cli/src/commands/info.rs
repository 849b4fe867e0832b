//! Info command implementation.

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::Args;

use crate::output;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Print the blog info as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: InfoArgs, settings: &Settings) -> Result<()> {
    let info = settings
        .gateway()?
        .blog_info()
        .await
        .context("Failed to fetch blog info")?;

    if args.json {
        return output::json_pretty(&info);
    }

    output::field("Title", &info.title);
    output::field("Name", &info.name);
    output::field("URL", &info.url);
    output::field("Posts", info.total_posts);
    if let Some(updated) = DateTime::from_timestamp(info.updated, 0) {
        output::field("Updated", updated.format("%B %-d, %Y"));
    }
    if !info.description.is_empty() {
        println!();
        println!("{}", info.description);
    }

    Ok(())
}
