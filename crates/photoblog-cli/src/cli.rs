//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{feed, info, post, walk};

/// Browse a photo blog from the terminal.
#[derive(Parser, Debug)]
#[command(name = "photoblog")]
#[command(author, version = env!("PHOTOBLOG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Path to a JSON config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Blog API base URL, e.g. https://api.tumblr.com/v2/blog/NAME
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List gallery tiles of the feed or a tag
    Feed(feed::FeedArgs),

    /// Show one post with its neighbours
    Post(post::PostArgs),

    /// Step through posts starting at one
    Walk(walk::WalkArgs),

    /// Show blog metadata
    Info(info::InfoArgs),
}
