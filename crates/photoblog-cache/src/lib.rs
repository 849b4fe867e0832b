//! photoblog-cache - Session state shared by the gallery views.
//!
//! This crate holds the [`PostCache`], the single shared mutable resource of
//! a browsing session, and the views that read it:
//!
//! - [`Navigator`] derives previous/next posts and keeps the partition fed
//! - [`Materializer`] turns newly cached posts into render units
//! - [`Feed`] drives the infinite-scroll gallery of one filter key
//! - [`PostDetail`] runs the detail view lifecycle
//!
//! # Example
//!
//! ```no_run
//! use photoblog_cache::{Feed, PostCache};
//! use photoblog_core::{ContentGateway, FilterKey, GalleryConfig};
//!
//! async fn first_page<G: ContentGateway + 'static>(gateway: G) -> photoblog_core::Result<()> {
//!     let config = GalleryConfig::default();
//!     let cache = PostCache::with_config(gateway, &config)?;
//!     let feed = Feed::new(cache, &config);
//!
//!     let update = feed.show(FilterKey::tag("landscape"), 1920).await?;
//!     for unit in &update.units {
//!         println!("{} {:?}", unit.post_id, unit.image.as_ref().map(|i| &i.url));
//!     }
//!     Ok(())
//! }
//! ```

mod cache;
mod debounce;
mod detail;
mod feed;
mod materialize;
mod navigation;

pub use cache::{CacheEvent, ExtendOutcome, InitOutcome, Partition, PostCache};
pub use debounce::Debounce;
pub use detail::{DetailReady, DetailState, NavigateOutcome, OpenOutcome, PostDetail};
pub use feed::{Feed, FeedStatus, FeedUpdate};
pub use materialize::{LoadingIndicator, Materializer, RenderUnit};
pub use navigation::{Adjacency, Direction, NavInput, Navigator};
