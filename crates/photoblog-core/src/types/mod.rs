//! Core photoblog types.
//!
//! Identifiers and URLs are validated at construction time.

mod api_url;
mod blog;
mod filter_key;
mod post;

pub use api_url::ApiUrl;
pub use blog::{BlogInfo, Contributor};
pub use filter_key::FilterKey;
pub use post::{PhotoVariant, Post, PostId, PostKind, PostsPage};
