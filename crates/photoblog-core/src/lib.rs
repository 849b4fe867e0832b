//! photoblog-core - Core types and traits for the photoblog client.

pub mod config;
pub mod error;
pub mod media;
pub mod traits;
pub mod types;

pub use config::{Breakpoints, GalleryConfig};
pub use error::Error;
pub use media::{DetailPolicy, GalleryPolicy};
pub use traits::ContentGateway;
pub use types::{
    ApiUrl, BlogInfo, Contributor, FilterKey, PhotoVariant, Post, PostId, PostKind, PostsPage,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
