//! Content gateway trait.

use async_trait::async_trait;

use crate::Result;
use crate::types::{FilterKey, Post, PostId, PostsPage};

/// Paged access to the posts of a blog.
///
/// The cache is the only consumer; every call is a suspension point and
/// nothing else in the cache suspends.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// List one page of posts.
    ///
    /// `cursor` is a zero-based item offset. The returned `total` is the
    /// server's count of every post matching `filter`, independent of
    /// `page_size`.
    async fn list_posts(
        &self,
        filter: &FilterKey,
        cursor: u32,
        page_size: u32,
    ) -> Result<PostsPage>;

    /// Fetch a single post by id.
    ///
    /// Returns `Ok(None)` when the id does not exist.
    async fn get_post(&self, id: &PostId) -> Result<Option<Post>>;
}
