//! Blog API endpoint definitions and wire types.

use serde::{Deserialize, Serialize};

use photoblog_core::{BlogInfo, PhotoVariant, Post, PostId, PostKind, Result};

/// Post listing and lookup.
pub const POSTS: &str = "posts";

/// Blog metadata.
pub const INFO: &str = "info";

/// Query parameters for a post listing.
#[derive(Debug, Serialize)]
pub struct ListPostsQuery<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Query parameters for a single post.
#[derive(Debug, Serialize)]
pub struct GetPostQuery<'a> {
    pub id: &'a str,
    pub notes_info: bool,
}

/// Endpoints that take no parameters besides the API key.
#[derive(Debug, Serialize)]
pub struct NoParams {}

/// Every response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: T,
}

/// Status block of the envelope; the HTTP status already carries the code.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub msg: String,
}

/// Envelope of a failed request; `response` is usually an empty array.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Response of the posts endpoint.
#[derive(Debug, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub posts: Vec<PostEntry>,
    #[serde(default)]
    pub total_posts: u32,
}

/// Response of the info endpoint.
#[derive(Debug, Deserialize)]
pub struct InfoResponse {
    pub blog: BlogInfo,
}

/// A single post as the API reports it.
#[derive(Debug, Deserialize)]
pub struct PostEntry {
    pub id: u64,
    #[serde(default)]
    pub id_string: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note_count: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
}

/// One photo of a photo post.
#[derive(Debug, Deserialize)]
pub struct PhotoEntry {
    #[serde(default)]
    pub original_size: Option<SizeEntry>,
    #[serde(default)]
    pub alt_sizes: Vec<SizeEntry>,
}

/// One size of a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct SizeEntry {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

impl PostEntry {
    /// Normalize into the core model.
    ///
    /// Only the first photo is shown, so only its sizes become variants.
    pub fn into_post(self) -> Result<Post> {
        let id_string = match self.id_string {
            Some(id) => PostId::new(id)?,
            None => PostId::from(self.id),
        };

        let mut variants: Vec<PhotoVariant> = self
            .photos
            .into_iter()
            .next()
            .map(|photo| {
                let mut sizes = photo.alt_sizes;
                if sizes.is_empty() {
                    sizes.extend(photo.original_size);
                }
                sizes
            })
            .unwrap_or_default()
            .into_iter()
            .map(|size| PhotoVariant {
                width: size.width,
                height: size.height,
                url: size.url,
            })
            .collect();
        variants.sort_by(|a, b| b.width.cmp(&a.width));

        Ok(Post {
            id: self.id,
            id_string,
            timestamp: self.timestamp,
            summary: self.summary,
            caption: self.caption,
            tags: self.tags,
            note_count: self.note_count,
            kind: PostKind::from(self.kind),
            post_url: self.post_url,
            variants,
        })
    }
}
