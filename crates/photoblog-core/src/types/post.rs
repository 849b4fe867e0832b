//! Post types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// The string form of a post identifier.
///
/// Post identity is always compared through this type; the numeric id on
/// [`Post`] is informational.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(String);

impl PostId {
    /// Create a new post id, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or contains characters that cannot
    /// appear in a query parameter value unescaped.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return Err(InvalidInputError::PostId {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(InvalidInputError::PostId {
                value: s.to_string(),
                reason: format!("contains invalid character '{}'", c),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PostId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PostId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PostId> for String {
    fn from(value: PostId) -> Self {
        value.0
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// The type of a post. Only photo posts are rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostKind {
    Photo,
    Other(String),
}

impl From<String> for PostKind {
    fn from(value: String) -> Self {
        if value == "photo" {
            PostKind::Photo
        } else {
            PostKind::Other(value)
        }
    }
}

impl From<PostKind> for String {
    fn from(value: PostKind) -> Self {
        match value {
            PostKind::Photo => "photo".to_string(),
            PostKind::Other(kind) => kind,
        }
    }
}

/// One available size of a post's image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoVariant {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// A post of the blog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Numeric id as reported by the API.
    pub id: u64,
    /// String id, the identity of the post.
    pub id_string: PostId,
    /// Unix timestamp of publication.
    pub timestamp: i64,
    pub summary: String,
    pub caption: String,
    /// Tags in the order the author gave them.
    pub tags: Vec<String>,
    pub note_count: u64,
    pub kind: PostKind,
    pub post_url: Option<String>,
    /// Image variants, largest first.
    pub variants: Vec<PhotoVariant>,
}

impl Post {
    /// Returns true if this post is rendered in the gallery.
    pub fn is_photo(&self) -> bool {
        self.kind == PostKind::Photo
    }

    /// Publication time, if the timestamp is representable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Publication date in long form, e.g. "March 4, 2021".
    pub fn formatted_date(&self) -> Option<String> {
        self.published_at()
            .map(|at| at.format("%B %-d, %Y").to_string())
    }

    /// Returns true if the post carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// One page of a post listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostsPage {
    /// The posts on this page, in server order.
    pub items: Vec<Post>,
    /// Number of posts matching the filter on the server.
    pub total: u32,
}
