//! Blog level metadata.

use serde::{Deserialize, Serialize};

use super::Post;

/// Metadata of the blog behind the API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogInfo {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub total_posts: u32,
    /// Unix timestamp of the last update.
    #[serde(default)]
    pub updated: i64,
}

/// A person credited for posts carrying their tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub tag: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Contributor {
    /// First contributor, in configured order, whose tag the post carries.
    pub fn find_for<'a>(contributors: &'a [Contributor], post: &Post) -> Option<&'a Contributor> {
        contributors.iter().find(|c| post.has_tag(&c.tag))
    }
}
