//! Partition filter key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a partition of the post cache.
///
/// `Default` is the unfiltered feed; `Tag` holds posts carrying one tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum FilterKey {
    #[default]
    Default,
    Tag(String),
}

impl FilterKey {
    /// Create a key for a tag; blank tags map to the default feed.
    pub fn tag(tag: impl AsRef<str>) -> Self {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            FilterKey::Default
        } else {
            FilterKey::Tag(tag.to_string())
        }
    }

    /// Returns the tag, or `None` for the unfiltered feed.
    pub fn as_tag(&self) -> Option<&str> {
        match self {
            FilterKey::Default => None,
            FilterKey::Tag(tag) => Some(tag),
        }
    }
}

impl From<Option<&str>> for FilterKey {
    fn from(value: Option<&str>) -> Self {
        value.map_or(FilterKey::Default, FilterKey::tag)
    }
}

impl From<Option<String>> for FilterKey {
    fn from(value: Option<String>) -> Self {
        FilterKey::from(value.as_deref())
    }
}

impl From<FilterKey> for Option<String> {
    fn from(value: FilterKey) -> Self {
        match value {
            FilterKey::Default => None,
            FilterKey::Tag(tag) => Some(tag),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKey::Default => f.write_str("/"),
            FilterKey::Tag(tag) => write!(f, "#{}", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tags_are_default() {
        assert_eq!(FilterKey::from(None::<&str>), FilterKey::Default);
        assert_eq!(FilterKey::from(Some("  ")), FilterKey::Default);
        assert_eq!(FilterKey::tag(" cats "), FilterKey::Tag("cats".into()));
    }

    #[test]
    fn display() {
        assert_eq!(FilterKey::Default.to_string(), "/");
        assert_eq!(FilterKey::tag("cats").to_string(), "#cats");
    }
}
