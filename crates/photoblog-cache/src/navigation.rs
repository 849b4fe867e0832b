//! Previous/next derivation for the post detail view.

use tokio::runtime::Handle;
use tracing::{debug, warn};

use photoblog_core::traits::ContentGateway;
use photoblog_core::{FilterKey, PostId};

use crate::cache::PostCache;

/// Direction of a sequential navigation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// A raw navigation input from the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavInput {
    ArrowLeft,
    ArrowRight,
    /// Mouse wheel; negative deltas scroll up.
    Wheel { delta_y: f64 },
    SwipeLeft,
    SwipeRight,
    Prev,
    Next,
}

impl NavInput {
    /// The navigation step this input asks for, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            NavInput::ArrowLeft | NavInput::SwipeRight | NavInput::Prev => Some(Direction::Prev),
            NavInput::ArrowRight | NavInput::SwipeLeft | NavInput::Next => Some(Direction::Next),
            NavInput::Wheel { delta_y } if delta_y < 0.0 => Some(Direction::Prev),
            NavInput::Wheel { delta_y } if delta_y > 0.0 => Some(Direction::Next),
            NavInput::Wheel { .. } => None,
        }
    }
}

/// Neighbours of a post inside its partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjacency {
    pub prev: Option<PostId>,
    pub next: Option<PostId>,
    /// A background extension was started because the post is the last one
    /// loaded.
    pub extending: bool,
}

impl Adjacency {
    pub fn toward(&self, direction: Direction) -> Option<&PostId> {
        match direction {
            Direction::Prev => self.prev.as_ref(),
            Direction::Next => self.next.as_ref(),
        }
    }
}

/// Derives adjacency from the cache and keeps forward navigation fed.
///
/// Read-only with respect to post data. Adjacency is not pushed to callers;
/// they re-derive it whenever the partition or the current post changes.
pub struct Navigator<G> {
    cache: PostCache<G>,
}

impl<G> Clone for Navigator<G> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<G: ContentGateway + 'static> Navigator<G> {
    pub fn new(cache: PostCache<G>) -> Self {
        Self { cache }
    }

    /// Previous and next post of `id` in the partition of `key`.
    ///
    /// Locating the post is a linear scan of the loaded posts, which stay in
    /// the hundreds. When the post is the last one loaded and the server has
    /// more, an extension is spawned on the current tokio runtime; the
    /// cache's in-flight guard makes repeated triggers harmless. Unknown
    /// posts and partitions yield no neighbours.
    pub fn resolve_adjacency(&self, key: &FilterKey, id: &PostId) -> Adjacency {
        let page_size = self.cache.page_size();
        let found = self.cache.read(key, |partition| {
            let index = partition.position(id)?;
            let posts = partition.posts();
            let prev = index
                .checked_sub(1)
                .map(|i| posts[i].id_string.clone());
            let next = posts.get(index + 1).map(|post| post.id_string.clone());
            let at_end = index + 1 == posts.len();
            Some((prev, next, at_end && partition.has_more(page_size)))
        });

        let Some(Some((prev, next, wants_more))) = found else {
            debug!(key = %key, id = %id, "Post not in partition, no adjacency");
            return Adjacency::default();
        };

        let extending = wants_more && self.spawn_extend(key);
        Adjacency {
            prev,
            next,
            extending,
        }
    }

    fn spawn_extend(&self, key: &FilterKey) -> bool {
        let Ok(handle) = Handle::try_current() else {
            warn!(key = %key, "No runtime to extend partition on");
            return false;
        };

        let cache = self.cache.clone();
        let key = key.clone();
        debug!(key = %key, "Reached last loaded post, extending partition");
        handle.spawn(async move {
            if let Err(err) = cache.extend_partition(&key).await {
                warn!(key = %key, error = %err, "Background extension failed");
            }
        });
        true
    }
}
