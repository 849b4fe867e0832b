//! Post detail view lifecycle.
//!
//! ```text
//! Idle -> Resolving -> Ready -> (Navigating -> Resolving)* -> Idle
//!              |
//!              +-> Unavailable | Failed
//! ```
//!
//! Every [`PostDetail::open`] starts a new generation. A lookup that
//! completes after a newer open, or after [`PostDetail::close`], is dropped
//! instead of overwriting the newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use photoblog_core::traits::ContentGateway;
use photoblog_core::{
    Contributor, DetailPolicy, FilterKey, GalleryConfig, PhotoVariant, Post, PostId, Result,
};

use crate::cache::PostCache;
use crate::debounce::Debounce;
use crate::navigation::{Adjacency, Direction, NavInput, Navigator};

/// A resolved post, ready to display.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailReady {
    /// Partition the post is browsed in.
    pub key: FilterKey,
    pub post: Post,
    pub adjacency: Adjacency,
    pub image: Option<PhotoVariant>,
    /// Upper-cased summary.
    pub title: String,
    /// Long-form publication date; empty if the timestamp is out of range.
    pub date: String,
    pub contributor: Option<Contributor>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Resolving {
        key: FilterKey,
        id: PostId,
    },
    Ready(Box<DetailReady>),
    Navigating {
        from: PostId,
        to: PostId,
    },
    /// The post does not exist.
    Unavailable {
        id: PostId,
    },
    /// The lookup failed; opening the post again retries it.
    Failed {
        id: PostId,
        message: String,
    },
}

impl DetailState {
    pub fn ready(&self) -> Option<&DetailReady> {
        match self {
            DetailState::Ready(ready) => Some(ready),
            _ => None,
        }
    }
}

/// Result of [`PostDetail::open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    Ready,
    Unavailable,
    /// A newer open or a close happened while resolving.
    Superseded,
}

/// Result of [`PostDetail::navigate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigateOutcome {
    Opened(OpenOutcome),
    /// Arrived within the debounce window of the previous step.
    Debounced,
    /// No neighbour in that direction.
    AtEdge,
    /// Nothing is displayed yet.
    NotReady,
    /// The input does not map to a direction.
    Ignored,
}

/// The detail view of one post at a time.
pub struct PostDetail<G> {
    cache: PostCache<G>,
    navigator: Navigator<G>,
    policy: DetailPolicy,
    contributors: Vec<Contributor>,
    generation: AtomicU64,
    debounce: Mutex<Debounce>,
    state: watch::Sender<DetailState>,
}

impl<G: ContentGateway + 'static> PostDetail<G> {
    pub fn new(cache: PostCache<G>, config: &GalleryConfig) -> Self {
        let (state, _) = watch::channel(DetailState::Idle);
        Self {
            navigator: Navigator::new(cache.clone()),
            cache,
            policy: DetailPolicy::from(config),
            contributors: config.contributors.clone(),
            generation: AtomicU64::new(0),
            debounce: Mutex::new(Debounce::new(config.navigation_debounce())),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Resolve `id` within the partition of `key` and display it.
    ///
    /// A post cached in the partition resolves without I/O; otherwise it is
    /// fetched directly. Not-found ends in [`DetailState::Unavailable`],
    /// failures in [`DetailState::Failed`] and are returned to the caller.
    #[instrument(skip(self), fields(key = %key, id = %id))]
    pub async fn open(
        &self,
        key: FilterKey,
        id: PostId,
        viewport_width: u32,
    ) -> Result<OpenOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(DetailState::Resolving {
            key: key.clone(),
            id: id.clone(),
        });

        let post = match self.cache.get_post_by_id(&key, &id).await {
            Ok(Some(post)) => post,
            Ok(None) => {
                debug!("Post not found");
                let unavailable = DetailState::Unavailable { id };
                return Ok(self.finish(generation, unavailable, OpenOutcome::Unavailable));
            }
            Err(err) => {
                let failed = DetailState::Failed {
                    id,
                    message: err.to_string(),
                };
                if self.apply(generation, failed) {
                    return Err(err);
                }
                return Ok(OpenOutcome::Superseded);
            }
        };

        if !self.is_current(generation) {
            warn!("Detail lookup superseded, discarding");
            return Ok(OpenOutcome::Superseded);
        }

        let ready = DetailState::Ready(Box::new(self.build_ready(key, post, viewport_width)));
        Ok(self.finish(generation, ready, OpenOutcome::Ready))
    }

    /// Step to the previous or next post of the partition.
    #[instrument(skip(self))]
    pub async fn navigate(
        &self,
        direction: Direction,
        viewport_width: u32,
    ) -> Result<NavigateOutcome> {
        let Some((key, from)) = self.displayed() else {
            return Ok(NavigateOutcome::NotReady);
        };

        let accepted = self
            .debounce
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_acquire(Instant::now());
        if !accepted {
            debug!("Navigation input debounced");
            return Ok(NavigateOutcome::Debounced);
        }

        let adjacency = self.navigator.resolve_adjacency(&key, &from);
        let Some(to) = adjacency.toward(direction).cloned() else {
            debug!(id = %from, "No neighbour in that direction");
            return Ok(NavigateOutcome::AtEdge);
        };

        self.state.send_replace(DetailState::Navigating {
            from,
            to: to.clone(),
        });
        self.open(key, to, viewport_width)
            .await
            .map(NavigateOutcome::Opened)
    }

    /// Navigate in response to a raw viewer input.
    pub async fn handle_input(
        &self,
        input: NavInput,
        viewport_width: u32,
    ) -> Result<NavigateOutcome> {
        match input.direction() {
            Some(direction) => self.navigate(direction, viewport_width).await,
            None => Ok(NavigateOutcome::Ignored),
        }
    }

    /// Re-derive prev/next of the displayed post, e.g. after the partition
    /// grew.
    pub fn refresh_adjacency(&self) -> Option<Adjacency> {
        let (key, id) = self.displayed()?;
        let adjacency = self.navigator.resolve_adjacency(&key, &id);

        let mut refreshed = None;
        self.state.send_if_modified(|state| match state {
            DetailState::Ready(ready) if ready.post.id_string == id => {
                refreshed = Some(adjacency.clone());
                if ready.adjacency == adjacency {
                    return false;
                }
                ready.adjacency = adjacency;
                true
            }
            _ => false,
        });
        refreshed
    }

    /// Re-resolve the displayed image for a new viewport width.
    pub fn resize(&self, viewport_width: u32) {
        let policy = self.policy;
        self.state.send_if_modified(|state| {
            let DetailState::Ready(ready) = state else {
                return false;
            };
            let image = policy.resolve(&ready.post.variants, viewport_width).cloned();
            if ready.image == image {
                return false;
            }
            ready.image = image;
            true
        });
    }

    /// Leave the detail view. Cached partitions are kept.
    pub fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.debounce
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
        self.state.send_replace(DetailState::Idle);
    }

    /// Key and id of the displayed post.
    fn displayed(&self) -> Option<(FilterKey, PostId)> {
        self.state
            .borrow()
            .ready()
            .map(|ready| (ready.key.clone(), ready.post.id_string.clone()))
    }

    fn build_ready(&self, key: FilterKey, post: Post, viewport_width: u32) -> DetailReady {
        let adjacency = self.navigator.resolve_adjacency(&key, &post.id_string);
        DetailReady {
            image: self.policy.resolve(&post.variants, viewport_width).cloned(),
            title: post.summary.to_uppercase(),
            date: post.formatted_date().unwrap_or_default(),
            contributor: Contributor::find_for(&self.contributors, &post).cloned(),
            key,
            adjacency,
            post,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Publish `state` if `generation` is still current.
    fn apply(&self, generation: u64, state: DetailState) -> bool {
        self.state.send_if_modified(|current| {
            if !self.is_current(generation) {
                return false;
            }
            *current = state;
            true
        })
    }

    fn finish(&self, generation: u64, state: DetailState, outcome: OpenOutcome) -> OpenOutcome {
        if self.apply(generation, state) {
            outcome
        } else {
            warn!("Detail lookup superseded, discarding");
            OpenOutcome::Superseded
        }
    }
}
