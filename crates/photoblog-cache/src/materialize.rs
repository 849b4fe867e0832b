//! Incremental conversion of cached posts into render units.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, instrument};

use photoblog_core::{FilterKey, GalleryPolicy, PhotoVariant, PostId};

use crate::cache::PostCache;

/// One gallery tile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderUnit {
    /// Position of the post in its partition.
    pub index: usize,
    pub post_id: PostId,
    pub tags: Vec<String>,
    pub summary: String,
    /// Resolved image source; `None` if the post has no variants.
    pub image: Option<PhotoVariant>,
}

/// A shared "loading" flag.
///
/// Writers only publish actual changes, so a batch that raises the flag
/// several times still produces a single true to false transition.
#[derive(Clone, Debug)]
pub struct LoadingIndicator {
    flag: Arc<watch::Sender<bool>>,
    completed: Arc<AtomicU64>,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, loading: bool) {
        let changed = self.flag.send_if_modified(|current| {
            if *current == loading {
                return false;
            }
            *current = loading;
            true
        });
        if changed && !loading {
            self.completed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.flag.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    /// Number of true to false transitions so far.
    pub fn transitions(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct MaterializedSet {
    /// Posts scanned so far, rendered or skipped.
    seen: usize,
    units: Vec<RenderUnit>,
}

/// Tracks, per filter key, which cached posts already became render units.
pub struct Materializer<G> {
    cache: PostCache<G>,
    policy: GalleryPolicy,
    sets: Mutex<HashMap<FilterKey, MaterializedSet>>,
    loading: LoadingIndicator,
}

impl<G> Materializer<G> {
    pub fn new(cache: PostCache<G>, policy: GalleryPolicy) -> Self {
        Self {
            cache,
            policy,
            sets: Mutex::new(HashMap::new()),
            loading: LoadingIndicator::new(),
        }
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    /// Render the posts appended to `key` since the previous call.
    ///
    /// Non-photo posts are counted as seen without producing a unit, so they
    /// are never scanned again. Previously emitted units are neither
    /// repeated nor reordered. Returns nothing while the partition does not
    /// exist.
    #[instrument(skip(self), fields(key = %key))]
    pub fn materialize_new(&self, key: &FilterKey, viewport_width: u32) -> Vec<RenderUnit> {
        self.loading.set(true);

        let mut sets = self.sets.lock().unwrap_or_else(PoisonError::into_inner);
        let set = sets.entry(key.clone()).or_default();
        let start = set.seen;

        let batch = self
            .cache
            .read(key, |partition| {
                let posts = partition.posts();
                let units: Vec<RenderUnit> = posts
                    .iter()
                    .enumerate()
                    .skip(start)
                    .filter(|(_, post)| post.is_photo())
                    .map(|(index, post)| RenderUnit {
                        index,
                        post_id: post.id_string.clone(),
                        tags: post.tags.clone(),
                        summary: post.summary.clone(),
                        image: self.policy.resolve(&post.variants, viewport_width).cloned(),
                    })
                    .collect();
                (posts.len().max(start), units)
            });

        let units = match batch {
            Some((seen, units)) => {
                debug!(
                    scanned = seen - start,
                    rendered = units.len(),
                    "Materialized new posts"
                );
                set.seen = seen;
                set.units.extend(units.iter().cloned());
                units
            }
            None => Vec::new(),
        };
        drop(sets);

        if !self.cache.is_fetching(key) {
            self.loading.set(false);
        }
        units
    }

    /// Every unit emitted for `key`, in emission order.
    pub fn rendered(&self, key: &FilterKey) -> Vec<RenderUnit> {
        self.sets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|set| set.units.clone())
            .unwrap_or_default()
    }

    /// Number of posts of `key` scanned so far.
    pub fn materialized_count(&self, key: &FilterKey) -> usize {
        self.sets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(0, |set| set.seen)
    }
}
