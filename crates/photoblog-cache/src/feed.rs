//! Infinite-scroll gallery of one filter key at a time.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, instrument, warn};

use photoblog_core::error::InvariantError;
use photoblog_core::traits::ContentGateway;
use photoblog_core::{FilterKey, GalleryConfig, GalleryPolicy, Result};

use crate::cache::{ExtendOutcome, InitOutcome, PostCache};
use crate::materialize::{LoadingIndicator, Materializer, RenderUnit};

/// What the gallery should show after an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedStatus {
    /// Posts are shown and more pages exist.
    Ready,
    /// The server confirmed that nothing matches the filter.
    Empty,
    /// Every page has been loaded.
    Exhausted,
    /// The partition is still missing: a first-page fetch started elsewhere
    /// failed.
    Missing,
    /// Another key became active while fetching; the result was dropped.
    Stale,
}

/// New render units produced by a feed operation.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedUpdate {
    pub key: FilterKey,
    pub units: Vec<RenderUnit>,
    pub status: FeedStatus,
}

impl FeedUpdate {
    fn without_units(key: FilterKey, status: FeedStatus) -> Self {
        Self {
            key,
            units: Vec::new(),
            status,
        }
    }
}

/// The gallery view: one active key, fed by the shared cache.
pub struct Feed<G> {
    cache: PostCache<G>,
    materializer: Materializer<G>,
    active: Mutex<Option<FilterKey>>,
}

impl<G> Feed<G> {
    pub fn new(cache: PostCache<G>, config: &GalleryConfig) -> Self {
        let materializer = Materializer::new(cache.clone(), GalleryPolicy::from(config));
        Self {
            cache,
            materializer,
            active: Mutex::new(None),
        }
    }

    pub fn active_key(&self) -> Option<FilterKey> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cache(&self) -> &PostCache<G> {
        &self.cache
    }

    pub fn loading(&self) -> &LoadingIndicator {
        self.materializer.loading()
    }

    pub fn materializer(&self) -> &Materializer<G> {
        &self.materializer
    }

    /// Every unit shown so far for `key`.
    pub fn rendered(&self, key: &FilterKey) -> Vec<RenderUnit> {
        self.materializer.rendered(key)
    }

    fn is_active(&self, key: &FilterKey) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            == Some(key)
    }

    /// Clear the loading flag unless the active key is still fetching.
    fn settle(&self) {
        let busy = self
            .active_key()
            .is_some_and(|key| self.cache.is_fetching(&key));
        if !busy {
            self.loading().set(false);
        }
    }

    fn status(&self, key: &FilterKey) -> FeedStatus {
        let page_size = self.cache.page_size();
        self.cache
            .read(key, |partition| {
                if partition.is_confirmed_empty() {
                    FeedStatus::Empty
                } else if partition.has_more(page_size) {
                    FeedStatus::Ready
                } else {
                    FeedStatus::Exhausted
                }
            })
            .unwrap_or(FeedStatus::Missing)
    }
}

impl<G: ContentGateway> Feed<G> {
    /// Make `key` the active filter and return its units not shown yet.
    ///
    /// Showing a key whose partition is already cached costs no I/O. If
    /// another holder of the cache is already fetching the first page, the
    /// call waits for that fetch instead of issuing its own.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn show(&self, key: FilterKey, viewport_width: u32) -> Result<FeedUpdate> {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(key.clone());
        self.loading().set(true);

        let outcome = match self.cache.init_partition(&key).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.settle();
                return Err(err);
            }
        };

        if outcome == InitOutcome::InFlight {
            debug!("Partition initialization started elsewhere, waiting for it");
            self.cache.wait_idle(&key).await;
        }

        if !self.is_active(&key) {
            warn!("Filter changed while loading, discarding result");
            self.settle();
            return Ok(FeedUpdate::without_units(key, FeedStatus::Stale));
        }

        let units = self.materializer.materialize_new(&key, viewport_width);
        let status = self.status(&key);
        debug!(units = units.len(), ?status, "Feed updated");
        Ok(FeedUpdate { key, units, status })
    }

    /// Load the next page of the active key, if the server has one.
    ///
    /// An extension already started elsewhere, e.g. by the navigator, is
    /// waited for and its posts are returned here.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError::NoActiveFeed`] before the first
    /// [`show`](Self::show).
    #[instrument(skip(self))]
    pub async fn load_more(&self, viewport_width: u32) -> Result<FeedUpdate> {
        let Some(key) = self.active_key() else {
            return Err(InvariantError::NoActiveFeed.into());
        };
        if !self.cache.contains(&key) {
            return self.show(key, viewport_width).await;
        }
        if !self.cache.has_more(&key) {
            let status = self.status(&key);
            return Ok(FeedUpdate::without_units(key, status));
        }

        self.loading().set(true);
        let outcome = match self.cache.extend_partition(&key).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.settle();
                return Err(err);
            }
        };

        if outcome == ExtendOutcome::InFlight {
            debug!(key = %key, "Partition extension started elsewhere, waiting for it");
            self.cache.wait_idle(&key).await;
        }

        if !self.is_active(&key) {
            warn!(key = %key, "Filter changed while loading more, discarding result");
            self.settle();
            return Ok(FeedUpdate::without_units(key, FeedStatus::Stale));
        }

        let units = self.materializer.materialize_new(&key, viewport_width);
        let status = self.status(&key);
        debug!(key = %key, units = units.len(), ?status, "Feed extended");
        Ok(FeedUpdate { key, units, status })
    }
}
