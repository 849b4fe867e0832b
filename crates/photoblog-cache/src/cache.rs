//! Tag-partitioned pagination cache.
//!
//! Every filter key owns one [`Partition`]: the posts fetched so far in
//! arrival order, the cursor of the last successful fetch and the total the
//! server reported. Partitions are created on first request and live for the
//! whole session.
//!
//! The partition map sits behind a lock that is never held across an await;
//! the gateway calls are the only suspension points. At most one
//! initialization and one extension per key are in flight at any time.

use std::collections::{HashMap, HashSet};
use std::pin::pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{Notify, broadcast};
use tracing::{debug, error, instrument, warn};

use photoblog_core::error::{InvalidInputError, InvariantError};
use photoblog_core::traits::ContentGateway;
use photoblog_core::{FilterKey, GalleryConfig, Post, PostId, PostsPage, Result};

/// Capacity of the event channel; slow subscribers observe `Lagged`.
const EVENT_CAPACITY: usize = 64;

/// The cached posts of one filter key.
#[derive(Clone, Debug, Default)]
pub struct Partition {
    posts: Vec<Post>,
    ids: HashSet<PostId>,
    offset: u32,
    total: u32,
}

impl Partition {
    fn from_page(page: PostsPage) -> Self {
        let mut partition = Partition::default();
        partition.append(page, 0);
        partition
    }

    /// Append the posts not yet present and advance the cursor.
    ///
    /// Returns the number of posts added.
    fn append(&mut self, page: PostsPage, cursor: u32) -> usize {
        let before = self.posts.len();
        for post in page.items {
            if self.ids.insert(post.id_string.clone()) {
                self.posts.push(post);
            }
        }
        self.offset = cursor;
        self.total = page.total.max(self.posts.len() as u32);
        self.posts.len() - before
    }

    /// Posts in arrival order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Cursor used by the most recent successful fetch.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Server-reported number of posts matching the filter.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// True once the server confirmed that nothing matches the filter.
    pub fn is_confirmed_empty(&self) -> bool {
        self.total == 0 && self.posts.is_empty()
    }

    pub fn contains(&self, id: &PostId) -> bool {
        self.ids.contains(id)
    }

    /// Index of a post; a linear scan over the loaded posts.
    pub fn position(&self, id: &PostId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.posts.iter().position(|post| &post.id_string == id)
    }

    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.position(id).map(|index| &self.posts[index])
    }

    /// Cursor of the page after the current one.
    pub fn next_cursor(&self, page_size: u32) -> u32 {
        self.offset.saturating_add(page_size)
    }

    /// True while the server total says another page exists.
    pub fn has_more(&self, page_size: u32) -> bool {
        u64::from(self.total) >= u64::from(self.offset) + u64::from(page_size)
    }
}

/// Result of [`PostCache::init_partition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// The first page was fetched and the partition created.
    Created { len: usize, total: u32 },
    /// The partition already existed; nothing was fetched.
    Existing,
    /// Another initialization of the same key is in flight.
    InFlight,
}

/// Result of [`PostCache::extend_partition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// The next page was fetched and its new posts appended.
    Appended { added: usize, offset: u32 },
    /// The server total says there are no more pages; nothing was fetched.
    Exhausted,
    /// Another extension of the same key is in flight.
    InFlight,
    /// The partition moved on while the page was fetched; it was discarded.
    Stale,
}

/// Changes published to cache subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    PartitionCreated {
        key: FilterKey,
        len: usize,
        total: u32,
    },
    PartitionExtended {
        key: FilterKey,
        added: usize,
        offset: u32,
    },
}

#[derive(Debug, Default)]
struct CacheState {
    partitions: HashMap<FilterKey, Partition>,
    initializing: HashSet<FilterKey>,
    extending: HashSet<FilterKey>,
}

#[derive(Clone, Copy, Debug)]
enum Flight {
    Init,
    Extend,
}

/// Clears an in-flight mark when the fetch finishes, fails or is dropped,
/// then wakes [`PostCache::wait_idle`] callers.
struct FlightGuard<'a> {
    state: &'a RwLock<CacheState>,
    landed: &'a Notify,
    key: FilterKey,
    flight: Flight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match self.flight {
                Flight::Init => state.initializing.remove(&self.key),
                Flight::Extend => state.extending.remove(&self.key),
            };
        }
        self.landed.notify_waiters();
    }
}

struct CacheInner<G> {
    gateway: G,
    page_size: u32,
    state: RwLock<CacheState>,
    events: broadcast::Sender<CacheEvent>,
    landed: Notify,
}

/// Session-wide cache of post partitions.
///
/// `PostCache` is a cheap handle: clones share the same partitions. Views
/// receive it by injection and subscribe to [`CacheEvent`]s instead of
/// polling.
pub struct PostCache<G> {
    inner: Arc<CacheInner<G>>,
}

impl<G> Clone for PostCache<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G> PostCache<G> {
    /// Create an empty cache fetching `page_size` posts per page.
    pub fn new(gateway: G, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(InvalidInputError::Config {
                field: "page_size",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(CacheInner {
                gateway,
                page_size,
                state: RwLock::new(CacheState::default()),
                events,
                landed: Notify::new(),
            }),
        })
    }

    /// Create a cache using the configured page size.
    pub fn with_config(gateway: G, config: &GalleryConfig) -> Result<Self> {
        Self::new(gateway, config.page_size)
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    /// Subscribe to partition changes.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Run `f` against a partition, if it exists.
    pub fn read<R>(&self, key: &FilterKey, f: impl FnOnce(&Partition) -> R) -> Option<R> {
        self.read_state().partitions.get(key).map(f)
    }

    /// Copy of a partition, if it exists.
    pub fn snapshot(&self, key: &FilterKey) -> Option<Partition> {
        self.read(key, Partition::clone)
    }

    pub fn contains(&self, key: &FilterKey) -> bool {
        self.read_state().partitions.contains_key(key)
    }

    /// True while the partition exists and another page is known to exist.
    pub fn has_more(&self, key: &FilterKey) -> bool {
        let page_size = self.inner.page_size;
        self.read(key, |partition| partition.has_more(page_size))
            .unwrap_or(false)
    }

    /// True while an initialization or extension of `key` is in flight.
    pub fn is_fetching(&self, key: &FilterKey) -> bool {
        let state = self.read_state();
        state.initializing.contains(key) || state.extending.contains(key)
    }

    /// Wait until no initialization or extension of `key` is in flight.
    ///
    /// Returns at once when nothing is in flight. Fetches started by other
    /// holders of the cache are waited for whether they succeed, fail or
    /// are dropped.
    pub async fn wait_idle(&self, key: &FilterKey) {
        loop {
            let mut landed = pin!(self.inner.landed.notified());
            // Register before checking, so a fetch landing in between still
            // wakes us.
            landed.as_mut().enable();
            if !self.is_fetching(key) {
                return;
            }
            landed.await;
        }
    }

    /// Look a post up in a partition without any I/O.
    pub fn cached_post(&self, key: &FilterKey, id: &PostId) -> Option<Post> {
        self.read(key, |partition| partition.get(id).cloned())
            .flatten()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: CacheEvent) {
        // No subscribers is not an error.
        let _ = self.inner.events.send(event);
    }
}

impl<G: ContentGateway> PostCache<G> {
    /// Fetch the first page of `key` unless its partition already exists.
    ///
    /// An empty result still creates a partition with `total = 0`, so a
    /// confirmed empty filter can be told apart from one never requested. On
    /// failure no partition is created.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn init_partition(&self, key: &FilterKey) -> Result<InitOutcome> {
        let _guard = {
            let mut state = self.write_state();
            if state.partitions.contains_key(key) {
                debug!("Partition already cached");
                return Ok(InitOutcome::Existing);
            }
            if !state.initializing.insert(key.clone()) {
                debug!("Partition initialization already in flight");
                return Ok(InitOutcome::InFlight);
            }
            FlightGuard {
                state: &self.inner.state,
                landed: &self.inner.landed,
                key: key.clone(),
                flight: Flight::Init,
            }
        };

        let page = self
            .inner
            .gateway
            .list_posts(key, 0, self.inner.page_size)
            .await
            .inspect_err(|err| warn!(error = %err, "Failed to fetch first page"))?;

        let reported = page.total;
        let partition = Partition::from_page(page);
        let (len, total) = (partition.len(), partition.total());
        if total != reported {
            warn!(reported, len, "Server total below loaded posts, clamping");
        }

        self.write_state().partitions.insert(key.clone(), partition);
        debug!(len, total, "Partition created");

        self.publish(CacheEvent::PartitionCreated {
            key: key.clone(),
            len,
            total,
        });
        Ok(InitOutcome::Created { len, total })
    }

    /// Fetch the next page of `key` and append its new posts.
    ///
    /// Only proceeds while `total >= offset + page_size`. Calls made while an
    /// extension of the same key is in flight return
    /// [`ExtendOutcome::InFlight`] without fetching. A failed fetch leaves the
    /// partition untouched.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError::PartitionMissing`] if `key` was never
    /// initialized, and gateway errors as-is.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn extend_partition(&self, key: &FilterKey) -> Result<ExtendOutcome> {
        let page_size = self.inner.page_size;

        let (cursor, _guard) = {
            let mut state = self.write_state();
            let Some(partition) = state.partitions.get(key) else {
                error!("Extend requested for an uninitialized partition");
                return Err(InvariantError::PartitionMissing {
                    key: key.to_string(),
                }
                .into());
            };
            if !partition.has_more(page_size) {
                debug!(
                    offset = partition.offset(),
                    total = partition.total(),
                    "No more pages"
                );
                return Ok(ExtendOutcome::Exhausted);
            }
            let cursor = partition.next_cursor(page_size);
            if !state.extending.insert(key.clone()) {
                debug!("Partition extension already in flight");
                return Ok(ExtendOutcome::InFlight);
            }
            let guard = FlightGuard {
                state: &self.inner.state,
                landed: &self.inner.landed,
                key: key.clone(),
                flight: Flight::Extend,
            };
            (cursor, guard)
        };

        let page = self
            .inner
            .gateway
            .list_posts(key, cursor, page_size)
            .await
            .inspect_err(|err| warn!(cursor, error = %err, "Failed to fetch next page"))?;

        let added = {
            let mut state = self.write_state();
            let Some(partition) = state.partitions.get_mut(key) else {
                error!("Partition disappeared during extension");
                return Err(InvariantError::PartitionMissing {
                    key: key.to_string(),
                }
                .into());
            };
            if partition.next_cursor(page_size) != cursor {
                warn!(
                    cursor,
                    offset = partition.offset(),
                    "Discarding page fetched for an outdated cursor"
                );
                return Ok(ExtendOutcome::Stale);
            }
            let fetched = page.items.len();
            let added = partition.append(page, cursor);
            if added < fetched {
                debug!(duplicates = fetched - added, "Dropped posts already cached");
            }
            added
        };
        debug!(added, offset = cursor, "Partition extended");

        self.publish(CacheEvent::PartitionExtended {
            key: key.clone(),
            added,
            offset: cursor,
        });
        Ok(ExtendOutcome::Appended {
            added,
            offset: cursor,
        })
    }

    /// Look a post up in the partition of `key`, falling back to a direct
    /// fetch.
    ///
    /// A directly fetched post is not inserted into the partition: it need
    /// not belong to the filter's page sequence.
    #[instrument(skip(self), fields(key = %key, id = %id))]
    pub async fn get_post_by_id(&self, key: &FilterKey, id: &PostId) -> Result<Option<Post>> {
        if let Some(post) = self.cached_post(key, id) {
            debug!("Post cache hit");
            return Ok(Some(post));
        }

        debug!("Post cache miss, fetching directly");
        self.inner
            .gateway
            .get_post(id)
            .await
            .inspect_err(|err| warn!(error = %err, "Failed to fetch post"))
    }
}
