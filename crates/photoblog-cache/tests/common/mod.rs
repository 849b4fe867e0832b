//! In-memory gateway for exercising the cache and views without HTTP.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use photoblog_cache::PostCache;
use photoblog_core::error::TransportError;
use photoblog_core::traits::ContentGateway;
use photoblog_core::{Error, FilterKey, PhotoVariant, Post, PostId, PostKind, PostsPage, Result};
use tokio::sync::Semaphore;

pub const PAGE_SIZE: u32 = 20;

/// Base timestamp of generated posts: 2021-03-04T12:00:00Z.
pub const BASE_TIMESTAMP: i64 = 1_614_859_200;

/// A photo post with variants 2048, 1280, 640 and 250 pixels wide.
pub fn photo(id: u64, tags: &[&str]) -> Post {
    Post {
        id,
        id_string: PostId::from(id),
        timestamp: BASE_TIMESTAMP,
        summary: format!("photo number {}", id),
        caption: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        note_count: 0,
        kind: PostKind::Photo,
        post_url: None,
        variants: [2048, 1280, 640, 250]
            .into_iter()
            .map(|width| PhotoVariant {
                width,
                height: width * 3 / 4,
                url: format!("https://media.example/{}_{}.jpg", id, width),
            })
            .collect(),
    }
}

/// A post that is not rendered in the gallery.
pub fn text(id: u64) -> Post {
    Post {
        kind: PostKind::Other("text".to_string()),
        variants: Vec::new(),
        ..photo(id, &[])
    }
}

/// Photo posts with ids `0..count`.
pub fn photos(count: u64) -> Vec<Post> {
    (0..count).map(|id| photo(id, &[])).collect()
}

/// A gateway serving fixed post lists per filter key.
///
/// Listings slice the key's list at the requested cursor and report its
/// length as the total. Keys without a list are confirmed empty.
#[derive(Default)]
pub struct ScriptedGateway {
    listings: HashMap<FilterKey, Vec<Post>>,
    standalone: Vec<Post>,
    gate: Option<Semaphore>,
    fail_next: AtomicBool,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    cursors: Mutex<Vec<(FilterKey, u32)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, key: FilterKey, posts: Vec<Post>) -> Self {
        self.listings.insert(key, posts);
        self
    }

    /// A post reachable by id but absent from every listing.
    pub fn with_standalone(mut self, post: Post) -> Self {
        self.standalone.push(post);
        self
    }

    /// Make every call wait for a permit from [`release`](Self::release).
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Fail the next call with a connection error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Cursors of every listing request, in call order.
    pub fn cursors(&self, key: &FilterKey) -> Vec<u32> {
        self.cursors
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, cursor)| *cursor)
            .collect()
    }

    async fn enter(&self) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::Transport(TransportError::Connection {
                message: "connection reset by scripted gateway".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentGateway for ScriptedGateway {
    async fn list_posts(
        &self,
        filter: &FilterKey,
        cursor: u32,
        page_size: u32,
    ) -> Result<PostsPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().unwrap().push((filter.clone(), cursor));
        self.enter().await?;

        let posts = self.listings.get(filter).map(Vec::as_slice).unwrap_or(&[]);
        let start = (cursor as usize).min(posts.len());
        let end = (start + page_size as usize).min(posts.len());
        Ok(PostsPage {
            items: posts[start..end].to_vec(),
            total: posts.len() as u32,
        })
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        Ok(self
            .listings
            .values()
            .flatten()
            .chain(&self.standalone)
            .find(|post| &post.id_string == id)
            .cloned())
    }
}

pub fn cache(gateway: ScriptedGateway) -> PostCache<ScriptedGateway> {
    PostCache::new(gateway, PAGE_SIZE).unwrap()
}

/// Yield until `done` holds, failing the test after a generous bound.
pub async fn settle(mut done: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached");
}
