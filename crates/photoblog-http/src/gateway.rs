//! HTTP-backed content gateway.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use photoblog_core::traits::ContentGateway;
use photoblog_core::{ApiUrl, BlogInfo, Error, FilterKey, Post, PostId, PostsPage, Result};

use crate::client::ApiClient;
use crate::endpoints::*;

/// Only photo posts are requested for listings.
const PHOTO_TYPE: &str = "photo";

/// A content gateway that talks to the blog API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: ApiClient,
}

impl HttpGateway {
    /// Create a gateway for the given API base and key.
    pub fn new(base: ApiUrl, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(base, api_key, timeout)?,
        })
    }

    /// Fetch blog metadata.
    #[instrument(skip(self))]
    pub async fn blog_info(&self) -> Result<BlogInfo> {
        debug!("Fetching blog info");
        let response: InfoResponse = self.client.query(INFO, &NoParams {}).await?;
        Ok(response.blog)
    }
}

#[async_trait]
impl ContentGateway for HttpGateway {
    #[instrument(skip(self), fields(filter = %filter))]
    async fn list_posts(
        &self,
        filter: &FilterKey,
        cursor: u32,
        page_size: u32,
    ) -> Result<PostsPage> {
        debug!(cursor, page_size, "Listing posts via HTTP");

        let query = ListPostsQuery {
            kind: PHOTO_TYPE,
            limit: page_size,
            tag: filter.as_tag(),
            offset: (cursor > 0).then_some(cursor),
        };

        let response: PostsResponse = self.client.query(POSTS, &query).await?;

        let items = response
            .posts
            .into_iter()
            .map(PostEntry::into_post)
            .collect::<Result<Vec<_>>>()?;

        Ok(PostsPage {
            items,
            total: response.total_posts,
        })
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        debug!("Fetching post via HTTP");

        let query = GetPostQuery {
            id: id.as_str(),
            notes_info: true,
        };

        let response: PostsResponse = match self.client.query(POSTS, &query).await {
            Ok(response) => response,
            Err(Error::Api(err)) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        response
            .posts
            .into_iter()
            .next()
            .map(PostEntry::into_post)
            .transpose()
    }
}
