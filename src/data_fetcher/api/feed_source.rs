//! The feed source capability and its HTTP implementation

use reqwest::Client;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::instrument;

use super::fetch_utils::{FetchContext, fetch_document};
use super::http_client::create_http_client_with_timeout;
use super::rate_limit::RateLimiter;
use super::urls::{FeedResource, build_feed_url};
use crate::config::Config;
use crate::constants::cache;
use crate::data_fetcher::cache::HttpResponseCache;
use crate::data_fetcher::document::Document;
use crate::error::AppError;

/// Fetches one feed resource and returns the parsed document.
///
/// Transport concerns (rate limiting, retries, HTTP caching) belong to the
/// implementation; callers only see a document or an error.
pub trait FeedSource: Send + Sync {
    fn fetch(
        &self,
        resource: &FeedResource,
    ) -> impl Future<Output = Result<Document, AppError>> + Send;
}

impl<T: FeedSource> FeedSource for Arc<T> {
    fn fetch(
        &self,
        resource: &FeedResource,
    ) -> impl Future<Output = Result<Document, AppError>> + Send {
        (**self).fetch(resource)
    }
}

/// [`FeedSource`] backed by the SportsData HTTP API
#[derive(Debug)]
pub struct HttpFeedSource {
    client: Client,
    api_domain: String,
    api_key: String,
    rate_limiter: RateLimiter,
    response_cache: HttpResponseCache,
}

impl HttpFeedSource {
    pub fn new(
        client: Client,
        api_domain: impl Into<String>,
        api_key: impl Into<String>,
        rate_limit_per_second: u32,
    ) -> Self {
        let capacity = NonZeroUsize::new(cache::HTTP_RESPONSE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            client,
            api_domain: api_domain.into(),
            api_key: api_key.into(),
            rate_limiter: RateLimiter::new(rate_limit_per_second),
            response_cache: HttpResponseCache::new(capacity),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
        Ok(Self::new(
            client,
            config.api_domain.clone(),
            config.api_key.clone(),
            config.rate_limit_per_second,
        ))
    }

    pub fn api_domain(&self) -> &str {
        &self.api_domain
    }

    pub fn response_cache(&self) -> &HttpResponseCache {
        &self.response_cache
    }

    fn ttl_for(resource: &FeedResource) -> u64 {
        match resource {
            FeedResource::Venues => cache::VENUE_DIRECTORY_SECONDS,
            r if r.is_daily_batch() => cache::DAILY_FEED_SECONDS,
            _ => cache::GAME_FEED_SECONDS,
        }
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(skip(self), fields(feed = resource.label()))]
    async fn fetch(&self, resource: &FeedResource) -> Result<Document, AppError> {
        let url = build_feed_url(&self.api_domain, resource);
        let ctx = FetchContext {
            client: &self.client,
            api_key: &self.api_key,
            response_cache: &self.response_cache,
            rate_limiter: &self.rate_limiter,
        };
        fetch_document(&ctx, &url, Self::ttl_for(resource)).await
    }
}
