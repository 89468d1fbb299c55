//! HTTP fetching with response caching, rate limiting, retries and error mapping

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::rate_limit::RateLimiter;
use crate::constants::retry;
use crate::data_fetcher::cache::HttpResponseCache;
use crate::data_fetcher::document::Document;
use crate::error::AppError;

/// Everything one GET needs besides the URL
pub(super) struct FetchContext<'a> {
    pub client: &'a Client,
    pub api_key: &'a str,
    pub response_cache: &'a HttpResponseCache,
    pub rate_limiter: &'a RateLimiter,
}

/// Fetches and parses a feed document.
///
/// This function:
/// - Checks the HTTP response cache first
/// - Waits for a rate limiter slot before each request
/// - Retries 429/5xx responses, timeouts and connection failures with
///   exponential backoff. A `Retry-After` header replaces the backoff, and
///   every wait is capped by [`AppError::retry_delay_seconds`]
/// - Maps failing HTTP statuses to the matching [`AppError`] variant
/// - Caches parsable bodies for `ttl_seconds`
#[instrument(skip(ctx))]
pub(super) async fn fetch_document(
    ctx: &FetchContext<'_>,
    url: &str,
    ttl_seconds: u64,
) -> Result<Document, AppError> {
    info!("Fetching data from URL: {url}");

    if let Some(cached_response) = ctx.response_cache.get(url).await {
        debug!("Using cached HTTP response for URL: {url}");
        match serde_json::from_str::<Document>(&cached_response) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => {
                warn!("Failed to parse cached response for URL {}: {}", url, e);
            }
        }
    }

    let mut attempt = 0u32;
    let mut backoff = Duration::from_millis(retry::BASE_DELAY_MS);
    let response = loop {
        ctx.rate_limiter.acquire().await;
        let (error, retry_after) = match ctx
            .client
            .get(url)
            .query(&[("api_key", ctx.api_key)])
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => break resp,
            Ok(resp) => {
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .map(Duration::from_secs);
                (status_error(resp.status(), url), retry_after)
            }
            Err(e) => (request_error(e, url), None),
        };

        if !error.is_retryable() || attempt >= retry::MAX_ATTEMPTS {
            error!("Request failed for URL {}: {}", url, error);
            return Err(error);
        }

        let wait = retry_wait(&error, retry_after, backoff);
        warn!(
            "{}. Retrying in {:?} (attempt {}/{})",
            error,
            wait,
            attempt + 1,
            retry::MAX_ATTEMPTS
        );
        tokio::time::sleep(wait).await;
        attempt += 1;
        backoff = backoff.saturating_mul(2);
    };

    debug!("Response status: {}", response.status());

    let response_text = response.text().await.map_err(|e| {
        error!("Failed to read response text from URL {}: {}", url, e);
        AppError::ApiFetch(e)
    })?;

    debug!("Response length: {} bytes", response_text.len());

    match serde_json::from_str::<Document>(&response_text) {
        Ok(parsed) => {
            ctx.response_cache
                .put(url.to_string(), response_text, ttl_seconds)
                .await;
            Ok(parsed)
        }
        Err(e) => {
            error!("Failed to parse API response: {} (URL: {})", e, url);
            if response_text.trim().is_empty() {
                Err(AppError::api_no_data("Response body is empty", url))
            } else {
                Err(AppError::api_malformed_json(e.to_string(), url))
            }
        }
    }
}

/// Maps a failing HTTP status to the matching upstream error
fn status_error(status: StatusCode, url: &str) -> AppError {
    let status_code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown error");
    debug!("HTTP {} - {} (URL: {})", status_code, reason, url);

    match status_code {
        404 => AppError::api_not_found(url),
        429 => AppError::api_rate_limit(reason, url),
        400..=499 => AppError::api_client_error(status_code, reason, url),
        502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
        _ => AppError::api_server_error(status_code, reason, url),
    }
}

fn request_error(e: reqwest::Error, url: &str) -> AppError {
    if e.is_timeout() {
        AppError::network_timeout(url)
    } else if e.is_connect() {
        AppError::network_connection(url, e.to_string())
    } else {
        AppError::ApiFetch(e)
    }
}

/// How long to wait before retrying after `error`.
///
/// The server's `Retry-After` wins over the backoff, but neither may exceed
/// the error's own retry delay.
fn retry_wait(error: &AppError, retry_after: Option<Duration>, backoff: Duration) -> Duration {
    let wait = retry_after.unwrap_or(backoff);
    match error.retry_delay_seconds() {
        Some(limit) => wait.min(Duration::from_secs(limit)),
        None => wait,
    }
}
