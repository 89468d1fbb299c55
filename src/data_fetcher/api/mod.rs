pub mod feed_source;
mod fetch_utils;
pub mod http_client;
pub mod rate_limit;
pub mod urls;

pub use feed_source::{FeedSource, HttpFeedSource};
pub use http_client::*;
pub use rate_limit::RateLimiter;
pub use urls::*;
