pub mod fragment_cache;
pub mod http_response_cache;
pub mod types;

pub use fragment_cache::{FeedCache, MemoryFeedCache};
pub use http_response_cache::HttpResponseCache;
pub use types::*;
