pub mod api;
pub mod cache;
pub mod document;

pub use api::{FeedResource, FeedSource, HttpFeedSource};
pub use cache::{CacheKey, CachePartition, FeedCache, MemoryFeedCache};
pub use document::{Document, DocumentExt};
