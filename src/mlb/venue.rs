use serde::Serialize;
use tracing::{debug, instrument};

use super::SportsData;
use crate::data_fetcher::api::{FeedResource, FeedSource};
use crate::data_fetcher::cache::{CacheKey, FeedCache};
use crate::data_fetcher::document::{Document, DocumentExt, as_list, into_required};
use crate::error::AppError;

/// A ballpark from the venue directory. Empty strings mean unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub location: String,
}

impl Venue {
    /// Placeholder for an id the directory does not list
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            location: String::new(),
        }
    }

    fn from_document(id: &str, venue: &Document) -> Self {
        Self {
            id: id.to_string(),
            name: venue.str_or_empty("name"),
            location: venue.str_or_empty("market"),
        }
    }

    pub fn is_known(&self) -> bool {
        !self.name.is_empty() || !self.location.is_empty()
    }

    /// Market when the directory has one, otherwise the venue name
    pub fn display_location(&self) -> &str {
        if self.location.is_empty() {
            &self.name
        } else {
            &self.location
        }
    }
}

/// Finds `id` in a venue directory (the contents of its `venues` root).
pub fn find_venue(directory: &Document, id: &str) -> Venue {
    as_list(directory.field("venue"))
        .into_iter()
        .find(|venue| venue.str_or_empty("id") == id)
        .map(|venue| Venue::from_document(id, venue))
        .unwrap_or_else(|| Venue::unknown(id))
}

impl<F: FeedSource, C: FeedCache> SportsData<F, C> {
    /// Looks a venue up in the directory. The directory is fetched once and
    /// cached under a key that ignores cache partitions. An id the directory
    /// does not list resolves to [`Venue::unknown`].
    #[instrument(skip(self))]
    pub async fn venue(&self, id: &str) -> Result<Venue, AppError> {
        let directory = self
            .cache()
            .get_or_compute(CacheKey::venues(), || async {
                let doc = self.feed().fetch(&FeedResource::Venues).await?;
                into_required(doc, "venues", "venue directory")
            })
            .await?;

        let venue = find_venue(&directory, id);
        if !venue.is_known() {
            debug!("Venue {} is not in the directory", id);
        }
        Ok(venue)
    }
}
