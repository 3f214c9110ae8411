use tracing::{debug, warn};

use crate::catalog::{SearchCatalog, SearchKind};
use crate::error::Result;
use crate::normalize::NormalizedQuery;
use crate::spotify::custom_types::MatchCandidate;

/// Searches the remote catalog and accepts the first result. No scoring, no paging.
pub struct CatalogMatcher<'a, C> {
    catalog: &'a C,
}

impl<'a, C: SearchCatalog> CatalogMatcher<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    pub async fn find_album(&self, query: &NormalizedQuery) -> Result<Option<MatchCandidate>> {
        self.find(query, SearchKind::Album).await
    }

    pub async fn find_artist(&self, query: &NormalizedQuery) -> Result<Option<MatchCandidate>> {
        self.find(query, SearchKind::Artist).await
    }

    async fn find(&self, query: &NormalizedQuery, kind: SearchKind) -> Result<Option<MatchCandidate>> {
        let page = self.catalog.search(&query.search_string(), kind).await?;
        let Some(first) = page.items.into_iter().next() else {
            return Ok(None);
        };
        let Some(item) = first else {
            debug!(?query, "first search result is null");
            return Ok(None);
        };
        match MatchCandidate::try_from(item) {
            Ok(candidate) => Ok(Some(candidate)),
            Err(err) => {
                warn!(?query, "ignoring malformed search result: {err:#}");
                Ok(None)
            }
        }
    }
}
