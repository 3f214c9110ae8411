use tracing::{debug, info, warn};

use crate::catalog::SearchCatalog;
use crate::dedup::QueryDeduplicator;
use crate::error::{Error, Result};
use crate::matching::CatalogMatcher;
use crate::normalize::NormalizedQuery;
use crate::report::{MissingEntry, ReconciliationReport};

/// One entry of the local library
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Falls back to `artist` when absent
    pub album_artist: Option<String>,
    pub album: Option<String>,
    /// 0-100
    pub rating: Option<u32>,
}

impl TrackRecord {
    fn album_artist(&self) -> Result<&str> {
        self.album_artist
            .as_deref()
            .or(self.artist.as_deref())
            .ok_or_else(|| self.missing("album artist"))
    }

    fn album(&self) -> Result<&str> {
        self.album.as_deref().ok_or_else(|| self.missing("album"))
    }

    fn missing(&self, field: &'static str) -> Error {
        Error::MissingField {
            field,
            track: self.title.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    Albums,
    Artists,
}

impl ReconcileMode {
    fn query(self, track: &TrackRecord) -> Result<NormalizedQuery> {
        Ok(match self {
            ReconcileMode::Albums => NormalizedQuery::for_album(track.album_artist()?, track.album()?),
            ReconcileMode::Artists => NormalizedQuery::for_artist(track.album_artist()?),
        })
    }
}

/// Matches every unique query derived from `tracks` exactly once.
///
/// A track without the fields its query needs aborts the run. A query without a
/// match is recorded as missing and the run continues.
pub async fn run<'t, C: SearchCatalog>(
    tracks: impl IntoIterator<Item = &'t TrackRecord>,
    mode: ReconcileMode,
    matcher: &CatalogMatcher<'_, C>,
    dedup: &mut QueryDeduplicator,
) -> Result<ReconciliationReport> {
    let mut report = ReconciliationReport::default();

    for track in tracks {
        let query = mode.query(track)?;
        if !dedup.should_query(&query) {
            continue;
        }
        debug!(
            query = %query.search_string(),
            title = ?track.title,
            rating = ?track.rating,
            "new query"
        );

        let found = match mode {
            ReconcileMode::Albums => matcher.find_album(&query).await?,
            ReconcileMode::Artists => matcher.find_artist(&query).await?,
        };

        match found {
            Some(candidate) => {
                info!(
                    query = %query.search_string(),
                    artists = ?candidate.artist_names,
                    "found \"{}\"",
                    candidate.name
                );
                debug!(uri = %candidate.uri, artist_uris = ?candidate.artist_uris);
                report.found.push(candidate.uri);
            }
            None => {
                warn!(query = %query.search_string(), "no match");
                let NormalizedQuery { artist, album } = query;
                report.missing.push(MissingEntry {
                    queried_name: album.unwrap_or_else(|| artist.clone()),
                    queried_artist: artist,
                });
            }
        }
    }

    Ok(report)
}
