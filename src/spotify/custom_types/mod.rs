use anyhow::{Context, Result};

use crate::spotify::api_types;

/// First search result accepted as the match for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub uri: String,
    pub name: String,
    /// Empty for artist results
    pub artist_uris: Vec<String>,
    pub artist_names: Vec<String>,
}

impl TryFrom<api_types::search::Item> for MatchCandidate {
    type Error = anyhow::Error;

    fn try_from(item: api_types::search::Item) -> Result<Self, Self::Error> {
        let uri = item.uri.context("search result has no uri")?;
        let name = item
            .name
            .with_context(|| format!("search result {uri} has no name"))?;

        let mut artist_uris = Vec::with_capacity(item.artists.len());
        let mut artist_names = Vec::with_capacity(item.artists.len());
        for artist in item.artists {
            artist_uris.extend(artist.uri);
            artist_names.extend(artist.name);
        }

        Ok(Self {
            uri,
            name,
            artist_uris,
            artist_names,
        })
    }
}
