//! Remote operations the pipeline depends on. `spotify::Client` implements all of
//! them; tests substitute in-memory catalogs.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::spotify::api_types::paging::{Paging, SimplifiedTrack};
use crate::spotify::api_types::search;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Album,
    Artist,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Album => "album",
            SearchKind::Artist => "artist",
        }
    }
}

pub trait SearchCatalog {
    /// First page of results for a field-qualified query
    async fn search(&self, query: &str, kind: SearchKind) -> Result<Paging<search::Item>>;
}

pub trait PlaylistApi {
    async fn current_user_id(&self) -> Result<String>;

    /// Returns the new playlist's ID
    async fn create_playlist(&self, user_id: &str, name: &str) -> Result<String>;

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    /// The first page when `next` is `None`, otherwise the page `next` points at
    async fn album_tracks(
        &self,
        album_uri: &str,
        next: Option<&str>,
    ) -> Result<Paging<SimplifiedTrack>>;
}

pub trait LibraryApi {
    async fn save_albums(&self, album_uris: &[String]) -> Result<()>;
}
