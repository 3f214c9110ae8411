use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use tracing::debug;

use crate::catalog::{LibraryApi, PlaylistApi, SearchCatalog, SearchKind};
use crate::error::Result;
use crate::spotify::api_types::paging::{Paging, SimplifiedTrack};
use crate::spotify::api_types::{playlist, search};
use crate::spotify::auth::Authenticator;
use crate::spotify::retry::{self, Retry};
use crate::spotify::spotify_id;

const API_BASE: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ALBUM_TRACKS_PAGE_SIZE: &str = "50";

pub struct Client {
    client: reqwest::Client,
    auth: Authenticator,
    max_retries: u32,
    api_base: String,
}

impl Client {
    pub fn new(auth: Authenticator, max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            auth,
            max_retries,
            api_base: API_BASE.to_owned(),
        })
    }

    /// Authorized request with the retries `policy` allows
    async fn send(
        &self,
        policy: Retry,
        build: impl Fn(&reqwest::Client) -> RequestBuilder,
    ) -> Result<Response> {
        let token = self.auth.bearer(&self.client, self.max_retries).await?;
        retry::send(self.max_retries, policy, || {
            build(&self.client).bearer_auth(&token)
        })
        .await
    }
}

impl SearchCatalog for Client {
    async fn search(&self, query: &str, kind: SearchKind) -> Result<Paging<search::Item>> {
        debug!(query, kind = kind.as_str(), "searching");
        let root: search::Root = self
            .send(Retry::Idempotent, |client| {
                client
                    .get(format!("{}/search", self.api_base))
                    .query(&[("q", query), ("type", kind.as_str()), ("limit", "1")])
            })
            .await?
            .json()
            .await?;
        let page = match kind {
            SearchKind::Album => root.albums,
            SearchKind::Artist => root.artists,
        };
        Ok(page.unwrap_or_default())
    }
}

impl PlaylistApi for Client {
    async fn current_user_id(&self) -> Result<String> {
        let user: playlist::User = self
            .send(Retry::Idempotent, |client| {
                client.get(format!("{}/me", self.api_base))
            })
            .await?
            .json()
            .await?;
        Ok(user.id)
    }

    async fn create_playlist(&self, user_id: &str, name: &str) -> Result<String> {
        let body = playlist::CreatePlaylist {
            name,
            public: false,
            description: "Albums matched from a local music library",
        };
        let created: playlist::Playlist = self
            .send(Retry::Unapplied, |client| {
                client
                    .post(format!("{}/users/{user_id}/playlists", self.api_base))
                    .json(&body)
            })
            .await?
            .json()
            .await?;
        Ok(created.id)
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let body = playlist::AddItems { uris };
        self.send(Retry::Unapplied, |client| {
            client
                .post(format!("{}/playlists/{playlist_id}/tracks", self.api_base))
                .json(&body)
        })
        .await?;
        Ok(())
    }

    async fn album_tracks(
        &self,
        album_uri: &str,
        next: Option<&str>,
    ) -> Result<Paging<SimplifiedTrack>> {
        let request = match next {
            Some(url) => url.to_owned(),
            None => {
                let id = spotify_id(album_uri, "album")?;
                format!(
                    "{}/albums/{id}/tracks?limit={ALBUM_TRACKS_PAGE_SIZE}",
                    self.api_base
                )
            }
        };
        Ok(self
            .send(Retry::Idempotent, |client| client.get(&request))
            .await?
            .json()
            .await?)
    }
}

impl LibraryApi for Client {
    async fn save_albums(&self, album_uris: &[String]) -> Result<()> {
        let ids = album_uris
            .iter()
            .map(|uri| spotify_id(uri, "album"))
            .collect::<Result<Vec<_>>>()?;
        let body = playlist::SaveAlbums { ids };
        self.send(Retry::Idempotent, |client| {
            client
                .put(format!("{}/me/albums", self.api_base))
                .json(&body)
        })
        .await?;
        Ok(())
    }
}
