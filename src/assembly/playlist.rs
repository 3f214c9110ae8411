use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use tracing::{debug, info, warn};

use crate::assembly::{Limits, chunk};
use crate::catalog::PlaylistApi;
use crate::error::{Error, Result};

/// A playlist being filled. The count only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub id: String,
    pub name: String,
    pub accumulated: usize,
}

/// Every track URI of an album, following `next` links page by page. Nothing is
/// fetched until the stream is polled.
pub fn album_track_uris<'a, P: PlaylistApi>(
    api: &'a P,
    album_uri: &'a str,
) -> impl Stream<Item = Result<String>> + 'a {
    try_stream! {
        let mut next: Option<String> = None;
        loop {
            let page = api.album_tracks(album_uri, next.as_deref()).await?;
            debug!(album_uri, items = page.items.len(), "album track page");
            for track in page.items.into_iter().flatten() {
                let Some(uri) = track.uri else {
                    warn!(album_uri, "album track without uri");
                    continue;
                };
                yield uri;
            }
            match page.next {
                Some(url) => next = Some(url),
                None => break,
            }
        }
    }
}

/// Fills playlists named `base_name`, `base_name 2`, ... with the tracks of each
/// album, starting a new playlist whenever the next album would push the current one
/// past `limits.playlist_size`. Albums are never split across playlists.
struct PlaylistBuilder<'a, P> {
    api: &'a P,
    user_id: String,
    base_name: &'a str,
    limits: Limits,
    current: ContainerState,
    full: Vec<ContainerState>,
}

impl<'a, P: PlaylistApi> PlaylistBuilder<'a, P> {
    async fn start(api: &'a P, base_name: &'a str, limits: Limits) -> Result<Self> {
        let user_id = api.current_user_id().await?;
        let current = create_container(api, &user_id, base_name.to_owned()).await?;
        Ok(Self {
            api,
            user_id,
            base_name,
            limits,
            current,
            full: Vec::new(),
        })
    }

    async fn add_album(&mut self, album_uri: &str) -> Result<()> {
        let tracks: Vec<String> = album_track_uris(self.api, album_uri).try_collect().await?;
        if tracks.len() > self.limits.playlist_size {
            return Err(Error::AlbumExceedsPlaylist {
                uri: album_uri.to_owned(),
                count: tracks.len(),
                limit: self.limits.playlist_size,
            });
        }

        if self.current.accumulated + tracks.len() > self.limits.playlist_size {
            info!(
                playlist = %self.current.name,
                tracks = self.current.accumulated,
                "playlist full"
            );
            let name = format!("{} {}", self.base_name, self.full.len() + 2);
            let next = create_container(self.api, &self.user_id, name).await?;
            self.full.push(std::mem::replace(&mut self.current, next));
        }

        for batch in chunk(&tracks, self.limits.add_chunk_size) {
            self.api.add_items(&self.current.id, batch).await?;
            debug!(playlist = %self.current.name, items = batch.len(), "added batch");
        }
        self.current.accumulated += tracks.len();
        info!(
            album_uri,
            tracks = tracks.len(),
            playlist = %self.current.name,
            "added album"
        );
        Ok(())
    }

    fn finish(mut self) -> Vec<ContainerState> {
        self.full.push(self.current);
        self.full
    }
}

async fn create_container<P: PlaylistApi>(
    api: &P,
    user_id: &str,
    name: String,
) -> Result<ContainerState> {
    let id = api.create_playlist(user_id, &name).await?;
    info!(playlist = %name, id = %id, "created playlist");
    Ok(ContainerState {
        id,
        name,
        accumulated: 0,
    })
}

/// Adds the tracks of every album, in order, to freshly created playlists.
/// Returns the playlists in creation order.
pub async fn build_playlists<P: PlaylistApi>(
    api: &P,
    album_uris: &[String],
    base_name: &str,
    limits: Limits,
) -> Result<Vec<ContainerState>> {
    let mut builder = PlaylistBuilder::start(api, base_name, limits).await?;
    for album_uri in album_uris {
        builder.add_album(album_uri).await?;
    }
    Ok(builder.finish())
}
