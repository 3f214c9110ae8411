//! Replays a report's found-list against the remote mutation endpoints

mod library;
mod playlist;

pub use library::save_albums;
pub use playlist::build_playlists;

/// Items per add-to-playlist request (API maximum)
pub const MAX_ADD_CHUNK_SIZE: usize = 100;
/// Albums per save-to-library request (API maximum)
pub const MAX_SAVE_CHUNK_SIZE: usize = 20;
/// Self-imposed, below the service's hard playlist size
pub const DEFAULT_PLAYLIST_SIZE: usize = 9_000;

/// The three ceilings are independent and must stay separate values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub add_chunk_size: usize,
    pub playlist_size: usize,
    pub save_chunk_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            add_chunk_size: MAX_ADD_CHUNK_SIZE,
            playlist_size: DEFAULT_PLAYLIST_SIZE,
            save_chunk_size: MAX_SAVE_CHUNK_SIZE,
        }
    }
}

/// Contiguous groups of at most `max_size` items in their original order.
/// The last group may be shorter; there are never empty groups.
///
/// Panics if `max_size` is zero.
pub fn chunk<T>(items: &[T], max_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(max_size)
}
