use tracing::info;

use crate::assembly::chunk;
use crate::catalog::LibraryApi;
use crate::error::Result;

/// Saves albums to the user's library in order, one request per chunk.
/// Returns the number of albums saved.
pub async fn save_albums<L: LibraryApi>(
    api: &L,
    album_uris: &[String],
    chunk_size: usize,
) -> Result<usize> {
    let mut saved = 0;
    for batch in chunk(album_uris, chunk_size) {
        api.save_albums(batch).await?;
        saved += batch.len();
        info!(saved, total = album_uris.len(), "saved albums");
    }
    Ok(saved)
}
