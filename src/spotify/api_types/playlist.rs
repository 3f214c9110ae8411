use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePlaylist<'a> {
    pub name: &'a str,
    pub public: bool,
    pub description: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Playlist {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct AddItems<'a> {
    pub uris: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct SaveAlbums<'a> {
    pub ids: Vec<&'a str>,
}
