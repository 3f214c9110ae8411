use serde::Deserialize;

use crate::spotify::api_types::paging::Paging;

#[derive(Debug, Deserialize)]
pub struct Root {
    pub albums: Option<Paging<Item>>,
    pub artists: Option<Paging<Item>>,
}

/// Album or artist search result. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct Item {
    pub uri: Option<String>,
    pub name: Option<String>,
    /// Only present on album results
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistRef {
    pub uri: Option<String>,
    pub name: Option<String>,
}
