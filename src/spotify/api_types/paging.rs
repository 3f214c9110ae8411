use serde::Deserialize;

/// One page of a paged listing. `next` is the absolute URL of the following page.
#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    /// Individual entries may be `null`
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
    pub next: Option<String>,
}

impl<T> Default for Paging<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimplifiedTrack {
    pub uri: Option<String>,
}
