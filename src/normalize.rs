use once_cell::sync::Lazy;
use regex::Regex;

/// Disc qualifiers, e.g. "Abbey Road (Disc 1)" or "Abbey Road Disk 2"
static DISC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?) ?\(?Dis[ck] \d+\)?$").expect("valid disc pattern"));

/// Volume qualifiers, e.g. "Greatest Hits (Volume 2)" or "Greatest Hits Volume 2"
static VOLUME_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?) ?\(?Volume \d+\)?$").expect("valid volume pattern"));

/// Strips a trailing disc or volume qualifier. Only the first matching pattern is applied,
/// and a name that is nothing but a qualifier is kept whole.
pub fn normalize_album(name: &str) -> String {
    for pattern in [&*DISC_SUFFIX, &*VOLUME_SUFFIX] {
        if let Some(base) = pattern.captures(name).and_then(|c| c.get(1)) {
            let base = base.as_str().trim_end();
            if base.is_empty() {
                break;
            }
            return base.to_owned();
        }
    }
    name.to_owned()
}

/// The two catalogs encode apostrophes differently, so drop them entirely.
pub fn normalize_artist(name: &str) -> String {
    name.replace('\'', "")
}

/// Canonical search built from simplified names. Equal queries are searched once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedQuery {
    pub artist: String,
    /// `None` for artist searches
    pub album: Option<String>,
}

impl NormalizedQuery {
    pub fn for_album(artist: &str, album: &str) -> Self {
        Self {
            artist: normalize_artist(artist),
            album: Some(normalize_album(album)),
        }
    }

    pub fn for_artist(artist: &str) -> Self {
        Self {
            artist: normalize_artist(artist),
            album: None,
        }
    }

    /// Field-qualified search string, e.g. `artist:Queen album:Jazz`
    pub fn search_string(&self) -> String {
        match &self.album {
            Some(album) => format!("artist:{} album:{album}", self.artist),
            None => format!("artist:{}", self.artist),
        }
    }
}
