use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Conditions that abort a run
#[derive(Debug, Error)]
pub enum Error {
    #[error("track {track:?} has no {field}")]
    MissingField { field: &'static str, track: String },

    #[error("album {uri} has {count} tracks, more than the playlist limit of {limit}")]
    AlbumExceedsPlaylist {
        uri: String,
        count: usize,
        limit: usize,
    },

    #[error("invalid {expected} URI: {uri}")]
    InvalidUri { expected: &'static str, uri: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("report {path}: {source}")]
    Report {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("report {path} is not valid JSON: {source}")]
    ReportFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("library file: {0}")]
    Library(String),
}
