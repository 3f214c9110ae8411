use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Outcome of one reconciliation run, in first-encounter order of unique queries
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub found: Vec<String>,
    pub missing: Vec<MissingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEntry {
    /// Album name in album mode, artist name in artist mode
    pub queried_name: String,
    pub queried_artist: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumReportFile {
    #[serde(default)]
    pub found_album_uris: Vec<String>,
    #[serde(default)]
    pub missing_albums: Vec<MissingAlbum>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingAlbum {
    pub album: String,
    pub album_artist: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistReportFile {
    #[serde(default)]
    pub found_artist_uris: Vec<String>,
    #[serde(default)]
    pub missing_artists: Vec<String>,
}

impl From<ReconciliationReport> for AlbumReportFile {
    fn from(report: ReconciliationReport) -> Self {
        Self {
            found_album_uris: report.found,
            missing_albums: report
                .missing
                .into_iter()
                .map(|entry| MissingAlbum {
                    album: entry.queried_name,
                    album_artist: entry.queried_artist,
                })
                .collect(),
        }
    }
}

impl From<ReconciliationReport> for ArtistReportFile {
    fn from(report: ReconciliationReport) -> Self {
        Self {
            found_artist_uris: report.found,
            missing_artists: report
                .missing
                .into_iter()
                .map(|entry| entry.queried_name)
                .collect(),
        }
    }
}

/// Writes the whole report or nothing: the JSON goes to a temporary file next to
/// `path` which then replaces it.
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let io_error = |source: std::io::Error| Error::Report {
        path: path.display().to_string(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    serde_json::to_writer_pretty(&mut file, report).map_err(|source| Error::ReportFormat {
        path: path.display().to_string(),
        source,
    })?;
    file.write_all(b"\n").map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

pub fn read_report<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Report {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| Error::ReportFormat {
        path: path.display().to_string(),
        source,
    })
}
