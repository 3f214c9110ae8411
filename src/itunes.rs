//! Track source backed by an iTunes / Music "Library.xml" export (an XML plist).

use std::path::Path;

use anyhow::Context;
use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::error::{Error, Result};
use crate::reconcile::TrackRecord;

pub fn load_library(path: &Path) -> anyhow::Result<Vec<TrackRecord>> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read library {}", path.display()))?;
    let tracks = parse_library(&xml)
        .with_context(|| format!("failed to parse library {}", path.display()))?;
    Ok(tracks)
}

/// Audio file tracks in document order. Streams, videos and podcasts are dropped here
/// so the reconciliation never sees them.
pub fn parse_library(xml: &str) -> Result<Vec<TrackRecord>> {
    // Exports carry a DOCTYPE referencing Apple's plist DTD
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|err| Error::Library(err.to_string()))?;
    let root_dict = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("dict"))
        .ok_or_else(|| Error::Library("plist has no top-level dict".to_owned()))?;
    let tracks_dict = dict_entries(root_dict)
        .find(|(key, value)| *key == "Tracks" && value.has_tag_name("dict"))
        .map(|(_, value)| value)
        .ok_or_else(|| Error::Library("no Tracks dictionary".to_owned()))?;

    let mut tracks = Vec::new();
    for (track_id, entry) in dict_entries(tracks_dict) {
        if !entry.has_tag_name("dict") {
            continue;
        }
        let entry = LibraryEntry(entry);
        if let Some(reason) = entry.skip_reason() {
            debug!(track_id, reason, "skipping library entry");
            continue;
        }
        tracks.push(TrackRecord {
            title: entry.string("Name"),
            artist: entry.string("Artist"),
            album_artist: entry.string("Album Artist"),
            album: entry.string("Album"),
            rating: entry.integer("Rating"),
        });
    }
    Ok(tracks)
}

/// `<key>` / value pairs of a plist `<dict>`
fn dict_entries<'a, 'input>(
    dict: Node<'a, 'input>,
) -> impl Iterator<Item = (&'a str, Node<'a, 'input>)> {
    let mut children = dict.children().filter(Node::is_element);
    std::iter::from_fn(move || {
        loop {
            let key = children.next()?;
            if !key.has_tag_name("key") {
                continue;
            }
            let value = children.next()?;
            return Some((key.text().unwrap_or_default(), value));
        }
    })
}

struct LibraryEntry<'a, 'input>(Node<'a, 'input>);

impl<'a, 'input> LibraryEntry<'a, 'input> {
    fn value(&self, key: &str) -> Option<Node<'a, 'input>> {
        dict_entries(self.0).find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.value(key)
            .filter(|v| v.has_tag_name("string"))
            .and_then(|v| v.text())
            .map(str::to_owned)
    }

    fn integer(&self, key: &str) -> Option<u32> {
        self.value(key)
            .filter(|v| v.has_tag_name("integer"))
            .and_then(|v| v.text())
            .and_then(|t| t.trim().parse().ok())
    }

    fn flag(&self, key: &str) -> bool {
        self.value(key).is_some_and(|v| v.has_tag_name("true"))
    }

    fn skip_reason(&self) -> Option<&'static str> {
        if self.string("Track Type").as_deref() != Some("File") {
            return Some("not a file");
        }
        if !self
            .string("Kind")
            .is_some_and(|kind| kind.ends_with("audio file"))
        {
            return Some("not an audio file");
        }
        if self.flag("Podcast") || self.string("Genre").as_deref() == Some("Podcast") {
            return Some("podcast");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(tracks: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Major Version</key><integer>1</integer>
	<key>Application Version</key><string>12.9.5.5</string>
	<key>Tracks</key>
	<dict>
{tracks}
	</dict>
	<key>Playlists</key>
	<array></array>
</dict>
</plist>"#
        )
    }

    #[test]
    fn test_parse_audio_file() {
        let xml = library(
            r#"<key>101</key>
		<dict>
			<key>Track ID</key><integer>101</integer>
			<key>Name</key><string>In the Flesh?</string>
			<key>Artist</key><string>Pink Floyd</string>
			<key>Album Artist</key><string>Pink Floyd</string>
			<key>Album</key><string>The Wall (Disc 1)</string>
			<key>Kind</key><string>AAC audio file</string>
			<key>Rating</key><integer>80</integer>
			<key>Track Type</key><string>File</string>
		</dict>"#,
        );
        let tracks = parse_library(&xml).unwrap();
        let expected = vec![TrackRecord {
            title: Some("In the Flesh?".to_owned()),
            artist: Some("Pink Floyd".to_owned()),
            album_artist: Some("Pink Floyd".to_owned()),
            album: Some("The Wall (Disc 1)".to_owned()),
            rating: Some(80),
        }];
        assert_eq!(tracks, expected);
    }

    #[test]
    fn test_parse_decodes_entities_and_keeps_order() {
        let xml = library(
            r#"<key>1</key>
		<dict>
			<key>Name</key><string>Sweet Child O&#39; Mine</string>
			<key>Artist</key><string>Guns N&#39; Roses</string>
			<key>Album</key><string>Appetite for Destruction</string>
			<key>Kind</key><string>MPEG audio file</string>
			<key>Track Type</key><string>File</string>
		</dict>
		<key>2</key>
		<dict>
			<key>Name</key><string>Bohemian Rhapsody</string>
			<key>Artist</key><string>Queen</string>
			<key>Album</key><string>A Night at the Opera</string>
			<key>Kind</key><string>Apple Lossless audio file</string>
			<key>Track Type</key><string>File</string>
		</dict>"#,
        );
        let tracks = parse_library(&xml).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist.as_deref(), Some("Guns N' Roses"));
        assert_eq!(tracks[0].album_artist, None);
        assert_eq!(tracks[1].album.as_deref(), Some("A Night at the Opera"));
    }

    #[test]
    fn test_parse_filters_non_audio_and_podcasts() {
        let xml = library(
            r#"<key>1</key>
		<dict>
			<key>Name</key><string>Radio</string>
			<key>Kind</key><string>Internet audio stream</string>
			<key>Track Type</key><string>URL</string>
		</dict>
		<key>2</key>
		<dict>
			<key>Name</key><string>Video</string>
			<key>Kind</key><string>MPEG-4 video file</string>
			<key>Track Type</key><string>File</string>
		</dict>
		<key>3</key>
		<dict>
			<key>Name</key><string>Episode 1</string>
			<key>Genre</key><string>Podcast</string>
			<key>Kind</key><string>MPEG audio file</string>
			<key>Track Type</key><string>File</string>
		</dict>
		<key>4</key>
		<dict>
			<key>Name</key><string>Episode 2</string>
			<key>Kind</key><string>MPEG audio file</string>
			<key>Podcast</key><true/>
			<key>Track Type</key><string>File</string>
		</dict>
		<key>5</key>
		<dict>
			<key>Name</key><string>Kept</string>
			<key>Genre</key><string>Rock</string>
			<key>Kind</key><string>Purchased AAC audio file</string>
			<key>Podcast</key><false/>
			<key>Track Type</key><string>File</string>
		</dict>"#,
        );
        let tracks = parse_library(&xml).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title.as_deref(), Some("Kept"));
    }

    #[test]
    fn test_parse_without_tracks() {
        let xml = r#"<plist version="1.0"><dict><key>Major Version</key><integer>1</integer></dict></plist>"#;
        assert!(matches!(parse_library(xml), Err(Error::Library(_))));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_library("<plist><dict>"),
            Err(Error::Library(_)),
        ));
    }
}
