//! In-memory remote catalog shared by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};

use crate::catalog::{LibraryApi, PlaylistApi, SearchCatalog, SearchKind};
use crate::error::{Error, Result};
use crate::spotify::api_types::paging::{Paging, SimplifiedTrack};
use crate::spotify::api_types::search::{ArtistRef, Item};

pub fn album_item(uri: &str, name: &str, artist: &str) -> Item {
    Item {
        uri: Some(uri.to_owned()),
        name: Some(name.to_owned()),
        artists: vec![ArtistRef {
            uri: Some(format!("spotify:artist:{}", artist.replace(' ', ""))),
            name: Some(artist.to_owned()),
        }],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreatePlaylist { name: String },
    AddItems { playlist_id: String, count: usize },
    AlbumTracks { album_uri: String, next: Option<String> },
    SaveAlbums { uris: Vec<String> },
}

#[derive(Default)]
pub struct FakeCatalog {
    search_results: RefCell<HashMap<String, Vec<Option<Item>>>>,
    searches: RefCell<Vec<(String, SearchKind)>>,
    fail_searches: Cell<bool>,
    /// Album URI to pages of track URIs
    album_pages: RefCell<HashMap<String, Vec<Vec<String>>>>,
    playlists: RefCell<Vec<(String, Vec<String>)>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeCatalog {
    pub fn add_search_results(&self, query: &str, items: Vec<Option<Item>>) {
        self.search_results
            .borrow_mut()
            .insert(query.to_owned(), items);
    }

    pub fn fail_searches(&self) {
        self.fail_searches.set(true);
    }

    pub fn searches(&self) -> Vec<(String, SearchKind)> {
        self.searches.borrow().clone()
    }

    /// Registers an album with `track_count` tracks split into pages of `page_size`
    pub fn add_album(&self, album_uri: &str, track_count: usize, page_size: usize) {
        let tracks: Vec<String> = (0..track_count)
            .map(|i| format!("{album_uri}:track:{i}"))
            .collect();
        let pages = tracks.chunks(page_size).map(<[String]>::to_vec).collect();
        self.album_pages
            .borrow_mut()
            .insert(album_uri.to_owned(), pages);
    }

    /// Playlist names with the track URIs added to each, in creation order
    pub fn playlists(&self) -> Vec<(String, Vec<String>)> {
        self.playlists.borrow().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl SearchCatalog for FakeCatalog {
    async fn search(&self, query: &str, kind: SearchKind) -> Result<Paging<Item>> {
        self.searches.borrow_mut().push((query.to_owned(), kind));
        if self.fail_searches.get() {
            return Err(Error::Api {
                status: 503,
                message: "unavailable".to_owned(),
            });
        }
        let items = self
            .search_results
            .borrow_mut()
            .remove(query)
            .unwrap_or_default();
        Ok(Paging { items, next: None })
    }
}

impl PlaylistApi for FakeCatalog {
    async fn current_user_id(&self) -> Result<String> {
        Ok("listener".to_owned())
    }

    async fn create_playlist(&self, user_id: &str, name: &str) -> Result<String> {
        assert_eq!(user_id, "listener");
        self.calls.borrow_mut().push(Call::CreatePlaylist {
            name: name.to_owned(),
        });
        let mut playlists = self.playlists.borrow_mut();
        playlists.push((name.to_owned(), Vec::new()));
        Ok(format!("playlist-{}", playlists.len() - 1))
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.calls.borrow_mut().push(Call::AddItems {
            playlist_id: playlist_id.to_owned(),
            count: uris.len(),
        });
        let index: usize = playlist_id
            .strip_prefix("playlist-")
            .and_then(|i| i.parse().ok())
            .ok_or_else(|| Error::Api {
                status: 404,
                message: format!("no playlist {playlist_id}"),
            })?;
        self.playlists.borrow_mut()[index].1.extend_from_slice(uris);
        Ok(())
    }

    async fn album_tracks(
        &self,
        album_uri: &str,
        next: Option<&str>,
    ) -> Result<Paging<SimplifiedTrack>> {
        self.calls.borrow_mut().push(Call::AlbumTracks {
            album_uri: album_uri.to_owned(),
            next: next.map(str::to_owned),
        });
        let page_index: usize = next.and_then(|n| n.parse().ok()).unwrap_or(0);
        let pages = self.album_pages.borrow();
        let Some(pages) = pages.get(album_uri) else {
            return Err(Error::Api {
                status: 404,
                message: format!("no album {album_uri}"),
            });
        };
        let items = pages
            .get(page_index)
            .map(|page| {
                page.iter()
                    .map(|uri| {
                        Some(SimplifiedTrack {
                            uri: Some(uri.clone()),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        let next = (page_index + 1 < pages.len()).then(|| (page_index + 1).to_string());
        Ok(Paging { items, next })
    }
}

impl LibraryApi for FakeCatalog {
    async fn save_albums(&self, album_uris: &[String]) -> Result<()> {
        self.calls.borrow_mut().push(Call::SaveAlbums {
            uris: album_uris.to_vec(),
        });
        Ok(())
    }
}

/// Loopback HTTP/1.1 server answering one request per connection with `responses`
/// in order. Returns the base URL and the requests received so far, each as
/// "<request line> <body>".
pub fn serve_http(responses: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&received);
    std::thread::spawn(move || {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let request = read_request(&mut stream);
            log.lock().unwrap().push(request);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (base, received)
}

pub fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {status}\r\n");
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!(
        "Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ));
    response
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).into_owned(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < head_end + length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request_line = head.lines().next().unwrap_or_default();
    let body = String::from_utf8_lossy(&buf[head_end..]);
    format!("{request_line} {body}")
}
