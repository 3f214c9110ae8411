pub mod api_types;
pub mod auth;
mod client;
pub mod custom_types;
mod retry;

pub use client::Client;

use crate::error::{Error, Result};

pub fn validate_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Extracts the ID from a `spotify:<kind>:<id>` URI
pub fn spotify_id<'a>(uri: &'a str, kind: &'static str) -> Result<&'a str> {
    let invalid = || Error::InvalidUri {
        expected: kind,
        uri: uri.to_owned(),
    };
    let mut parts = uri.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("spotify"), Some(k), Some(id), None) if k == kind && validate_id(id) => Ok(id),
        _ => Err(invalid()),
    }
}
