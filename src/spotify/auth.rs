use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, ensure};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::spotify::api_types;
use crate::spotify::retry::{self, Retry};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Renew this long before the server-side expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    PlaylistModifyPrivate,
    PlaylistModifyPublic,
    UserLibraryModify,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::PlaylistModifyPrivate => "playlist-modify-private",
            Scope::PlaylistModifyPublic => "playlist-modify-public",
            Scope::UserLibraryModify => "user-library-modify",
        }
    }
}

/// Searching needs no user authorization
pub const SEARCH_SCOPES: &[Scope] = &[];
pub const PLAYLIST_SCOPES: &[Scope] = &[Scope::PlaylistModifyPrivate, Scope::PlaylistModifyPublic];
pub const LIBRARY_SCOPES: &[Scope] = &[Scope::UserLibraryModify];

pub fn scope_list(scopes: &[Scope]) -> String {
    scopes
        .iter()
        .map(|scope| scope.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Application credentials, usually `spotify_secrets.json`
#[derive(Deserialize)]
pub struct Secrets {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Obtained out of band with the scopes the mutating modes need
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Secrets {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read secrets file {}", path.display()))?;
        let secrets: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse secrets file {}", path.display()))?;
        secrets.validate()?;
        Ok(secrets)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.client_id.is_empty(), "client_id is empty");
        ensure!(!self.client_secret.is_empty(), "client_secret is empty");
        ensure!(!self.redirect_uri.is_empty(), "redirect_uri is empty");
        Ok(())
    }
}

enum Grant {
    ClientCredentials,
    RefreshToken(String),
    /// Supplied by the caller, never renewed
    Static,
}

struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

pub struct Authenticator {
    client_id: String,
    client_secret: String,
    token_url: String,
    grant: Mutex<Grant>,
    token: Mutex<Option<CachedToken>>,
}

impl Authenticator {
    /// Picks the grant for the required scopes: client credentials when none are
    /// needed, otherwise a caller-supplied access token or the stored refresh token.
    pub fn new(
        secrets: &Secrets,
        scopes: &[Scope],
        access_token: Option<String>,
    ) -> anyhow::Result<Self> {
        let (grant, token) = match (scopes.is_empty(), access_token, &secrets.refresh_token) {
            (true, _, _) => (Grant::ClientCredentials, None),
            (false, Some(access_token), _) => (
                Grant::Static,
                Some(CachedToken {
                    access_token,
                    expires_at: None,
                }),
            ),
            (false, None, Some(refresh_token)) => (Grant::RefreshToken(refresh_token.clone()), None),
            (false, None, None) => anyhow::bail!(
                "this mode needs a user token with scopes \"{}\"; authorize via {} and set \
                 refresh_token in the secrets file or SPOTIFY_ACCESS_TOKEN",
                scope_list(scopes),
                secrets.redirect_uri,
            ),
        };
        Ok(Self {
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            token_url: TOKEN_URL.to_owned(),
            grant: Mutex::new(grant),
            token: Mutex::new(token),
        })
    }

    /// Current access token, renewed first if it has expired. The grant request is
    /// retried like any other idempotent call.
    pub async fn bearer(&self, http: &reqwest::Client, max_retries: u32) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(cached) = token.as_ref().filter(|t| t.is_fresh()) {
            return Ok(cached.access_token.clone());
        }

        let mut grant = self.grant.lock().await;
        let response = {
            let form: Vec<(&str, &str)> = match &*grant {
                Grant::ClientCredentials => vec![("grant_type", "client_credentials")],
                Grant::RefreshToken(refresh_token) => vec![
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                ],
                Grant::Static => {
                    return Err(Error::Api {
                        status: 401,
                        message: "supplied access token has expired".to_owned(),
                    });
                }
            };

            tracing::debug!("requesting access token");
            retry::send(max_retries, Retry::Idempotent, || {
                http.post(&self.token_url)
                    .basic_auth(&self.client_id, Some(&self.client_secret))
                    .form(&form)
            })
            .await?
        };
        let body: api_types::token::Root = response.json().await?;

        if let Some(rotated) = body.refresh_token {
            if let Grant::RefreshToken(current) = &mut *grant {
                *current = rotated;
            }
        }

        let access_token = body.access_token;
        *token = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Some(
                Instant::now() + Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN),
            ),
        });
        Ok(access_token)
    }
}
