use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Root {
    pub access_token: String,
    /// Seconds
    pub expires_in: u64,
    /// Only present when the server rotates the refresh token
    pub refresh_token: Option<String>,
}
