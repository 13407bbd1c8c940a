use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
const API_BASE_URL_VAR: &str = "SPOTIFY_API_BASE_URL";
const TOKEN_URL_VAR: &str = "SPOTIFY_TOKEN_URL";

/// App identity issued by the Spotify developer dashboard
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// `Basic base64(id:secret)` for the token endpoint
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }

    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Spotify client configuration
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub credentials: Credentials,
    pub api_base_url: String,
    pub token_url: String,
}

impl SpotifyConfig {
    /// Configuration against the production Spotify endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(client_id, client_secret),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    /// Read credentials from the process environment.
    ///
    /// Missing credentials are left empty so callers can gate on
    /// [`SpotifyConfig::is_configured`] instead of failing at startup.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).unwrap_or_default();

        let mut config = Self::new(var(CLIENT_ID_VAR), var(CLIENT_SECRET_VAR));
        if let Ok(base_url) = std::env::var(API_BASE_URL_VAR) {
            config.api_base_url = base_url;
        }
        if let Ok(token_url) = std::env::var(TOKEN_URL_VAR) {
            config.token_url = token_url;
        }
        config.normalized()
    }

    /// Point the client at different endpoints (proxies, mock servers)
    pub fn with_endpoints(mut self, api_base_url: &str, token_url: &str) -> Self {
        self.api_base_url = api_base_url.to_string();
        self.token_url = token_url.to_string();
        self.normalized()
    }

    /// True when both the client id and the client secret are set
    pub fn is_configured(&self) -> bool {
        self.credentials.is_complete()
    }

    fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }
}
