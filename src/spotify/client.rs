use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use super::error::{RequestError, SpotifyError, SpotifyResult};
use super::models::*;
use super::token::TokenCache;
use crate::config::SpotifyConfig;

const DEFAULT_USER_AGENT: &str = concat!("GigFinder/", env!("CARGO_PKG_VERSION"));
const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 50;
const DEFAULT_MARKET: &str = "US";
const PROFILE_ALBUM_LIMIT: u32 = 10;

/// Spotify Web API client using the client credentials flow.
///
/// Cloning is cheap and clones share one token cache, so a single client
/// built at startup can be handed to every caller.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    configured: bool,
    tokens: Arc<TokenCache>,
}

impl SpotifyClient {
    /// Create a client with its own HTTP transport.
    ///
    /// No request timeout is set; callers wanting deadlines can wrap calls
    /// in `tokio::time::timeout` or pass a configured transport to
    /// [`SpotifyClient::with_http_client`].
    pub fn new(config: SpotifyConfig) -> SpotifyResult<Self> {
        let client = Client::builder().user_agent(DEFAULT_USER_AGENT).build()?;
        Ok(Self::with_http_client(config, client))
    }

    /// Create a client on top of an existing `reqwest::Client`
    pub fn with_http_client(config: SpotifyConfig, client: Client) -> Self {
        Self {
            client,
            configured: config.is_configured(),
            base_url: config.api_base_url,
            tokens: Arc::new(TokenCache::new(config.credentials, &config.token_url)),
        }
    }

    /// True when both client id and client secret were supplied
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Expiration recorded for the cached token, if one was ever obtained
    pub async fn cached_token_expiry(&self) -> Option<DateTime<Utc>> {
        self.tokens.expires_at().await
    }

    /// Authorized GET returning the decoded body
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, RequestError> {
        debug!("GET {}", url);
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| RequestError::Parse(format!("Failed to parse response: {}", e)));
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(RequestError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Search for artists by name, in the order Spotify ranks them
    pub async fn search_artists(&self, query: &str, limit: Option<u32>) -> SpotifyResult<Vec<Artist>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SpotifyError::InvalidInput("search query is empty".to_string()));
        }
        let limit = clamp_limit(limit);

        let token = self.tokens.access_token(&self.client).await?;
        let url = format!(
            "{}/search?q={}&type=artist&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        let response: ArtistSearchResponse =
            self.get(&url, &token).await.map_err(SpotifyError::Search)?;
        Ok(response.artists.items)
    }

    /// Look up an artist by Spotify ID
    pub async fn get_artist(&self, artist_id: &str) -> SpotifyResult<Artist> {
        let artist_id = require_id(artist_id)?;

        let token = self.tokens.access_token(&self.client).await?;
        let url = format!("{}/artists/{}", self.base_url, urlencoding::encode(artist_id));
        self.get(&url, &token).await.map_err(|e| match e.status() {
            Some(404) => SpotifyError::NotFound(format!("artist {}", artist_id)),
            _ => SpotifyError::fetch("artist", e),
        })
    }

    /// Artist's most popular tracks in a market (defaults to US)
    pub async fn get_artist_top_tracks(
        &self,
        artist_id: &str,
        market: Option<&str>,
    ) -> SpotifyResult<Vec<Track>> {
        let artist_id = require_id(artist_id)?;
        let market = market.unwrap_or(DEFAULT_MARKET);

        let token = self.tokens.access_token(&self.client).await?;
        let url = format!(
            "{}/artists/{}/top-tracks?market={}",
            self.base_url,
            urlencoding::encode(artist_id),
            urlencoding::encode(market)
        );
        let response: TopTracksResponse = self
            .get(&url, &token)
            .await
            .map_err(|e| SpotifyError::fetch("artist top tracks", e))?;
        Ok(response.tracks)
    }

    /// Artist's albums and singles available in the US market
    pub async fn get_artist_albums(
        &self,
        artist_id: &str,
        limit: Option<u32>,
    ) -> SpotifyResult<Vec<Album>> {
        let artist_id = require_id(artist_id)?;
        let limit = clamp_limit(limit);

        let token = self.tokens.access_token(&self.client).await?;
        let url = format!(
            "{}/artists/{}/albums?include_groups={}&market={}&limit={}",
            self.base_url,
            urlencoding::encode(artist_id),
            urlencoding::encode("album,single"),
            DEFAULT_MARKET,
            limit
        );
        let page: Paging<Album> = self
            .get(&url, &token)
            .await
            .map_err(|e| SpotifyError::fetch("artist albums", e))?;
        Ok(page.items)
    }

    /// Top tracks and recent albums for an artist's profile, fetched concurrently
    pub async fn get_artist_profile(&self, artist_id: &str) -> SpotifyResult<ArtistProfile> {
        let (top_tracks, albums) = tokio::try_join!(
            self.get_artist_top_tracks(artist_id, None),
            self.get_artist_albums(artist_id, Some(PROFILE_ALBUM_LIMIT)),
        )?;
        Ok(ArtistProfile { top_tracks, albums })
    }
}

fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn require_id(artist_id: &str) -> SpotifyResult<&str> {
    let artist_id = artist_id.trim();
    if artist_id.is_empty() {
        return Err(SpotifyError::InvalidInput("artist id is empty".to_string()));
    }
    Ok(artist_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SpotifyClient {
        SpotifyClient::new(SpotifyConfig::new("id", "secret")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new(SpotifyConfig::new("id", "secret"));
        assert!(client.is_ok());
        assert!(client.unwrap().is_configured());
    }

    #[test]
    fn test_unconfigured_client() {
        let client = SpotifyClient::new(SpotifyConfig::new("", "")).unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_new_client_has_no_token() {
        let client = client();
        assert!(tokio_test::block_on(client.cached_token_expiry()).is_none());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 50);
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_token() {
        let client = client();
        let result = client.search_artists("   ", None).await;
        assert!(matches!(result, Err(SpotifyError::InvalidInput(_))));
        assert!(client.cached_token_expiry().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_artist_id_rejected() {
        let client = client();
        assert!(matches!(
            client.get_artist("").await,
            Err(SpotifyError::InvalidInput(_))
        ));
        assert!(matches!(
            client.get_artist_top_tracks(" ", None).await,
            Err(SpotifyError::InvalidInput(_))
        ));
        assert!(matches!(
            client.get_artist_albums("", None).await,
            Err(SpotifyError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires network access and SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET
    async fn test_search_artists_live() {
        dotenvy::dotenv().ok();
        let client = SpotifyClient::new(SpotifyConfig::from_env()).unwrap();
        let artists = client.search_artists("Drake", Some(5)).await.unwrap();
        assert!(!artists.is_empty());
        assert!(artists.len() <= 5);
    }
}
