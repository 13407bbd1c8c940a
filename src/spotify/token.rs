use chrono::{DateTime, Duration, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::{SpotifyError, SpotifyResult};
use crate::config::Credentials;

/// Seconds subtracted from the server-reported token lifetime
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 300;

const CLIENT_CREDENTIALS_BODY: &str = "grant_type=client_credentials";

/// Bearer token and the instant after which it is no longer used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Default)]
struct TokenState {
    token: Option<CachedToken>,
    last_failure: Option<String>,
}

/// Client-credentials token cache with single-flight refresh.
///
/// The state lock is held across the exchange, so callers that find the
/// token missing or expired queue behind one request. Waiters that see an
/// exchange complete while they were queued take its result instead of
/// issuing their own.
pub struct TokenCache {
    credentials: Credentials,
    token_url: String,
    state: Mutex<TokenState>,
    /// Number of exchanges that ran to completion (success or failure)
    exchanges: AtomicU64,
}

impl TokenCache {
    pub fn new(credentials: Credentials, token_url: &str) -> Self {
        Self {
            credentials,
            token_url: token_url.to_string(),
            state: Mutex::new(TokenState::default()),
            exchanges: AtomicU64::new(0),
        }
    }

    /// Return a bearer token valid for immediate use, exchanging credentials
    /// if the cached one is missing or expired.
    pub async fn access_token(&self, http: &Client) -> SpotifyResult<String> {
        let seen = self.exchanges.load(Ordering::Acquire);
        let mut state = self.state.lock().await;

        if let Some(token) = state.token.as_ref().filter(|t| t.is_valid_at(Utc::now())) {
            return Ok(token.access_token.clone());
        }

        // Someone else's exchange finished while we were queued and left no
        // valid token behind, so it failed: share that failure.
        if self.exchanges.load(Ordering::Acquire) != seen {
            if let Some(message) = &state.last_failure {
                return Err(SpotifyError::Authentication(message.clone()));
            }
        }

        // Dropping this future mid-exchange releases the lock with the state
        // untouched and without counting an exchange.
        let result = self.exchange(http).await;
        self.exchanges.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(token) => {
                let access_token = token.access_token.clone();
                state.token = Some(token);
                state.last_failure = None;
                Ok(access_token)
            }
            Err(message) => {
                warn!(error = %message, "Spotify token exchange failed");
                state.last_failure = Some(message.clone());
                Err(SpotifyError::Authentication(message))
            }
        }
    }

    /// Expiration of the cached token, valid or not
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.token.as_ref().map(|t| t.expires_at)
    }

    async fn exchange(&self, http: &Client) -> Result<CachedToken, String> {
        debug!(url = %self.token_url, "Requesting client credentials token");

        let response = http
            .post(&self.token_url)
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(CLIENT_CREDENTIALS_BODY)
            .send()
            .await
            .map_err(|e| format!("token request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("token endpoint returned {}: {}", status.as_u16(), body));
        }

        let issued_at = Utc::now();
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse token response: {}", e))?;

        if body.expires_in <= 0 {
            return Err(format!(
                "token response has non-positive expires_in {}",
                body.expires_in
            ));
        }
        let expires_at = expiry_from(issued_at, body.expires_in).ok_or_else(|| {
            format!("token response has out-of-range expires_in {}", body.expires_in)
        })?;

        let token = CachedToken {
            access_token: body.access_token,
            expires_at,
        };
        info!(expires_at = %token.expires_at, "Obtained Spotify access token");
        Ok(token)
    }
}

/// `issued_at + expires_in - TOKEN_EXPIRY_MARGIN_SECS`, or `None` when the
/// result does not fit in a timestamp
pub fn expiry_from(issued_at: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    let lifetime = expires_in.checked_sub(TOKEN_EXPIRY_MARGIN_SECS)?;
    issued_at.checked_add_signed(Duration::try_seconds(lifetime)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_applies_margin() {
        let issued_at = Utc::now();
        let expires_at = expiry_from(issued_at, 3600).unwrap();
        assert_eq!(expires_at - issued_at, Duration::seconds(3300));
    }

    #[test]
    fn test_expiry_out_of_range_is_none() {
        let issued_at = Utc::now();
        assert!(expiry_from(issued_at, i64::MAX).is_none());
        assert!(expiry_from(issued_at, i64::MIN).is_none());
    }

    #[test]
    fn test_validity_is_strict() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: now,
        };
        assert!(!token.is_valid_at(now));
        assert!(token.is_valid_at(now - Duration::seconds(1)));
        assert!(!token.is_valid_at(now + Duration::seconds(1)));
    }

    #[test]
    fn test_short_lifetime_is_already_expired() {
        let issued_at = Utc::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: expiry_from(issued_at, 300).unwrap(),
        };
        assert!(!token.is_valid_at(issued_at));
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint_is_authentication_error() {
        // Port 9 (discard) is not expected to accept HTTP
        let cache = TokenCache::new(Credentials::new("id", "secret"), "http://127.0.0.1:9/api/token");
        let result = cache.access_token(&Client::new()).await;
        assert!(matches!(result, Err(SpotifyError::Authentication(_))));
        assert!(cache.expires_at().await.is_none());
    }
}
