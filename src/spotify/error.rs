use thiserror::Error;

/// Underlying cause of a failed resource request
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("API response parse error: {0}")]
    Parse(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(e) => e.status().map(|s| s.as_u16()),
            RequestError::Parse(_) => None,
        }
    }
}

/// Spotify API error types
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("Failed to authenticate with Spotify API: {0}")]
    Authentication(String),

    #[error("Failed to search artists: {0}")]
    Search(#[source] RequestError),

    #[error("Failed to fetch {resource}: {source}")]
    Fetch {
        resource: String,
        #[source]
        source: RequestError,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl SpotifyError {
    pub(crate) fn fetch(resource: impl Into<String>, source: RequestError) -> Self {
        SpotifyError::Fetch {
            resource: resource.into(),
            source,
        }
    }
}

pub type SpotifyResult<T> = Result<T, SpotifyError>;
