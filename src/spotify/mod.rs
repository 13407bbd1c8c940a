mod client;
mod error;
pub mod models;
mod token;

pub use client::SpotifyClient;
pub use error::{RequestError, SpotifyError, SpotifyResult};
pub use token::{CachedToken, TOKEN_EXPIRY_MARGIN_SECS};
