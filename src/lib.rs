//! GigFinder - artist discovery backed by the Spotify Web API

pub mod config;
pub mod spotify;

pub use config::{Credentials, SpotifyConfig};
pub use spotify::models::{Album, Artist, ArtistProfile, Track};
pub use spotify::{SpotifyClient, SpotifyError, SpotifyResult};
