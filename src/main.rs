use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gigfinder::{SpotifyClient, SpotifyConfig};

const USAGE: &str = "usage: gigfinder <artist name> | gigfinder artist <spotify id>";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = SpotifyConfig::from_env();
    if !config.is_configured() {
        bail!(
            "Spotify API not configured. Create an app at https://developer.spotify.com/dashboard \
             and set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET in your .env file"
        );
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let client = SpotifyClient::new(config)?;

    match args.as_slice() {
        [] => bail!(USAGE),
        [command, id] if command == "artist" => show_artist(&client, id).await,
        words => search(&client, &words.join(" ")).await,
    }
}

async fn search(client: &SpotifyClient, query: &str) -> Result<()> {
    info!("Searching Spotify for {:?}", query);
    let artists = client.search_artists(query, Some(10)).await?;

    if artists.is_empty() {
        println!("No artists found for {:?}", query);
    }
    for artist in artists {
        println!("{:<32} {:>18}  {}", artist.name, artist.follower_label(), artist.id);
    }
    Ok(())
}

async fn show_artist(client: &SpotifyClient, artist_id: &str) -> Result<()> {
    let artist = client.get_artist(artist_id).await?;
    let profile = client.get_artist_profile(artist_id).await?;

    println!("{} ({})", artist.name, artist.follower_label());
    if !artist.genres.is_empty() {
        println!("Genres: {}", artist.genres.join(", "));
    }
    println!("Popularity: {}/100", artist.popularity);
    println!("{}", artist.external_urls.spotify);

    println!("\nTop tracks:");
    for (rank, track) in profile.top_tracks.iter().enumerate() {
        println!("{:>3}. {}", rank + 1, track.name);
    }

    println!("\nAlbums & singles:");
    for album in &profile.albums {
        println!(
            "  {} ({})",
            album.name,
            album.release_date.as_deref().unwrap_or("unknown date")
        );
        if let Some(cover) = album.primary_image() {
            println!("    cover: {}", cover.url);
        }
    }
    Ok(())
}
