use serde::{Deserialize, Serialize};

/// Link to the resource on open.spotify.com
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

/// Cover art or artist picture in one size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Follower count of an artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

/// Full artist object, returned by search and lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// 0-100, computed by Spotify from recent plays
    pub popularity: u8,
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
    pub external_urls: ExternalUrls,
}

impl Artist {
    /// Largest image; Spotify lists images widest first
    pub fn primary_image(&self) -> Option<&Image> {
        self.images.first()
    }

    pub fn follower_label(&self) -> String {
        format_followers(self.followers.total)
    }
}

/// Human readable follower count, e.g. `85.0M followers`
pub fn format_followers(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M followers", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.0}K followers", count as f64 / 1_000.0)
    } else {
        format!("{} followers", count)
    }
}

/// Artist reference nested in tracks and albums
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
    pub duration_ms: Option<u64>,
    pub popularity: Option<u8>,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub explicit: bool,
    pub track_number: Option<u32>,
    pub album: Option<Album>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// Simplified album object, as listed under an artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    pub album_type: Option<String>,
    pub album_group: Option<String>,
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

impl Album {
    pub fn primary_image(&self) -> Option<&Image> {
        self.images.first()
    }
}

/// Offset based page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total: u32,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub next: Option<String>,
}

/// `GET /search?type=artist`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: Paging<Artist>,
}

/// `GET /artists/{id}/top-tracks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<Track>,
}

/// Secondary data shown on an artist's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub top_tracks: Vec<Track>,
    pub albums: Vec<Album>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artist_json() -> serde_json::Value {
        json!({
            "id": "3TVXtAsR1Inumwj472S9r4",
            "name": "Drake",
            "genres": ["canadian hip hop", "rap"],
            "popularity": 95,
            "followers": { "href": null, "total": 85000000 },
            "images": [
                { "url": "https://i.scdn.co/image/large", "width": 640, "height": 640 },
                { "url": "https://i.scdn.co/image/small", "width": 160, "height": 160 }
            ],
            "external_urls": { "spotify": "https://open.spotify.com/artist/3TVXtAsR1Inumwj472S9r4" },
            "type": "artist",
            "uri": "spotify:artist:3TVXtAsR1Inumwj472S9r4"
        })
    }

    #[test]
    fn test_deserialize_artist() {
        let artist: Artist = serde_json::from_value(artist_json()).unwrap();
        assert_eq!(artist.name, "Drake");
        assert_eq!(artist.genres, vec!["canadian hip hop", "rap"]);
        assert_eq!(artist.followers.total, 85_000_000);
        assert_eq!(artist.images.len(), 2);
        assert_eq!(
            artist.primary_image().map(|i| i.url.as_str()),
            Some("https://i.scdn.co/image/large")
        );
    }

    #[test]
    fn test_deserialize_artist_without_images() {
        let mut value = artist_json();
        value["images"] = json!([]);
        value.as_object_mut().unwrap().remove("genres");
        let artist: Artist = serde_json::from_value(value).unwrap();
        assert!(artist.genres.is_empty());
        assert!(artist.primary_image().is_none());
    }

    #[test]
    fn test_image_with_null_dimensions() {
        let image: Image =
            serde_json::from_value(json!({ "url": "u", "width": null, "height": null })).unwrap();
        assert_eq!(image.width, None);
        assert_eq!(image.height, None);
    }

    #[test]
    fn test_format_followers() {
        assert_eq!(format_followers(85_000_000), "85.0M followers");
        assert_eq!(format_followers(1_240_000), "1.2M followers");
        assert_eq!(format_followers(85_000), "85K followers");
        assert_eq!(format_followers(999), "999 followers");
        assert_eq!(format_followers(0), "0 followers");
    }

    #[test]
    fn test_deserialize_album_page() {
        let page: Paging<Album> = serde_json::from_value(json!({
            "href": "https://api.spotify.com/v1/artists/x/albums",
            "items": [{
                "id": "a1",
                "name": "For All The Dogs",
                "album_type": "album",
                "album_group": "album",
                "release_date": "2023-10-06",
                "release_date_precision": "day",
                "total_tracks": 23,
                "images": [{ "url": "https://i.scdn.co/image/cover", "width": 640, "height": 640 }],
                "external_urls": { "spotify": "https://open.spotify.com/album/a1" },
                "artists": [{
                    "id": "3TVXtAsR1Inumwj472S9r4",
                    "name": "Drake",
                    "external_urls": { "spotify": "https://open.spotify.com/artist/3TVXtAsR1Inumwj472S9r4" }
                }]
            }],
            "limit": 20,
            "offset": 0,
            "next": null,
            "previous": null,
            "total": 1
        }))
        .unwrap();

        assert_eq!(page.total, 1);
        let album = &page.items[0];
        assert_eq!(album.release_date.as_deref(), Some("2023-10-06"));
        assert_eq!(album.total_tracks, Some(23));
        assert_eq!(album.artists[0].name, "Drake");
        assert!(album.primary_image().is_some());
    }
}
