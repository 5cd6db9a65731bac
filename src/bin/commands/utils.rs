use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scrobble_import::{
    Artist, ArtistSearchService, Result, Scrobble, ScrobbleError, ScrobbleResponse, Scrobbler,
    SetlistPage, SetlistService,
};
use std::path::Path;

/// Scrobbler that prints the batch instead of sending it anywhere.
pub struct PrintScrobbler;

#[async_trait(?Send)]
impl Scrobbler for PrintScrobbler {
    async fn scrobble(&self, scrobbles: &[Scrobble]) -> Result<ScrobbleResponse> {
        print_scrobbles(scrobbles);
        Ok(ScrobbleResponse::ok())
    }
}

/// Artist search and setlist lookup answered from one saved setlist.fm page.
pub struct OfflineSetlists {
    page: SetlistPage,
}

impl OfflineSetlists {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self {
            page: SetlistPage::from_json(&json)?,
        })
    }
}

#[async_trait(?Send)]
impl ArtistSearchService for OfflineSetlists {
    async fn search_artists(&self, query: &str) -> Result<Vec<Artist>> {
        let query = query.trim().to_lowercase();
        let mut artists: Vec<Artist> = Vec::new();
        for setlist in &self.page.setlists {
            let artist = &setlist.artist;
            if artist.name.to_lowercase().contains(&query)
                && !artists.iter().any(|known| known.id == artist.id)
            {
                artists.push(artist.clone());
            }
        }
        Ok(artists)
    }
}

#[async_trait(?Send)]
impl SetlistService for OfflineSetlists {
    async fn get_setlists(&self, artist_id: &str, page: u32) -> Result<SetlistPage> {
        if page != 1 {
            return Err(ScrobbleError::Service(format!(
                "page {page} is not part of the export"
            )));
        }
        let setlists: Vec<_> = self
            .page
            .setlists
            .iter()
            .filter(|setlist| setlist.artist.id == artist_id)
            .cloned()
            .collect();
        Ok(SetlistPage {
            total: setlists.len() as u32,
            items_per_page: setlists.len() as u32,
            page: 1,
            setlists,
        })
    }
}

/// Parse an RFC 3339 command line argument.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| ScrobbleError::Parse(format!("'{value}' is not an RFC 3339 time: {e}")))
}

pub fn print_scrobbles(scrobbles: &[Scrobble]) {
    println!("🎵 {} scrobble(s):", scrobbles.len());
    for scrobble in scrobbles {
        let album = scrobble
            .album
            .as_deref()
            .map(|album| format!(" [{album}]"))
            .unwrap_or_default();
        println!(
            "  {}  {} - {}{album}",
            scrobble.timestamp.format("%Y-%m-%d %H:%M:%S"),
            scrobble.artist,
            scrobble.track
        );
    }
}
