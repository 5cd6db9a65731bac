//! Artist and setlist data as returned by setlist lookup services.
//!
//! The serde mapping follows the setlist.fm JSON layout (`camelCase` keys,
//! songs nested under `sets.set[].song[]`) so host applications can feed API
//! responses straight into [`SetlistPage::from_json`].

use crate::{Result, TrackCandidate};
use serde::{Deserialize, Serialize};

/// An artist returned by the artist search service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Unique id used to look up setlists (a MusicBrainz id)
    #[serde(rename = "mbid")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Name used for sorting, e.g. "Beatles, The"
    #[serde(default)]
    pub sort_name: Option<String>,
    /// Image URL, when the search service provides one
    #[serde(default)]
    pub image: Option<String>,
}

/// A single concert with its songs grouped into sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setlist {
    pub id: String,
    /// Date of the show as `dd-MM-yyyy`
    #[serde(default)]
    pub event_date: Option<String>,
    pub artist: Artist,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub tour: Option<Tour>,
    #[serde(default)]
    pub sets: Sets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    #[serde(default)]
    pub city: Option<City>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: Option<Country>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    pub name: String,
}

/// Wrapper matching the `"sets": {"set": [...]}` nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sets {
    #[serde(default)]
    pub set: Vec<SongSet>,
}

/// One set of a show (main set, encore, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSet {
    #[serde(default)]
    pub name: Option<String>,
    /// Encore number, if this set is an encore
    #[serde(default)]
    pub encore: Option<u32>,
    #[serde(default, rename = "song")]
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    /// Played from tape rather than performed
    #[serde(default)]
    pub tape: bool,
    #[serde(default)]
    pub info: Option<String>,
}

impl Setlist {
    /// All performed songs in show order, across every set.
    ///
    /// Songs from tape and songs without a name are skipped.
    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.sets
            .set
            .iter()
            .flat_map(|set| set.songs.iter())
            .filter(|song| !song.tape && !song.name.trim().is_empty())
    }

    /// Flatten the setlist into candidates credited to the setlist's artist.
    pub fn to_candidates(&self) -> Vec<TrackCandidate> {
        self.songs()
            .map(|song| TrackCandidate::new(self.artist.name.clone(), song.name.trim()))
            .collect()
    }

    /// Label such as `Radiohead at Roundhouse, London (17-01-2008)`.
    pub fn title(&self) -> String {
        let mut title = self.artist.name.clone();
        if let Some(venue) = &self.venue {
            title.push_str(&format!(" at {}", venue.name));
            if let Some(city) = &venue.city {
                title.push_str(&format!(", {}", city.name));
            }
        }
        if let Some(date) = &self.event_date {
            title.push_str(&format!(" ({date})"));
        }
        title
    }
}

/// One page of setlists for an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistPage {
    #[serde(default, rename = "setlist")]
    pub setlists: Vec<Setlist>,
    /// Current page number (1-indexed)
    #[serde(default = "first_page")]
    pub page: u32,
    /// Total number of setlists across all pages
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub items_per_page: u32,
}

fn first_page() -> u32 {
    1
}

impl SetlistPage {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of pages, never less than one.
    pub fn total_pages(&self) -> u32 {
        if self.items_per_page == 0 {
            return 1;
        }
        self.total.div_ceil(self.items_per_page).max(1)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }
}
