use crate::Scrobble;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A track the user may choose to scrobble.
///
/// Candidates come from two places: songs extracted from a concert setlist
/// (no `played_at`, the flow computes one) and rows of a CSV file (which carry
/// a literal `played_at` unless the file is read in import mode).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackCandidate {
    /// The artist name
    pub artist: String,
    /// The album name (if available)
    pub album: Option<String>,
    /// The album artist name (if available)
    pub album_artist: Option<String>,
    /// The track name/title
    pub track: String,
    /// Track length (if known)
    ///
    /// Setlists never carry durations, so the setlist flow substitutes a
    /// fallback when this is `None`.
    pub duration: Option<Duration>,
    /// When the track was played, as recorded in the source (if available)
    pub played_at: Option<DateTime<Utc>>,
}

impl TrackCandidate {
    pub fn new(artist: impl Into<String>, track: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album: None,
            album_artist: None,
            track: track.into(),
            duration: None,
            played_at: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_played_at(mut self, played_at: DateTime<Utc>) -> Self {
        self.played_at = Some(played_at);
        self
    }

    /// Build the scrobble for this candidate at the given timestamp.
    pub fn to_scrobble(&self, timestamp: DateTime<Utc>) -> Scrobble {
        Scrobble {
            artist: self.artist.clone(),
            album: self.album.clone(),
            track: self.track.clone(),
            album_artist: self.album_artist.clone(),
            duration: self.duration,
            timestamp,
        }
    }

    /// Human-readable `Artist - Track` label.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.track)
    }
}
