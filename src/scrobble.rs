use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single listening event ready to be submitted to the scrobble service.
///
/// Scrobbles are built by the flows once timestamps have been assigned and are
/// never modified afterwards.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use scrobble_import::Scrobble;
/// use std::time::Duration;
///
/// let played_at = Utc.with_ymd_and_hms(2023, 1, 1, 20, 0, 0).unwrap();
/// let scrobble = Scrobble::new("Radiohead", "Airbag", played_at)
///     .with_album("OK Computer")
///     .with_duration(Duration::from_secs(284));
///
/// assert_eq!(scrobble.unix_timestamp(), 1672603200);
/// assert_eq!(scrobble.album.as_deref(), Some("OK Computer"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scrobble {
    /// The artist name
    pub artist: String,
    /// The album name, if known or overridden by the user
    pub album: Option<String>,
    /// The track name
    pub track: String,
    /// The album artist, when it differs from the track artist
    pub album_artist: Option<String>,
    /// Track length, if known
    pub duration: Option<Duration>,
    /// When the track was played
    pub timestamp: DateTime<Utc>,
}

impl Scrobble {
    pub fn new(artist: impl Into<String>, track: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            artist: artist.into(),
            album: None,
            track: track.into(),
            album_artist: None,
            duration: None,
            timestamp,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_album_artist(mut self, album_artist: impl Into<String>) -> Self {
        self.album_artist = Some(album_artist.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Seconds since the Unix epoch, as expected by scrobbling APIs.
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Aggregate outcome of a scrobble submission.
///
/// The service reports one result for the whole batch, never per scrobble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrobbleResponse {
    /// Whether the service accepted the batch
    pub success: bool,
    /// Service status code or short status text
    pub status: String,
}

impl ScrobbleResponse {
    /// A successful response with the conventional `"ok"` status.
    pub fn ok() -> Self {
        Self {
            success: true,
            status: "ok".to_string(),
        }
    }

    /// A failed response carrying the service's status.
    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
        }
    }
}
