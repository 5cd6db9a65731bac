use crate::{Artist, Result, Scrobble, ScrobbleResponse, SetlistPage};
use async_trait::async_trait;

/// Free-text artist search.
///
/// Implemented by the host application on top of whatever music database it
/// talks to. Any error returned here is shown to the user as a status line.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides
/// `MockArtistSearchService` generated by `mockall`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait ArtistSearchService {
    /// Find artists whose name matches `query`.
    async fn search_artists(&self, query: &str) -> Result<Vec<Artist>>;
}

/// Setlist lookup by artist id.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait SetlistService {
    /// Fetch one page (1-indexed) of an artist's setlists, newest first.
    async fn get_setlists(&self, artist_id: &str, page: u32) -> Result<SetlistPage>;
}

/// Submission of listening events to the music-tracking service.
///
/// The whole batch is accepted or rejected together; implementations report
/// the aggregate outcome in [`ScrobbleResponse`].
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait Scrobbler {
    /// Submit `scrobbles` in the given order.
    async fn scrobble(&self, scrobbles: &[Scrobble]) -> Result<ScrobbleResponse>;
}
