use crate::events::{EventBroadcaster, FlowEvent, FlowEventReceiver};
use crate::r#trait::{ArtistSearchService, Scrobbler, SetlistService};
use crate::selection::{Selectable, SelectableList, SelectionOp};
use crate::state::{FlowKind, FlowState, FlowTracker};
use crate::{
    Artist, Clock, Result, Scrobble, ScrobbleError, SetlistConfig, SetlistPage, Setlist,
    SystemClock, TimestampAnchor, TrackCandidate,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Which list the setlist flow is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetlistView {
    Artists,
    Setlists,
    Tracks,
}

/// Artist search → setlist browsing → scrobbling a show's songs.
///
/// Remote failures never escape as errors: they are caught, written to the
/// status line and the flow returns to the state it was in before the call,
/// with the partial result discarded. Methods return `Err` only when called
/// in a state that forbids them or with an index that does not exist.
///
/// # Examples
///
/// ```rust,no_run
/// # use scrobble_import::{ArtistSearchService, Scrobbler, SetlistService, SetlistScrobbleFlow};
/// # use std::sync::Arc;
/// # async fn run(
/// #     search: Arc<dyn ArtistSearchService>,
/// #     setlists: Arc<dyn SetlistService>,
/// #     scrobbler: Arc<dyn Scrobbler>,
/// # ) -> scrobble_import::Result<()> {
/// let mut flow = SetlistScrobbleFlow::new(search, setlists, scrobbler);
///
/// flow.search_artists("Radiohead").await?;
/// flow.select_artist(0).await?;
/// flow.select_setlist(0)?;
/// flow.update_selection(scrobble_import::SelectionOp::SelectAll)?;
/// flow.scrobble().await?;
///
/// println!("{}", flow.status());
/// # Ok(())
/// # }
/// ```
pub struct SetlistScrobbleFlow {
    artist_search: Arc<dyn ArtistSearchService>,
    setlist_service: Arc<dyn SetlistService>,
    scrobbler: Arc<dyn Scrobbler>,
    clock: Arc<dyn Clock>,
    config: SetlistConfig,
    tracker: FlowTracker,
    view: SetlistView,
    artists: Vec<Artist>,
    selected_artist: Option<usize>,
    setlist_page: Option<SetlistPage>,
    selected_setlist: Option<usize>,
    tracks: SelectableList<TrackCandidate>,
    album: Option<String>,
    finished_at: Option<DateTime<Utc>>,
}

impl SetlistScrobbleFlow {
    pub fn new(
        artist_search: Arc<dyn ArtistSearchService>,
        setlist_service: Arc<dyn SetlistService>,
        scrobbler: Arc<dyn Scrobbler>,
    ) -> Self {
        Self::with_broadcaster(
            artist_search,
            setlist_service,
            scrobbler,
            Arc::new(EventBroadcaster::new()),
        )
    }

    /// Create a flow that publishes on an existing broadcaster.
    pub fn with_broadcaster(
        artist_search: Arc<dyn ArtistSearchService>,
        setlist_service: Arc<dyn SetlistService>,
        scrobbler: Arc<dyn Scrobbler>,
        broadcaster: Arc<EventBroadcaster>,
    ) -> Self {
        Self {
            artist_search,
            setlist_service,
            scrobbler,
            clock: Arc::new(SystemClock),
            config: SetlistConfig::default(),
            tracker: FlowTracker::new(FlowKind::Setlist, broadcaster),
            view: SetlistView::Artists,
            artists: Vec::new(),
            selected_artist: None,
            setlist_page: None,
            selected_setlist: None,
            tracks: SelectableList::new(),
            album: None,
            finished_at: None,
        }
    }

    pub fn with_config(mut self, config: SetlistConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> FlowEventReceiver {
        self.tracker.broadcaster().subscribe()
    }

    pub fn latest_event(&self) -> Option<FlowEvent> {
        self.tracker.broadcaster().latest_event()
    }

    pub fn state(&self) -> FlowState {
        self.tracker.state()
    }

    pub fn status(&self) -> &str {
        self.tracker.status()
    }

    pub fn view(&self) -> SetlistView {
        self.view
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn selected_artist(&self) -> Option<&Artist> {
        self.selected_artist.and_then(|index| self.artists.get(index))
    }

    pub fn setlists(&self) -> &[Setlist] {
        self.setlist_page
            .as_ref()
            .map(|page| page.setlists.as_slice())
            .unwrap_or_default()
    }

    pub fn setlist_page(&self) -> Option<&SetlistPage> {
        self.setlist_page.as_ref()
    }

    pub fn selected_setlist(&self) -> Option<&Setlist> {
        self.selected_setlist
            .and_then(|index| self.setlists().get(index))
    }

    pub fn tracks(&self) -> &[Selectable<TrackCandidate>] {
        self.tracks.rows()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    /// Album name applied to every submitted track; `None` leaves albums empty.
    pub fn set_album(&mut self, album: Option<String>) {
        self.album = album.filter(|album| !album.trim().is_empty());
    }

    /// When the last song ended; `None` means "now" at submission time.
    pub fn set_finished_at(&mut self, finished_at: Option<DateTime<Utc>>) {
        self.finished_at = finished_at;
    }

    /// Search for artists matching `query`, replacing the current artist list.
    pub async fn search_artists(&mut self, query: &str) -> Result<()> {
        self.tracker.ensure_interactive("search_artists")?;
        self.tracker.transition(FlowState::Fetching)?;
        self.tracker.set_status(format!("Searching for artist '{query}'..."));

        let result = self.artist_search.search_artists(query).await;

        self.clear_setlists();
        self.view = SetlistView::Artists;
        match result {
            Ok(artists) => {
                self.artists = artists;
                self.selected_artist = None;
                self.tracker.emit(FlowEvent::ArtistsLoaded {
                    count: self.artists.len(),
                });
                if self.artists.is_empty() {
                    self.tracker.set_status("No artists found");
                    self.tracker.transition(FlowState::Idle)
                } else {
                    self.tracker
                        .set_status(format!("Found {} artist(s)", self.artists.len()));
                    self.tracker.transition(FlowState::Ready)
                }
            }
            Err(e) => {
                log::warn!("Artist search for '{query}' failed: {e}");
                self.artists.clear();
                self.selected_artist = None;
                self.tracker.emit(FlowEvent::ArtistsLoaded { count: 0 });
                self.tracker
                    .set_status(format!("Error searching for artist: {e}"));
                self.tracker.transition(FlowState::Idle)
            }
        }
    }

    /// Pick an artist from the search results and load their first setlist page.
    pub async fn select_artist(&mut self, index: usize) -> Result<()> {
        self.tracker.ensure_interactive("select_artist")?;
        if index >= self.artists.len() {
            return Err(ScrobbleError::OutOfRange {
                index,
                len: self.artists.len(),
            });
        }
        self.selected_artist = Some(index);
        self.fetch_setlists(1).await
    }

    pub async fn next_setlist_page(&mut self) -> Result<()> {
        match &self.setlist_page {
            Some(page) if page.has_next_page() => self.fetch_setlists(page.page + 1).await,
            _ => Ok(()),
        }
    }

    pub async fn previous_setlist_page(&mut self) -> Result<()> {
        match &self.setlist_page {
            Some(page) if page.has_previous_page() => self.fetch_setlists(page.page - 1).await,
            _ => Ok(()),
        }
    }

    async fn fetch_setlists(&mut self, page: u32) -> Result<()> {
        self.tracker.ensure_interactive("fetch_setlists")?;
        let Some(artist) = self.selected_artist().cloned() else {
            return Err(ScrobbleError::NotSelected("artist"));
        };

        self.tracker.transition(FlowState::Fetching)?;
        self.tracker
            .set_status(format!("Fetching setlists of '{}'...", artist.name));

        let result = self.setlist_service.get_setlists(&artist.id, page).await;

        self.clear_setlists();
        match result {
            Ok(setlist_page) => {
                self.tracker.emit(FlowEvent::SetlistsLoaded {
                    count: setlist_page.setlists.len(),
                    page: setlist_page.page,
                    total_pages: setlist_page.total_pages(),
                });
                if setlist_page.setlists.is_empty() {
                    self.view = SetlistView::Artists;
                    self.tracker
                        .set_status(format!("No setlists found for '{}'", artist.name));
                } else {
                    self.tracker.set_status(format!(
                        "Found {} setlist(s), page {} of {}",
                        setlist_page.setlists.len(),
                        setlist_page.page,
                        setlist_page.total_pages()
                    ));
                    self.setlist_page = Some(setlist_page);
                    self.view = SetlistView::Setlists;
                }
            }
            Err(e) => {
                log::warn!("Fetching setlists for '{}' failed: {e}", artist.name);
                self.view = SetlistView::Artists;
                self.tracker
                    .set_status(format!("Error fetching setlists: {e}"));
            }
        }
        self.tracker.transition(FlowState::Ready)
    }

    /// Pick a setlist and flatten its sets into the track list.
    pub fn select_setlist(&mut self, index: usize) -> Result<()> {
        self.tracker.ensure_interactive("select_setlist")?;
        let Some(setlist) = self.setlists().get(index) else {
            return Err(ScrobbleError::OutOfRange {
                index,
                len: self.setlists().len(),
            });
        };

        let candidates = setlist.to_candidates();
        let title = setlist.title();
        self.selected_setlist = Some(index);
        self.tracks = SelectableList::from_items(candidates);
        self.view = SetlistView::Tracks;
        self.tracker.emit(FlowEvent::TracksLoaded {
            flow: FlowKind::Setlist,
            count: self.tracks.len(),
        });

        if self.tracks.is_empty() {
            self.tracker.set_status(format!("No tracks found in {title}"));
        } else {
            self.tracker
                .set_status(format!("Loaded {} track(s) from {title}", self.tracks.len()));
        }
        Ok(())
    }

    /// Leave the current list, discarding it.
    pub fn back(&mut self) -> Result<()> {
        self.tracker.ensure_interactive("back")?;
        match self.view {
            SetlistView::Tracks => {
                self.clear_tracks();
                self.view = SetlistView::Setlists;
            }
            SetlistView::Setlists => {
                self.clear_setlists();
                self.view = SetlistView::Artists;
            }
            SetlistView::Artists => {}
        }
        Ok(())
    }

    pub fn update_selection(&mut self, op: SelectionOp) -> Result<()> {
        self.tracker.ensure_interactive("update_selection")?;
        self.tracks.apply(op);
        self.emit_selection();
        Ok(())
    }

    pub fn set_track_selected(&mut self, index: usize, selected: bool) -> Result<bool> {
        self.tracker.ensure_interactive("set_track_selected")?;
        let changed = self.tracks.set_selected(index, selected)?;
        self.emit_selection();
        Ok(changed)
    }

    pub fn set_track_checked(&mut self, index: usize, checked: bool) -> Result<bool> {
        self.tracker.ensure_interactive("set_track_checked")?;
        self.tracks.set_checked(index, checked)
    }

    /// Override the length of one track; `None` falls back to the configured spacing.
    pub fn set_track_duration(&mut self, index: usize, duration: Option<Duration>) -> Result<()> {
        self.tracker.ensure_interactive("set_track_duration")?;
        self.tracks.item_mut(index)?.duration = duration;
        Ok(())
    }

    /// The scrobbles a submission would send right now, in performance order.
    pub fn preview_scrobbles(&self) -> Result<Vec<Scrobble>> {
        let finished_at = self.finished_at.unwrap_or_else(|| self.clock.now());
        let anchor = TimestampAnchor::finishing_at(finished_at, self.config.fallback_duration);

        Ok(anchor
            .plan(self.tracks.selected_items())?
            .into_iter()
            .map(|mut scrobble| {
                if let Some(album) = &self.album {
                    scrobble.album = Some(album.clone());
                }
                scrobble
            })
            .collect())
    }

    /// Submit the selected tracks with timestamps ending at the finishing time.
    pub async fn scrobble(&mut self) -> Result<()> {
        self.tracker.ensure_interactive("scrobble")?;
        let scrobbles = match self.preview_scrobbles() {
            Ok(scrobbles) => scrobbles,
            Err(e) => {
                log::warn!("Cannot plan setlist scrobbles: {e}");
                self.tracker.set_status(format!("Cannot assign timestamps: {e}"));
                return Ok(());
            }
        };
        if scrobbles.is_empty() {
            self.tracker.set_status("No tracks selected to scrobble");
            return Ok(());
        }

        self.tracker.transition(FlowState::Submitting)?;
        self.tracker
            .set_status(format!("Scrobbling {} track(s)...", scrobbles.len()));

        let count = scrobbles.len();
        let success = match self.scrobbler.scrobble(&scrobbles).await {
            Ok(response) if response.success => {
                self.tracker
                    .set_status(format!("Successfully scrobbled {count} track(s)"));
                self.tracks.apply(SelectionOp::DeselectAll);
                self.emit_selection();
                true
            }
            Ok(response) => {
                self.tracker
                    .set_status(format!("Error while scrobbling: {}", response.status));
                false
            }
            Err(e) => {
                log::warn!("Scrobbling {count} setlist tracks failed: {e}");
                self.tracker.set_status(format!("Fatal error while scrobbling: {e}"));
                false
            }
        };

        self.tracker.emit(FlowEvent::ScrobblesSubmitted {
            flow: FlowKind::Setlist,
            count,
            success,
        });
        self.tracker.transition(FlowState::Ready)
    }

    fn clear_setlists(&mut self) {
        self.setlist_page = None;
        self.selected_setlist = None;
        self.clear_tracks();
    }

    fn clear_tracks(&mut self) {
        self.selected_setlist = None;
        if !self.tracks.is_empty() {
            self.tracks.clear();
            self.tracker.emit(FlowEvent::TracksLoaded {
                flow: FlowKind::Setlist,
                count: 0,
            });
        }
    }

    fn emit_selection(&self) {
        self.tracker.emit(FlowEvent::SelectionChanged {
            flow: FlowKind::Setlist,
            selected: self.tracks.selected_count(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#trait::{MockArtistSearchService, MockScrobbler, MockSetlistService};
    use crate::{ScrobbleResponse, Sets, Song, SongSet};
    use chrono::TimeZone;

    fn artist(name: &str) -> Artist {
        Artist {
            id: format!("{name}-mbid"),
            name: name.to_string(),
            sort_name: None,
            image: None,
        }
    }

    fn setlist(artist_name: &str, songs: &[&str]) -> Setlist {
        Setlist {
            id: "s1".to_string(),
            event_date: Some("01-01-2023".to_string()),
            artist: artist(artist_name),
            venue: None,
            tour: None,
            sets: Sets {
                set: vec![SongSet {
                    name: None,
                    encore: None,
                    songs: songs
                        .iter()
                        .map(|name| Song {
                            name: name.to_string(),
                            tape: false,
                            info: None,
                        })
                        .collect(),
                }],
            },
        }
    }

    fn flow_with(
        search: MockArtistSearchService,
        setlists: MockSetlistService,
        scrobbler: MockScrobbler,
    ) -> SetlistScrobbleFlow {
        SetlistScrobbleFlow::new(Arc::new(search), Arc::new(setlists), Arc::new(scrobbler))
    }

    #[tokio::test]
    async fn test_search_failure_sets_status_and_returns_to_idle() {
        let mut search = MockArtistSearchService::new();
        search
            .expect_search_artists()
            .times(1)
            .returning(|_| Err(ScrobbleError::Service("timeout".to_string())));

        let mut flow = flow_with(search, MockSetlistService::new(), MockScrobbler::new());
        flow.search_artists("Wilco").await.unwrap();

        assert_eq!(flow.state(), FlowState::Idle);
        assert!(flow.artists().is_empty());
        assert_eq!(flow.status(), "Error searching for artist: Service error: timeout");
    }

    #[tokio::test]
    async fn test_empty_search_is_informational() {
        let mut search = MockArtistSearchService::new();
        search.expect_search_artists().returning(|_| Ok(vec![]));

        let mut flow = flow_with(search, MockSetlistService::new(), MockScrobbler::new());
        flow.search_artists("zzzz").await.unwrap();

        assert_eq!(flow.state(), FlowState::Idle);
        assert_eq!(flow.status(), "No artists found");
    }

    #[tokio::test]
    async fn test_full_flow_assigns_backward_timestamps() {
        let mut search = MockArtistSearchService::new();
        search
            .expect_search_artists()
            .returning(|_| Ok(vec![artist("Wilco")]));

        let mut setlists = MockSetlistService::new();
        setlists
            .expect_get_setlists()
            .withf(|artist_id, page| artist_id == "Wilco-mbid" && *page == 1)
            .returning(|_, _| {
                Ok(SetlistPage {
                    setlists: vec![setlist("Wilco", &["A", "B", "C"])],
                    page: 1,
                    total: 1,
                    items_per_page: 20,
                })
            });

        let mut scrobbler = MockScrobbler::new();
        scrobbler
            .expect_scrobble()
            .times(1)
            .returning(|_| Ok(ScrobbleResponse::ok()));

        let mut flow = flow_with(search, setlists, scrobbler);
        flow.search_artists("Wilco").await.unwrap();
        flow.select_artist(0).await.unwrap();
        assert_eq!(flow.view(), SetlistView::Setlists);
        flow.select_setlist(0).unwrap();
        assert_eq!(flow.view(), SetlistView::Tracks);

        flow.set_track_duration(0, Some(Duration::from_secs(180))).unwrap();
        flow.set_track_duration(2, Some(Duration::from_secs(240))).unwrap();
        flow.set_finished_at(Some(Utc.with_ymd_and_hms(2023, 1, 1, 20, 0, 0).unwrap()));
        flow.update_selection(SelectionOp::SelectAll).unwrap();

        let preview = flow.preview_scrobbles().unwrap();
        let times: Vec<String> = preview
            .iter()
            .map(|s| s.timestamp.format("%H:%M:%S").to_string())
            .collect();
        assert_eq!(times, vec!["19:53:00", "19:56:00", "20:00:00"]);

        flow.scrobble().await.unwrap();
        assert_eq!(flow.state(), FlowState::Ready);
        assert_eq!(flow.status(), "Successfully scrobbled 3 track(s)");
        assert!(flow.tracks().iter().all(|row| !row.selected));
    }

    #[tokio::test]
    async fn test_nothing_selected_does_not_call_scrobbler() {
        let mut scrobbler = MockScrobbler::new();
        scrobbler.expect_scrobble().times(0);

        let mut flow = flow_with(
            MockArtistSearchService::new(),
            MockSetlistService::new(),
            scrobbler,
        );
        flow.scrobble().await.unwrap();

        assert_eq!(flow.state(), FlowState::Idle);
        assert_eq!(flow.status(), "No tracks selected to scrobble");
    }

    #[test]
    fn test_track_edits_need_a_loaded_setlist() {
        let mut flow = flow_with(
            MockArtistSearchService::new(),
            MockSetlistService::new(),
            MockScrobbler::new(),
        );

        assert!(flow.set_track_duration(0, None).is_err());
        tokio_test::block_on(flow.next_setlist_page()).unwrap();
        assert_eq!(flow.view(), SetlistView::Artists);
        assert!(flow.preview_scrobbles().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetching_setlists_needs_an_artist() {
        let mut setlists = MockSetlistService::new();
        setlists.expect_get_setlists().times(0);

        let mut flow = flow_with(MockArtistSearchService::new(), setlists, MockScrobbler::new());

        assert!(matches!(
            flow.fetch_setlists(1).await,
            Err(ScrobbleError::NotSelected("artist"))
        ));
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_oversized_fallback_is_reported_without_submitting() {
        let mut search = MockArtistSearchService::new();
        search
            .expect_search_artists()
            .returning(|_| Ok(vec![artist("Wilco")]));
        let mut setlists = MockSetlistService::new();
        setlists.expect_get_setlists().returning(|_, _| {
            Ok(SetlistPage {
                setlists: vec![setlist("Wilco", &["A", "B"])],
                page: 1,
                total: 1,
                items_per_page: 20,
            })
        });
        let mut scrobbler = MockScrobbler::new();
        scrobbler.expect_scrobble().times(0);

        let mut flow = flow_with(search, setlists, scrobbler)
            .with_config(SetlistConfig::default().with_fallback_duration(Duration::from_secs(u64::MAX)));
        flow.search_artists("Wilco").await.unwrap();
        flow.select_artist(0).await.unwrap();
        flow.select_setlist(0).unwrap();
        flow.update_selection(SelectionOp::SelectAll).unwrap();

        flow.scrobble().await.unwrap();

        assert_eq!(flow.state(), FlowState::Ready);
        assert!(flow.status().starts_with("Cannot assign timestamps: Timestamp out of range"));
        assert!(flow.tracks().iter().all(|row| row.selected));
    }

    #[tokio::test]
    async fn test_select_artist_out_of_range() {
        let mut flow = flow_with(
            MockArtistSearchService::new(),
            MockSetlistService::new(),
            MockScrobbler::new(),
        );

        assert!(matches!(
            flow.select_artist(3).await,
            Err(ScrobbleError::OutOfRange { index: 3, len: 0 })
        ));
    }
}
