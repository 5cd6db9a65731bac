pub mod clock;
pub mod config;
pub mod csv_flow;
pub mod csv_import;
pub mod error;
pub mod events;
pub mod parsing;
pub mod scrobble;
pub mod selection;
pub mod setlist;
pub mod setlist_flow;
pub mod state;
pub mod timestamps;
pub mod track;
pub mod r#trait;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    AppConfig, ConfigPersistence, CsvFieldMapping, CsvImportConfig, ScrobbleMode, SetlistConfig,
};
pub use csv_flow::CsvScrobbleFlow;
pub use csv_import::{CsvParseError, CsvParseResult};
pub use error::ScrobbleError;
pub use events::{EventBroadcaster, FlowEvent, FlowEventReceiver, FlowEventWatcher};
pub use scrobble::{Scrobble, ScrobbleResponse};
pub use selection::{Selectable, SelectableList, SelectionOp};
pub use setlist::{Artist, City, Country, Setlist, SetlistPage, Sets, Song, SongSet, Tour, Venue};
pub use setlist_flow::{SetlistScrobbleFlow, SetlistView};
pub use state::{FlowKind, FlowState, FlowTracker};
pub use timestamps::{Direction, StepSize, TimestampAnchor, SETLIST_FALLBACK_DURATION};
pub use track::TrackCandidate;
pub use r#trait::{ArtistSearchService, Scrobbler, SetlistService};

#[cfg(any(test, feature = "mock"))]
pub use r#trait::{MockArtistSearchService, MockScrobbler, MockSetlistService};

pub type Result<T> = std::result::Result<T, ScrobbleError>;
