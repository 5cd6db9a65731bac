use crate::csv_import::{self, CsvParseError, CsvParseResult};
use crate::events::{EventBroadcaster, FlowEvent, FlowEventReceiver};
use crate::r#trait::Scrobbler;
use crate::selection::{Selectable, SelectableList, SelectionOp};
use crate::state::{FlowKind, FlowState, FlowTracker};
use crate::{
    Clock, CsvImportConfig, Result, Scrobble, ScrobbleError, ScrobbleMode, SystemClock,
    TimestampAnchor, TrackCandidate,
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Parse a CSV file of plays and submit the chosen rows as scrobbles.
///
/// In [`ScrobbleMode::Normal`] each row keeps the time recorded in the file.
/// In [`ScrobbleMode::ImportMode`] the file's timestamps are ignored and the
/// selected rows get `start - i * step` in file order.
pub struct CsvScrobbleFlow {
    scrobbler: Arc<dyn Scrobbler>,
    clock: Arc<dyn Clock>,
    config: CsvImportConfig,
    tracker: FlowTracker,
    source: Option<PathBuf>,
    rows: SelectableList<TrackCandidate>,
    errors: Vec<CsvParseError>,
    start_time: Option<DateTime<Utc>>,
}

impl CsvScrobbleFlow {
    pub fn new(scrobbler: Arc<dyn Scrobbler>) -> Self {
        Self::with_broadcaster(scrobbler, Arc::new(EventBroadcaster::new()))
    }

    pub fn with_broadcaster(scrobbler: Arc<dyn Scrobbler>, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self {
            scrobbler,
            clock: Arc::new(SystemClock),
            config: CsvImportConfig::default(),
            tracker: FlowTracker::new(FlowKind::CsvImport, broadcaster),
            source: None,
            rows: SelectableList::new(),
            errors: Vec::new(),
            start_time: None,
        }
    }

    pub fn with_config(mut self, config: CsvImportConfig) -> Self {
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

    pub fn config(&self) -> &CsvImportConfig {
        &self.config
    }

    pub fn mode(&self) -> ScrobbleMode {
        self.config.mode
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn rows(&self) -> &[Selectable<TrackCandidate>] {
        self.rows.rows()
    }

    pub fn parse_errors(&self) -> &[CsvParseError] {
        &self.errors
    }

    /// Whether the user should be asked to export unparsable rows.
    pub fn should_offer_error_export(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Switch between literal and generated timestamps.
    ///
    /// Rows parsed under the previous mode are discarded and must be re-read.
    pub fn set_mode(&mut self, mode: ScrobbleMode) -> Result<()> {
        self.tracker.ensure_interactive("set_mode")?;
        if self.config.mode == mode {
            return Ok(());
        }
        self.config.mode = mode;
        self.clear_rows();
        self.tracker.transition(FlowState::Idle)?;
        self.tracker
            .set_status(format!("Switched to {mode:?}, reload the file to continue"));
        Ok(())
    }

    /// Spacing between generated timestamps in import mode.
    pub fn set_step(&mut self, step: Duration) -> Result<()> {
        self.tracker.ensure_interactive("set_step")?;
        self.config.step = step;
        Ok(())
    }

    /// Anchor for generated timestamps; `None` means "now" at submission time.
    pub fn set_start_time(&mut self, start: Option<DateTime<Utc>>) -> Result<()> {
        self.tracker.ensure_interactive("set_start_time")?;
        self.start_time = start;
        Ok(())
    }

    /// Parse `path` on a blocking task and replace the current rows.
    ///
    /// A file that cannot be read is reported in the status line and leaves
    /// the flow idle.
    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.tracker.ensure_interactive("load_file")?;
        let path = path.as_ref().to_path_buf();

        self.tracker.transition(FlowState::Fetching)?;
        self.tracker
            .set_status(format!("Parsing {}...", path.display()));
        self.clear_rows();

        let config = self.config.clone();
        let task_path = path.clone();
        let parsed = tokio::task::spawn_blocking(move || {
            csv_import::parse_csv_file(&task_path, &config)
        })
        .await
        .map_err(|e| ScrobbleError::Task(e.to_string()))
        .and_then(|result| result);

        match parsed {
            Ok(result) => {
                self.source = Some(path);
                self.accept(result);
                self.tracker.transition(FlowState::Ready)
            }
            Err(e) => {
                log::warn!("Reading {} failed: {e}", path.display());
                self.tracker
                    .set_status(format!("Error parsing CSV file: {e}"));
                self.tracker.transition(FlowState::Idle)
            }
        }
    }

    fn accept(&mut self, result: CsvParseResult) {
        let now = self.clock.now();
        let oldest = match (self.config.mode, self.config.max_scrobble_age) {
            (ScrobbleMode::Normal, Some(age)) => chrono::Duration::from_std(age)
                .ok()
                .and_then(|age| now.checked_sub_signed(age)),
            _ => None,
        };

        let mut disabled = 0;
        for candidate in result.rows {
            let enabled = match (oldest, candidate.played_at) {
                (Some(oldest), Some(played_at)) => played_at >= oldest,
                _ => true,
            };
            if !enabled {
                disabled += 1;
            }
            self.rows.push(candidate, enabled);
        }
        self.errors = result.errors;

        self.tracker.emit(FlowEvent::TracksLoaded {
            flow: FlowKind::CsvImport,
            count: self.rows.len(),
        });
        if !self.errors.is_empty() {
            self.tracker.emit(FlowEvent::ParseErrorsFound {
                count: self.errors.len(),
            });
        }

        let mut status = format!(
            "Parsed {} row(s), {} could not be parsed",
            self.rows.len(),
            self.errors.len()
        );
        if disabled > 0 {
            status.push_str(&format!(", {disabled} too old to scrobble"));
        }
        if self.rows.is_empty() {
            status = format!("No rows found, {} could not be parsed", self.errors.len());
        }
        self.tracker.set_status(status);
    }

    /// Write the unparsable rows to `path`, one raw line per line.
    ///
    /// Call only after the user confirmed the export.
    pub fn export_parse_errors(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.tracker.ensure_interactive("export_parse_errors")?;
        let path = path.as_ref();
        let written = csv_import::write_error_report(path, &self.errors)?;
        let mut status = format!("Saved {written} unparsable row(s) to {}", path.display());
        let skipped = self.errors.len() - written;
        if skipped > 0 {
            status.push_str(&format!(", {skipped} without source text"));
        }
        self.tracker.set_status(status);
        Ok(())
    }

    /// Default export location next to the loaded file.
    pub fn default_error_report_path(&self) -> Option<PathBuf> {
        self.source
            .as_deref()
            .map(csv_import::default_error_report_path)
    }

    pub fn update_selection(&mut self, op: SelectionOp) -> Result<()> {
        self.tracker.ensure_interactive("update_selection")?;
        self.rows.apply(op);
        self.emit_selection();
        Ok(())
    }

    pub fn set_row_selected(&mut self, index: usize, selected: bool) -> Result<bool> {
        self.tracker.ensure_interactive("set_row_selected")?;
        let changed = self.rows.set_selected(index, selected)?;
        self.emit_selection();
        Ok(changed)
    }

    pub fn set_row_checked(&mut self, index: usize, checked: bool) -> Result<bool> {
        self.tracker.ensure_interactive("set_row_checked")?;
        self.rows.set_checked(index, checked)
    }

    /// The scrobbles a submission would send right now, in file order.
    pub fn preview_scrobbles(&self) -> Result<Vec<Scrobble>> {
        match self.config.mode {
            ScrobbleMode::ImportMode => {
                let start = self.start_time.unwrap_or_else(|| self.clock.now());
                TimestampAnchor::starting_at(start, self.config.step)
                    .plan(self.rows.selected_items())
            }
            ScrobbleMode::Normal => Ok(self
                .rows
                .selected_items()
                .filter_map(|row| row.played_at.map(|played_at| row.to_scrobble(played_at)))
                .collect()),
        }
    }

    /// Submit the selected rows.
    pub async fn scrobble(&mut self) -> Result<()> {
        self.tracker.ensure_interactive("scrobble")?;
        let scrobbles = match self.preview_scrobbles() {
            Ok(scrobbles) => scrobbles,
            Err(e) => {
                log::warn!("Cannot plan CSV scrobbles: {e}");
                self.tracker.set_status(format!("Cannot assign timestamps: {e}"));
                return Ok(());
            }
        };
        if scrobbles.is_empty() {
            self.tracker.set_status("No rows selected to scrobble");
            return Ok(());
        }

        self.tracker.transition(FlowState::Submitting)?;
        self.tracker
            .set_status(format!("Scrobbling {} row(s)...", scrobbles.len()));

        let count = scrobbles.len();
        let success = match self.scrobbler.scrobble(&scrobbles).await {
            Ok(response) if response.success => {
                self.tracker
                    .set_status(format!("Successfully scrobbled {count} row(s)"));
                self.rows.apply(SelectionOp::DeselectAll);
                self.emit_selection();
                true
            }
            Ok(response) => {
                self.tracker
                    .set_status(format!("Error while scrobbling: {}", response.status));
                false
            }
            Err(e) => {
                log::warn!("Scrobbling {count} CSV rows failed: {e}");
                self.tracker.set_status(format!("Fatal error while scrobbling: {e}"));
                false
            }
        };

        self.tracker.emit(FlowEvent::ScrobblesSubmitted {
            flow: FlowKind::CsvImport,
            count,
            success,
        });
        self.tracker.transition(FlowState::Ready)
    }

    fn clear_rows(&mut self) {
        self.source = None;
        self.errors.clear();
        if !self.rows.is_empty() {
            self.rows.clear();
            self.tracker.emit(FlowEvent::TracksLoaded {
                flow: FlowKind::CsvImport,
                count: 0,
            });
        }
    }

    fn emit_selection(&self) {
        self.tracker.emit(FlowEvent::SelectionChanged {
            flow: FlowKind::CsvImport,
            selected: self.rows.selected_count(),
        });
    }
}
