mod common;

use common::{fixture, times, utc, RecordingScrobbler};
use scrobble_import::{
    CsvImportConfig, CsvScrobbleFlow, FixedClock, FlowEvent, FlowState, ScrobbleMode, SelectionOp,
};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

fn normal_flow(scrobbler: Arc<RecordingScrobbler>) -> CsvScrobbleFlow {
    CsvScrobbleFlow::new(scrobbler).with_clock(Arc::new(FixedClock(utc(2023, 1, 2, 12, 0, 0))))
}

#[test_log::test(tokio::test)]
async fn test_end_to_end_import_mode() {
    let scrobbler = Arc::new(RecordingScrobbler::accepting());
    let mut flow = CsvScrobbleFlow::new(scrobbler.clone()).with_config(
        CsvImportConfig::default()
            .with_mode(ScrobbleMode::ImportMode)
            .with_step(Duration::from_secs(30)),
    );

    flow.load_file(fixture("plays.csv")).await.unwrap();
    flow.set_start_time(Some(utc(2023, 1, 1, 10, 0, 0))).unwrap();
    flow.update_selection(SelectionOp::SelectAll).unwrap();
    flow.scrobble().await.unwrap();

    let batches = scrobbler.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        times(&batches[0]),
        vec!["10:00:00", "09:59:30", "09:59:00", "09:58:30"]
    );
    assert_eq!(batches[0][0].track, "Airbag");
    assert_eq!(batches[0][0].album_artist.as_deref(), Some("Radiohead"));
    assert_eq!(flow.status(), "Successfully scrobbled 4 row(s)");
}

#[test_log::test(tokio::test)]
async fn test_normal_mode_uses_recorded_timestamps() {
    let scrobbler = Arc::new(RecordingScrobbler::accepting());
    let mut flow = normal_flow(scrobbler.clone());

    flow.load_file(fixture("plays.csv")).await.unwrap();

    assert_eq!(flow.state(), FlowState::Ready);
    assert_eq!(flow.rows().len(), 4);
    assert!(flow.parse_errors().is_empty());
    assert!(!flow.should_offer_error_export());
    assert_eq!(flow.status(), "Parsed 4 row(s), 0 could not be parsed");

    flow.update_selection(SelectionOp::SelectAll).unwrap();
    flow.scrobble().await.unwrap();

    assert_eq!(
        times(&scrobbler.batches()[0]),
        vec!["09:00:00", "09:05:00", "09:11:00", "09:16:00"]
    );
}

#[test_log::test(tokio::test)]
async fn test_parse_errors_are_counted_and_exported_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let mut flow = normal_flow(Arc::new(RecordingScrobbler::accepting()));
    let mut events = flow.subscribe();

    flow.load_file(fixture("plays_with_errors.csv")).await.unwrap();

    assert_eq!(flow.rows().len(), 1);
    assert_eq!(flow.parse_errors().len(), 2);
    assert!(flow.should_offer_error_export());

    let mut reported = None;
    while let Ok(event) = events.try_recv() {
        if let FlowEvent::ParseErrorsFound { count } = event {
            reported = Some(count);
        }
    }
    assert_eq!(reported, Some(2));

    let report = dir.path().join("errors.txt");
    flow.export_parse_errors(&report).unwrap();

    let contents = fs::read_to_string(&report).unwrap();
    assert_eq!(
        contents.lines().collect::<Vec<_>>(),
        vec![
            ",OK Computer,Paranoid Android,2023-01-01 09:05:00,Radiohead,6:23",
            "Radiohead,OK Computer,Let Down,sometime,Radiohead,4:59",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_bulk_selection_operations() {
    let mut flow = normal_flow(Arc::new(RecordingScrobbler::accepting()));
    flow.load_file(fixture("plays.csv")).await.unwrap();

    flow.update_selection(SelectionOp::SelectAll).unwrap();
    assert_eq!(flow.preview_scrobbles().unwrap().len(), 4);

    flow.update_selection(SelectionOp::DeselectAll).unwrap();
    assert!(flow.preview_scrobbles().unwrap().is_empty());

    flow.set_row_checked(1, true).unwrap();
    flow.set_row_checked(3, true).unwrap();
    flow.update_selection(SelectionOp::SelectChecked).unwrap();

    let tracks: Vec<String> = flow
        .preview_scrobbles()
        .unwrap()
        .into_iter()
        .map(|s| s.track)
        .collect();
    assert_eq!(tracks, vec!["Paranoid Android", "Exit Music (For a Film)"]);

    flow.update_selection(SelectionOp::DeselectChecked).unwrap();
    assert!(flow.preview_scrobbles().unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_nothing_selected_does_not_submit() {
    let scrobbler = Arc::new(RecordingScrobbler::accepting());
    let mut flow = normal_flow(scrobbler.clone());
    flow.load_file(fixture("plays.csv")).await.unwrap();

    flow.scrobble().await.unwrap();

    assert!(scrobbler.batches().is_empty());
    assert_eq!(flow.status(), "No rows selected to scrobble");
}

#[test_log::test(tokio::test)]
async fn test_rows_past_the_age_limit_cannot_be_selected() {
    let mut flow = CsvScrobbleFlow::new(Arc::new(RecordingScrobbler::accepting()))
        .with_clock(Arc::new(FixedClock(utc(2023, 3, 1, 0, 0, 0))));
    flow.load_file(fixture("plays.csv")).await.unwrap();

    assert!(flow.rows().iter().all(|row| !row.enabled));
    assert!(!flow.set_row_selected(0, true).unwrap());

    flow.update_selection(SelectionOp::SelectAll).unwrap();
    assert!(flow.preview_scrobbles().unwrap().is_empty());
    assert_eq!(
        flow.status(),
        "Parsed 4 row(s), 0 could not be parsed, 4 too old to scrobble"
    );
}

#[test_log::test(tokio::test)]
async fn test_oversized_step_is_reported_without_submitting() {
    let scrobbler = Arc::new(RecordingScrobbler::accepting());
    let mut flow = CsvScrobbleFlow::new(scrobbler.clone()).with_config(
        CsvImportConfig::default()
            .with_mode(ScrobbleMode::ImportMode)
            .with_step(Duration::from_secs(u64::MAX)),
    );
    flow.load_file(fixture("plays.csv")).await.unwrap();
    flow.set_start_time(Some(utc(2023, 1, 1, 10, 0, 0))).unwrap();
    flow.update_selection(SelectionOp::SelectAll).unwrap();

    assert!(flow.preview_scrobbles().is_err());
    flow.scrobble().await.unwrap();

    assert!(scrobbler.batches().is_empty());
    assert_eq!(flow.state(), FlowState::Ready);
    assert!(flow
        .status()
        .starts_with("Cannot assign timestamps: Timestamp out of range"));
    assert!(flow.rows().iter().all(|row| row.selected));
}
