mod common;

use common::{fixture, FixtureSetlists, RecordingScrobbler};
use scrobble_import::{
    CsvScrobbleFlow, EventBroadcaster, FlowEvent, FlowKind, FlowState, SetlistScrobbleFlow,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[test_log::test(tokio::test)]
async fn test_shared_broadcaster_across_flows() {
    let broadcaster = Arc::new(EventBroadcaster::new());
    let source = Arc::new(FixtureSetlists::load());
    let scrobbler = Arc::new(RecordingScrobbler::accepting());

    let mut setlist_flow = SetlistScrobbleFlow::with_broadcaster(
        source.clone(),
        source,
        scrobbler.clone(),
        broadcaster.clone(),
    );
    let mut csv_flow = CsvScrobbleFlow::with_broadcaster(scrobbler, broadcaster.clone());
    let independent = CsvScrobbleFlow::new(Arc::new(RecordingScrobbler::accepting()));

    let mut events = broadcaster.subscribe();
    assert!(setlist_flow.latest_event().is_none());

    setlist_flow.search_artists("wilco").await.unwrap();
    csv_flow.load_file(fixture("plays.csv")).await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let FlowEvent::StateChanged { flow, to, .. } = event {
            kinds.push((flow, to));
        }
    }
    assert_eq!(
        kinds,
        vec![
            (FlowKind::Setlist, FlowState::Fetching),
            (FlowKind::Setlist, FlowState::Ready),
            (FlowKind::CsvImport, FlowState::Fetching),
            (FlowKind::CsvImport, FlowState::Ready),
        ]
    );

    // Both flows see the same latest event; an unrelated flow sees nothing
    assert_eq!(setlist_flow.latest_event(), csv_flow.latest_event());
    assert!(independent.latest_event().is_none());
}

#[test_log::test(tokio::test)]
async fn test_watch_reports_latest_status() {
    let broadcaster = Arc::new(EventBroadcaster::new());
    let mut watcher = broadcaster.watch();
    let mut flow = CsvScrobbleFlow::with_broadcaster(
        Arc::new(RecordingScrobbler::accepting()),
        broadcaster.clone(),
    );

    flow.load_file(fixture("plays.csv")).await.unwrap();

    timeout(Duration::from_secs(1), watcher.changed())
        .await
        .expect("watch should be notified")
        .unwrap();
    assert!(matches!(
        &*watcher.borrow(),
        Some(FlowEvent::StateChanged {
            flow: FlowKind::CsvImport,
            to: FlowState::Ready,
            ..
        })
    ));
}
