use super::utils::{parse_time, OfflineSetlists, PrintScrobbler};
use scrobble_import::{SelectionOp, SetlistConfig, SetlistScrobbleFlow, SetlistView};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct SetlistOptions {
    pub file: PathBuf,
    pub artist: String,
    pub artist_index: usize,
    pub setlist: Option<usize>,
    pub finished: Option<String>,
    pub album: Option<String>,
    pub fallback: Option<u64>,
}

/// Walk the setlist flow over a saved setlist.fm page.
///
/// Without `--setlist` only the matching artists and their setlists are listed.
pub async fn handle_setlist(
    mut config: SetlistConfig,
    options: SetlistOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(fallback) = options.fallback {
        config = config.with_fallback_duration(Duration::from_secs(fallback));
    }

    let source = Arc::new(OfflineSetlists::from_file(&options.file)?);
    let mut flow = SetlistScrobbleFlow::new(source.clone(), source, Arc::new(PrintScrobbler))
        .with_config(config);

    flow.search_artists(&options.artist).await?;
    println!("🔍 {}", flow.status());
    for (index, artist) in flow.artists().iter().enumerate() {
        println!("  [{index}] {}", artist.name);
    }
    if flow.artists().is_empty() {
        return Ok(());
    }

    flow.select_artist(options.artist_index).await?;
    println!("📋 {}", flow.status());
    if flow.view() != SetlistView::Setlists {
        return Ok(());
    }
    for (index, setlist) in flow.setlists().iter().enumerate() {
        println!("  [{index}] {}", setlist.title());
    }

    let Some(setlist_index) = options.setlist else {
        println!("   (use --setlist <index> to scrobble one of these)");
        return Ok(());
    };

    flow.select_setlist(setlist_index)?;
    println!("🎤 {}", flow.status());

    flow.set_album(options.album);
    if let Some(finished) = &options.finished {
        flow.set_finished_at(Some(parse_time(finished)?));
    }

    flow.update_selection(SelectionOp::SelectAll)?;
    flow.scrobble().await?;
    println!("✅ {}", flow.status());
    Ok(())
}
