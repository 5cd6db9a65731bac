#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use scrobble_import::{
    Artist, ArtistSearchService, Result, Scrobble, ScrobbleError, ScrobbleResponse, Scrobbler,
    SetlistPage, SetlistService,
};
use std::path::PathBuf;
use std::sync::Mutex;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

pub fn times(scrobbles: &[Scrobble]) -> Vec<String> {
    scrobbles
        .iter()
        .map(|s| s.timestamp.format("%H:%M:%S").to_string())
        .collect()
}

/// Scrobbler recording every batch it receives.
pub struct RecordingScrobbler {
    batches: Mutex<Vec<Vec<Scrobble>>>,
    response: Mutex<Option<Result<ScrobbleResponse>>>,
}

impl RecordingScrobbler {
    pub fn accepting() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            response: Mutex::new(None),
        }
    }

    pub fn failing(error: ScrobbleError) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            response: Mutex::new(Some(Err(error))),
        }
    }

    pub fn batches(&self) -> Vec<Vec<Scrobble>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl Scrobbler for RecordingScrobbler {
    async fn scrobble(&self, scrobbles: &[Scrobble]) -> Result<ScrobbleResponse> {
        self.batches.lock().unwrap().push(scrobbles.to_vec());
        match self.response.lock().unwrap().take() {
            Some(response) => response,
            None => Ok(ScrobbleResponse::ok()),
        }
    }
}

/// Artist search and setlist lookup over the `wilco_setlists.json` fixture.
pub struct FixtureSetlists {
    page: SetlistPage,
    fail_with: Option<String>,
}

impl FixtureSetlists {
    pub fn load() -> Self {
        let json = std::fs::read_to_string(fixture("wilco_setlists.json")).unwrap();
        Self {
            page: SetlistPage::from_json(&json).unwrap(),
            fail_with: None,
        }
    }

    pub fn unreachable(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::load()
        }
    }

    fn check(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(ScrobbleError::Service(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl ArtistSearchService for FixtureSetlists {
    async fn search_artists(&self, query: &str) -> Result<Vec<Artist>> {
        self.check()?;
        let query = query.to_lowercase();
        let mut artists: Vec<Artist> = self
            .page
            .setlists
            .iter()
            .map(|setlist| setlist.artist.clone())
            .filter(|artist| artist.name.to_lowercase().contains(&query))
            .collect();
        artists.dedup_by(|a, b| a.id == b.id);
        Ok(artists)
    }
}

#[async_trait(?Send)]
impl SetlistService for FixtureSetlists {
    async fn get_setlists(&self, _artist_id: &str, page: u32) -> Result<SetlistPage> {
        self.check()?;
        Ok(SetlistPage {
            page,
            ..self.page.clone()
        })
    }
}
