//! Reading previously played tracks from CSV files.
//!
//! Field splitting is left to the `csv` crate. This module maps columns onto
//! [`TrackCandidate`]s according to [`CsvFieldMapping`](crate::CsvFieldMapping)
//! and keeps rows it cannot understand aside as [`CsvParseError`]s instead of
//! failing the whole file.

use crate::parsing::{parse_duration, parse_timestamp};
use crate::{CsvImportConfig, Result, ScrobbleMode, TrackCandidate};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// A row that could not be turned into a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvParseError {
    /// 1-indexed line number in the source file
    pub line: u64,
    /// The row as it appeared in the file
    pub raw: String,
    /// Why the row was rejected
    pub reason: String,
}

/// Parsed rows and rejected rows, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvParseResult {
    pub rows: Vec<TrackCandidate>,
    pub errors: Vec<CsvParseError>,
}

impl CsvParseResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Parse CSV data from any reader.
///
/// Only I/O failures abort the parse; every other problem is recorded per row
/// together with the row's text exactly as it appears in the source.
pub fn parse_csv<R: Read>(mut input: R, config: &CsvImportConfig) -> Result<CsvParseResult> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.has_headers)
        .flexible(true)
        .from_reader(data.as_slice());

    let mut result = CsvParseResult::default();
    let mut record = ByteRecord::new();
    loop {
        let before = reader.position().byte();
        let read = reader.read_byte_record(&mut record);
        let after = reader.position().byte();

        match read {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                let start = e.position().map_or(before, |p| p.byte());
                result.errors.push(CsvParseError {
                    line,
                    raw: source_text(&data, start, after),
                    reason: e.to_string(),
                });
                continue;
            }
        }

        let (line, start) = record
            .position()
            .map_or((0, before), |p| (p.line(), p.byte()));

        let parsed = StringRecord::from_byte_record(record.clone())
            .map_err(|e| format!("invalid UTF-8: {e}"))
            .and_then(|record| parse_row(&record, config));

        match parsed {
            Ok(candidate) => result.rows.push(candidate),
            Err(reason) => {
                log::debug!("Skipping CSV line {line}: {reason}");
                result.errors.push(CsvParseError {
                    line,
                    raw: source_text(&data, start, after),
                    reason,
                });
            }
        }
    }

    log::info!(
        "Parsed {} CSV rows, {} errors",
        result.rows.len(),
        result.errors.len()
    );
    Ok(result)
}

/// Parse a CSV file from disk.
pub fn parse_csv_file(path: &Path, config: &CsvImportConfig) -> Result<CsvParseResult> {
    log::debug!("Reading CSV file: {}", path.display());
    parse_csv(File::open(path)?, config)
}

/// Source bytes of one record, without surrounding line terminators.
fn source_text(data: &[u8], start: u64, end: u64) -> String {
    let start = usize::try_from(start).unwrap_or(data.len()).min(data.len());
    let end = usize::try_from(end).unwrap_or(data.len()).clamp(start, data.len());
    let bytes = &data[start..end];

    let is_terminator = |b: &u8| *b == b'\r' || *b == b'\n';
    let first = bytes.iter().position(|b| !is_terminator(b)).unwrap_or(bytes.len());
    let last = bytes.iter().rposition(|b| !is_terminator(b)).map_or(first, |i| i + 1);
    String::from_utf8_lossy(&bytes[first..last]).into_owned()
}

fn field(record: &StringRecord, index: usize) -> Option<&str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_row(record: &StringRecord, config: &CsvImportConfig) -> std::result::Result<TrackCandidate, String> {
    let fields = &config.fields;

    let artist = field(record, fields.artist).ok_or("missing artist")?;
    let track = field(record, fields.track).ok_or("missing track")?;

    let mut candidate = TrackCandidate::new(artist, track);
    candidate.album = field(record, fields.album).map(str::to_string);
    candidate.album_artist = field(record, fields.album_artist).map(str::to_string);

    if let Some(text) = field(record, fields.duration) {
        let duration = parse_duration(text).ok_or_else(|| format!("invalid duration '{text}'"))?;
        candidate.duration = Some(duration);
    }

    if config.mode == ScrobbleMode::Normal {
        let text = field(record, fields.timestamp).ok_or("missing timestamp")?;
        let played_at = parse_timestamp(text, config.timestamp_formats.as_slice())
            .ok_or_else(|| format!("invalid timestamp '{text}'"))?;
        candidate.played_at = Some(played_at);
    }

    Ok(candidate)
}

/// Write the source text of each rejected row, one row per line.
///
/// Rows without recoverable source text are left out. Returns how many rows
/// were written.
pub fn write_error_report(path: &Path, errors: &[CsvParseError]) -> Result<usize> {
    let mut contents = String::new();
    let mut written = 0;
    for error in errors {
        if error.raw.is_empty() {
            log::warn!("No source text for CSV line {}, not exported", error.line);
            continue;
        }
        contents.push_str(&error.raw);
        contents.push('\n');
        written += 1;
    }
    fs::write(path, contents)?;
    log::info!("Wrote {written} unparsable rows to {}", path.display());
    Ok(written)
}

/// `plays.csv` → `plays_errors.txt` next to the source file.
pub fn default_error_report_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scrobbles".to_string());
    csv_path.with_file_name(format!("{stem}_errors.txt"))
}
