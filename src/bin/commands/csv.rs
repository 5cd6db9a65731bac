use super::utils::{parse_time, PrintScrobbler};
use scrobble_import::{CsvImportConfig, CsvScrobbleFlow, ScrobbleMode, SelectionOp};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct CsvOptions {
    pub file: PathBuf,
    pub mode: Option<ScrobbleMode>,
    pub step: Option<u64>,
    pub start: Option<String>,
    pub delimiter: Option<char>,
    pub headers: bool,
    /// `Some(empty)` exports next to the input file
    pub export_errors: Option<String>,
}

/// Parse a CSV file and print the scrobbles its rows would produce.
pub async fn handle_csv(
    mut config: CsvImportConfig,
    options: CsvOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(mode) = options.mode {
        config = config.with_mode(mode);
    }
    if let Some(step) = options.step {
        config = config.with_step(Duration::from_secs(step));
    }
    if let Some(delimiter) = options.delimiter {
        let delimiter = u8::try_from(delimiter)
            .map_err(|_| format!("delimiter '{delimiter}' must be a single byte"))?;
        config = config.with_delimiter(delimiter);
    }
    if options.headers {
        config = config.with_headers(true);
    }

    let mut flow = CsvScrobbleFlow::new(Arc::new(PrintScrobbler)).with_config(config);
    if let Some(start) = &options.start {
        flow.set_start_time(Some(parse_time(start)?))?;
    }

    println!("📄 Reading {}...", options.file.display());
    flow.load_file(&options.file).await?;
    println!("{}", flow.status());

    if flow.should_offer_error_export() {
        for error in flow.parse_errors() {
            println!("  ⚠️  line {}: {}", error.line, error.reason);
        }
        match &options.export_errors {
            Some(path) => {
                let path = if path.is_empty() {
                    flow.default_error_report_path()
                        .ok_or("no file loaded to export errors from")?
                } else {
                    PathBuf::from(path)
                };
                flow.export_parse_errors(&path)?;
                println!("💾 {}", flow.status());
            }
            None => println!("   (use --export-errors to save these rows)"),
        }
    }

    let disabled = flow.rows().iter().filter(|row| !row.enabled).count();
    if disabled > 0 {
        println!("⏳ Skipping {disabled} row(s) older than the scrobble age limit");
    }

    flow.update_selection(SelectionOp::SelectAll)?;
    flow.scrobble().await?;
    println!("✅ {}", flow.status());
    Ok(())
}
