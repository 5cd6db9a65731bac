pub mod config;
pub mod csv;
pub mod setlist;
pub mod utils;

use clap::{Subcommand, ValueEnum};
use scrobble_import::{AppConfig, ScrobbleMode};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy)]
pub enum ModeArg {
    /// Use the timestamp recorded in each row
    Normal,
    /// Ignore recorded timestamps and generate a sequence from --start
    Import,
}

impl From<ModeArg> for ScrobbleMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => ScrobbleMode::Normal,
            ModeArg::Import => ScrobbleMode::ImportMode,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show,
    /// Write the default configuration to the config directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan scrobbles from a CSV file of previously played tracks
    ///
    /// Columns default to: Artist, Album, Track, Timestamp, AlbumArtist, Duration.
    ///
    /// Usage examples:
    /// # Use the timestamps recorded in the file
    /// scrobble-import csv plays.csv
    ///
    /// # Ignore recorded timestamps, space rows 30 seconds apart
    /// scrobble-import csv plays.csv --mode import --start 2023-01-01T10:00:00Z --step 30
    ///
    /// # Save unparsable rows next to the input file
    /// scrobble-import csv plays.csv --export-errors
    Csv {
        /// CSV file to read
        file: PathBuf,

        /// How timestamps are obtained
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Seconds between generated timestamps (import mode)
        #[arg(long)]
        step: Option<u64>,

        /// First generated timestamp, RFC 3339 (import mode, defaults to now)
        #[arg(long)]
        start: Option<String>,

        /// Field delimiter
        #[arg(long)]
        delimiter: Option<char>,

        /// Skip the first row
        #[arg(long)]
        headers: bool,

        /// Write unparsable rows to a text file (next to the input unless a path is given)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export_errors: Option<String>,
    },

    /// Plan scrobbles for a concert from a setlist.fm JSON export
    ///
    /// The file holds one page of a setlist search response. Artists are
    /// taken from the setlists it contains.
    ///
    /// Usage examples:
    /// # List the artists and setlists in the export
    /// scrobble-import setlist wilco.json --artist wilco
    ///
    /// # Scrobble the second setlist, finishing at 23:00
    /// scrobble-import setlist wilco.json --artist wilco --setlist 1 --finished 2023-01-01T23:00:00Z
    Setlist {
        /// setlist.fm JSON file
        file: PathBuf,

        /// Artist name to search for
        #[arg(long, default_value = "")]
        artist: String,

        /// Which matching artist to use (0-based)
        #[arg(long, default_value = "0")]
        artist_index: usize,

        /// Which setlist to scrobble (0-based); lists setlists when omitted
        #[arg(long)]
        setlist: Option<usize>,

        /// When the show finished, RFC 3339 (defaults to now)
        #[arg(long)]
        finished: Option<String>,

        /// Album name to attach to every track
        #[arg(long)]
        album: Option<String>,

        /// Seconds assumed for each song
        #[arg(long)]
        fallback: Option<u64>,
    },

    /// Show or initialise the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

pub async fn execute_command(
    command: Commands,
    config: AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Csv {
            file,
            mode,
            step,
            start,
            delimiter,
            headers,
            export_errors,
        } => {
            let options = csv::CsvOptions {
                file,
                mode: mode.map(ScrobbleMode::from),
                step,
                start,
                delimiter,
                headers,
                export_errors,
            };
            csv::handle_csv(config.csv, options).await
        }
        Commands::Setlist {
            file,
            artist,
            artist_index,
            setlist,
            finished,
            album,
            fallback,
        } => {
            let options = setlist::SetlistOptions {
                file,
                artist,
                artist_index,
                setlist,
                finished,
                album,
                fallback,
            };
            setlist::handle_setlist(config.setlist, options).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => config::handle_show(&config),
            ConfigCommands::Init { force } => config::handle_init(force),
        },
    }
}
