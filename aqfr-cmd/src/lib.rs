//! Command implementations for AQFR CLI.
//!
//! Provides subcommands for downloading and processing LCSQA daily files
//! and for inspecting stations, aggregates and heat maps.

use aqfr_utils::dates::parse_date;
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::PathBuf;

pub mod annotate;
pub mod ingest;
pub mod inspect;

#[derive(Subcommand)]
pub enum Command {
    /// Download raw LCSQA daily files
    Fetch {
        /// First day to download (YYYY-MM-DD)
        #[arg(short = 'b', long, value_parser = parse_date)]
        begin: NaiveDate,

        /// Last day to download (YYYY-MM-DD)
        #[arg(short = 'e', long, value_parser = parse_date)]
        end: NaiveDate,

        /// Directory holding the daily tables
        #[arg(short = 'd', long, env = "AQFR_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
    },

    /// Summarize raw daily files into processed day tables
    Process {
        #[arg(short = 'b', long, value_parser = parse_date)]
        begin: NaiveDate,

        #[arg(short = 'e', long, value_parser = parse_date)]
        end: NaiveDate,

        #[arg(short = 'd', long, env = "AQFR_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Station registry CSV
        #[arg(
            short = 's',
            long,
            env = "AQFR_STATIONS_CSV",
            default_value = "data/stations_coords_processed.csv"
        )]
        stations_csv: PathBuf,

        /// Delete each raw file once processed
        #[arg(long)]
        remove_raw: bool,
    },

    /// Print the county / city / station tree
    Stations {
        /// Only show counties whose name contains this term
        #[arg(short = 'c', long)]
        county: Option<String>,

        #[arg(
            short = 's',
            long,
            env = "AQFR_STATIONS_CSV",
            default_value = "data/stations_coords_processed.csv"
        )]
        stations_csv: PathBuf,
    },

    /// Print the aggregate of one station as JSON
    Station {
        /// Station id (e.g. FR04002)
        #[arg(short = 'i', long)]
        id: String,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(short = 'D', long, value_parser = parse_date)]
        date: NaiveDate,

        /// Number of days before `date` to include
        #[arg(short = 'r', long, default_value_t = aqfr_data::session::DEFAULT_DAY_RANGE)]
        range: u32,

        #[arg(short = 'd', long, env = "AQFR_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        #[arg(
            short = 's',
            long,
            env = "AQFR_STATIONS_CSV",
            default_value = "data/stations_coords_processed.csv"
        )]
        stations_csv: PathBuf,
    },

    /// Print the heat map of one day as JSON
    Heatmap {
        #[arg(short = 'D', long, value_parser = parse_date)]
        date: NaiveDate,

        #[arg(short = 'd', long, env = "AQFR_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        #[arg(
            short = 's',
            long,
            env = "AQFR_STATIONS_CSV",
            default_value = "data/stations_coords_processed.csv"
        )]
        stations_csv: PathBuf,
    },

    /// Add the nearby airports column to a station coordinates CSV
    Airports {
        /// Airports CSV (Name,Latitude,Longitude)
        #[arg(short = 'a', long)]
        airports_csv: PathBuf,

        /// Station coordinates CSV (Station ID,Latitude,Longitude)
        #[arg(short = 'c', long)]
        coords_csv: PathBuf,

        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Add commune and department columns via geo.api.gouv.fr
    Enrich {
        /// Station CSV with airports (Station ID,Latitude,Longitude,Airport)
        #[arg(short = 'c', long)]
        coords_csv: PathBuf,

        #[arg(short = 'o', long)]
        output: PathBuf,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Fetch {
            begin,
            end,
            data_dir,
        } => ingest::run_fetch(begin, end, &data_dir).await,
        Command::Process {
            begin,
            end,
            data_dir,
            stations_csv,
            remove_raw,
        } => ingest::run_process(begin, end, &data_dir, &stations_csv, remove_raw),
        Command::Stations {
            county,
            stations_csv,
        } => inspect::run_stations(&stations_csv, county.as_deref()),
        Command::Station {
            id,
            date,
            range,
            data_dir,
            stations_csv,
        } => inspect::run_station(&id, date, range, &data_dir, &stations_csv),
        Command::Heatmap {
            date,
            data_dir,
            stations_csv,
        } => inspect::run_heatmap(date, &data_dir, &stations_csv),
        Command::Airports {
            airports_csv,
            coords_csv,
            output,
        } => annotate::run_airports(&airports_csv, &coords_csv, &output),
        Command::Enrich { coords_csv, output } => annotate::run_enrich(&coords_csv, &output).await,
    }
}
