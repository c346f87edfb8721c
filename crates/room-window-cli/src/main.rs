//! `room-window` CLI — query bookable study-room windows from a saved grid.
//!
//! ## Usage
//!
//! ```sh
//! # Rooms that can host 09:00–10:30 (grid read from stdin)
//! room-window runs -c library.json --start "2024-03-01 09:00" --end "2024-03-01 10:30" < grid.json
//!
//! # Start candidates for a day, and end candidates for a chosen start
//! room-window candidates -c library.json -g grid.json --date 2024-03-01 --start "2024-03-01 09:00"
//!
//! # Complete a selection into a reservation
//! room-window reserve -c library.json -g grid.json --start "2024-03-01 09:00" --end "2024-03-01 10:00" --room 101
//!
//! # Print the grid request for a location and day
//! room-window request -c library.json --date 2024-03-01
//! ```
//!
//! Set `RUST_LOG=debug` to trace selection transitions on stderr.

use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use room_window::libcal::{self, FORM_CONTENT_TYPE};
use room_window::{AvailabilityRequest, Catalog, EngineConfig, RefreshOutcome, Session};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "room-window",
    version,
    about = "Find bookable study-room windows in a LibCal availability grid"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine config file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(clap::Args)]
struct GridArgs {
    /// Room catalog file (JSON)
    #[arg(short, long)]
    catalog: String,
    /// Saved grid response (reads from stdin if omitted)
    #[arg(short, long)]
    grid: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List rooms whose slots exactly cover a window
    Runs {
        #[command(flatten)]
        grid: GridArgs,
        /// Window start, e.g. "2024-03-01 09:00"
        #[arg(long, value_parser = parse_instant)]
        start: NaiveDateTime,
        /// Window end, e.g. "2024-03-01 10:30"
        #[arg(long, value_parser = parse_instant)]
        end: NaiveDateTime,
    },
    /// Show start candidates for a day, and end candidates for a start
    Candidates {
        #[command(flatten)]
        grid: GridArgs,
        /// Day to book, e.g. "2024-03-01"
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Chosen start time
        #[arg(long, value_parser = parse_instant)]
        start: Option<NaiveDateTime>,
    },
    /// Resolve a full selection into a reservation
    Reserve {
        #[command(flatten)]
        grid: GridArgs,
        #[arg(long, value_parser = parse_instant)]
        start: NaiveDateTime,
        #[arg(long, value_parser = parse_instant)]
        end: NaiveDateTime,
        /// Room id from the catalog
        #[arg(long)]
        room: u32,
    },
    /// Print the grid endpoint and form body for a day
    Request {
        /// Room catalog file (JSON), for the location id and base URL
        #[arg(short, long)]
        catalog: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Last day of the range (defaults to the day after --date)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 0)]
        page_index: u32,
    },
}

#[derive(Serialize)]
struct RoomRun {
    room_id: u32,
    room: String,
    floor: i32,
    capacity: u32,
    slot_tokens: Vec<String>,
}

#[derive(Serialize)]
struct Candidates {
    start_candidates: Vec<NaiveDateTime>,
    end_candidates: Vec<NaiveDateTime>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => EngineConfig::load(path).with_context(|| format!("Failed to load config: {}", path))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Runs { grid, start, end } => {
            let session = load_session(&grid, config)?;
            let runs: Vec<RoomRun> = session
                .find_covering_runs(start, end)
                .into_iter()
                .filter_map(|(room_id, run)| {
                    let first = run.first()?;
                    Some(RoomRun {
                        room_id,
                        room: first.room.name.clone(),
                        floor: first.room.floor.level,
                        capacity: first.room.capacity.maximum,
                        slot_tokens: run.iter().map(|s| s.identity_token.clone()).collect(),
                    })
                })
                .collect();
            print_json(&runs)?;
        }
        Commands::Candidates { grid, date, start } => {
            let session = load_session(&grid, config)?;
            let mut snapshot = session.set_date(date);
            if let Some(start) = start {
                snapshot = session.set_start_time(start);
            }
            print_json(&Candidates {
                start_candidates: snapshot.selection.start_candidates().to_vec(),
                end_candidates: snapshot.selection.end_candidates().to_vec(),
            })?;
        }
        Commands::Reserve { grid, start, end, room } => {
            let session = load_session(&grid, config)?;
            session.set_date(start.date());
            session.set_start_time(start);
            session.set_end_time(end);
            session
                .select_room(room)
                .with_context(|| format!("Room {} cannot be booked from {} to {}", room, start, end))?;
            let reservation = session
                .finalize()
                .context("Selection did not resolve to a reservation")?;
            print_json(&reservation)?;
        }
        Commands::Request {
            catalog,
            date,
            end,
            page_index,
        } => {
            let catalog = Catalog::load(&catalog).with_context(|| format!("Failed to load catalog: {}", catalog))?;
            let url = libcal::grid_endpoint(&catalog.base_url).context("Catalog has no usable base URL")?;
            let mut request =
                AvailabilityRequest::new(catalog.location_id, date).with_page(page_index, config.page_size);
            if let Some(end) = end {
                request = request.with_end(end);
            }
            println!("POST {}", url);
            println!("Content-Type: {}", FORM_CONTENT_TYPE);
            println!("Referer: {}", catalog.base_url);
            println!();
            println!("{}", request.form_body());
        }
    }

    Ok(())
}

/// Build a session from a catalog and a saved grid, refreshed once.
fn load_session(args: &GridArgs, config: EngineConfig) -> Result<Session> {
    let catalog = Catalog::load(&args.catalog)
        .with_context(|| format!("Failed to load catalog: {}", args.catalog))?;
    let body = read_input(args.grid.as_deref())?;

    let session = Session::new(Arc::new(catalog), config);
    let ticket = session.begin_refresh();
    let outcome = session
        .complete_refresh(ticket, libcal::decode_grid(&body))
        .context("Failed to decode availability grid")?;
    if let RefreshOutcome::Applied { slots } = outcome {
        tracing::info!(slots, "loaded availability grid");
    }
    Ok(session)
}

fn parse_instant(raw: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("expected a time like \"2024-03-01 09:00\", got '{}'", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("expected a date like \"2024-03-01\", got '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
