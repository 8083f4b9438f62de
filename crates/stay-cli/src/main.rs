//! `stay` CLI — gap finding and bedroom-capacity checks over a booking
//! snapshot.
//!
//! A snapshot is a JSON document with the house settings row and the booking
//! rows, in the shape the booking store returns them:
//!
//! ```json
//! {
//!   "settings": { "buffer_days": 1, "max_bedrooms": 4 },
//!   "bookings": [
//!     { "start_ts": "2025-01-10T15:00:00Z", "end_ts": "2025-01-15T15:00:00Z",
//!       "bedroom_count": 3, "status": "APPROVED" }
//!   ]
//! }
//! ```
//!
//! ## Usage
//!
//! ```sh
//! # Bookable gaps in January with at least 3 nights
//! stay gaps -i snapshot.json --from 2025-01-01 --to 2025-01-31 --min-nights 3
//!
//! # Would a 2-bedroom stay fit?
//! stay check -i snapshot.json --start 2025-01-05 --end 2025-01-08 --bedrooms 2
//!
//! # Bedrooms in use on a given day (defaults to now)
//! cat snapshot.json | stay occupancy --at 2025-01-06
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use stay_engine::capacity::{self, CapacityDecision};
use stay_engine::instant::{format_range, parse_instant};
use stay_engine::record::{intervals_from_records, BookingRecord, HouseSettings};
use stay_engine::{gaps, CandidateRequest, Gap, TimeRange};
use tracing::{debug, level_filters::LevelFilter};

#[derive(Parser)]
#[command(
    name = "stay",
    version,
    about = "Holiday-home availability and bedroom-capacity checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot file (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Output file (writes to stdout if omitted)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Override the house timezone from the snapshot settings
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Override the buffer days from the snapshot settings
    #[arg(long, global = true)]
    buffer_days: Option<u32>,

    /// Override the bedroom capacity from the snapshot settings
    #[arg(long, global = true)]
    max_bedrooms: Option<u32>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log verbosity (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable gaps between occupied stays
    Gaps {
        /// Window start (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: String,
        /// Window end (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: String,
        /// Minimum nights per gap (defaults to the house setting)
        #[arg(long)]
        min_nights: Option<u32>,
        /// Add a human-readable date range to each gap
        #[arg(long)]
        display: bool,
    },
    /// Check whether a stay fits within bedroom capacity
    Check {
        /// Check-in (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        start: String,
        /// Check-out (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        end: String,
        /// Bedrooms requested
        #[arg(long, default_value_t = 1)]
        bedrooms: u32,
    },
    /// Show bedrooms in use at an instant
    Occupancy {
        /// Instant to inspect (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

/// The JSON document read from `--input` or stdin.
#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    settings: HouseSettings,
    #[serde(default)]
    bookings: Vec<BookingRecord>,
}

#[derive(Serialize)]
struct GapView {
    #[serde(flatten)]
    gap: Gap,
    #[serde(skip_serializing_if = "Option::is_none")]
    display: Option<String>,
}

#[derive(Serialize)]
struct GapsReport {
    gaps: Vec<GapView>,
    total_nights: i64,
}

#[derive(Serialize)]
struct CheckReport {
    #[serde(flatten)]
    decision: CapacityDecision,
    message: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let raw = read_input(cli.input.as_deref())?;
    let snapshot: Snapshot = serde_json::from_str(&raw).context("Failed to parse snapshot JSON")?;
    let settings = apply_overrides(snapshot.settings, &cli);
    let policy = settings.policy().context("Invalid house settings")?;
    let tz = settings.timezone.as_str();
    let occupied =
        intervals_from_records(&snapshot.bookings, tz).context("Invalid booking record")?;
    debug!(bookings = occupied.len(), timezone = tz, "snapshot loaded");

    let json = match cli.command {
        Commands::Gaps {
            from,
            to,
            min_nights,
            display,
        } => {
            let from = parse_instant(&from, tz).context("Invalid --from")?;
            let to = parse_instant(&to, tz).context("Invalid --to")?;
            let found = gaps::calculate_gaps(
                &occupied,
                from,
                to,
                min_nights.unwrap_or(policy.min_nights),
                policy.buffer_days,
            )
            .context("Failed to calculate gaps")?;

            let total_nights = gaps::total_nights(&found);
            let views = found
                .into_iter()
                .map(|gap| -> Result<GapView> {
                    let display = if display {
                        Some(format_range(gap.start, gap.end, tz)?)
                    } else {
                        None
                    };
                    Ok(GapView { gap, display })
                })
                .collect::<Result<Vec<_>>>()?;
            to_json(
                &GapsReport {
                    gaps: views,
                    total_nights,
                },
                cli.pretty,
            )?
        }
        Commands::Check {
            start,
            end,
            bedrooms,
        } => {
            let start = parse_instant(&start, tz).context("Invalid --start")?;
            let end = parse_instant(&end, tz).context("Invalid --end")?;
            let candidate = CandidateRequest::new(TimeRange::new(start, end)?, bedrooms)
                .context("Invalid candidate stay")?;
            let decision = capacity::check_capacity(&occupied, &candidate, policy.max_bedrooms)
                .context("Failed to check capacity")?;
            let message = match &decision.reason {
                Some(reason) => reason.to_string(),
                None => format!(
                    "{} bedroom(s) available for {}",
                    bedrooms,
                    format_range(start, end, tz)?
                ),
            };
            to_json(&CheckReport { decision, message }, cli.pretty)?
        }
        Commands::Occupancy { at } => {
            let at = match at {
                Some(raw) => parse_instant(&raw, tz).context("Invalid --at")?,
                None => chrono::Utc::now(),
            };
            to_json(
                &capacity::occupancy_at(&occupied, at, policy.max_bedrooms),
                cli.pretty,
            )?
        }
    };

    write_output(cli.output.as_deref(), &json)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

fn apply_overrides(mut settings: HouseSettings, cli: &Cli) -> HouseSettings {
    if let Some(tz) = &cli.timezone {
        settings.timezone = tz.clone();
    }
    if let Some(buffer_days) = cli.buffer_days {
        settings.buffer_days = buffer_days;
    }
    if let Some(max_bedrooms) = cli.max_bedrooms {
        settings.max_bedrooms = max_bedrooms;
    }
    settings
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
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

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
