//! CLI entry point for the ride hotspot analyzer.
//!
//! Provides subcommands for running the aggregation pipeline over a trip log
//! and for querying previously exported location and user tables.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ride_hotspots::analyzers::analyzer::{PipelineConfig, analyze};
use ride_hotspots::analyzers::hotspots::{
    LocationFilter, rides_by_role, rides_by_week, top_locations,
};
use ride_hotspots::analyzers::locations::week_domain;
use ride_hotspots::analyzers::summary::DEFAULT_HEAVY_THRESHOLD;
use ride_hotspots::analyzers::types::{
    LocationMetrics, LocationPoint, Role, SummaryStatistics, UserSummary,
};
use ride_hotspots::analyzers::users::{active_users, new_users_by_week};
use ride_hotspots::output::print_json;
use ride_hotspots::parser::load_table;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ride_hotspots")]
#[command(about = "Per-user and per-location ride statistics from a trip log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a trip log and write user, location and summary tables
    Analyze {
        /// Trip log CSV (optionally .csv.gz)
        #[arg(value_name = "TRIPS_CSV")]
        input: PathBuf,

        /// Directory to write the summary tables to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Gzip compress the written tables
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Weekly ride rate above which a user counts as heavy
        #[arg(long, default_value_t = DEFAULT_HEAVY_THRESHOLD)]
        heavy_threshold: f64,

        /// Also log the summary statistics as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rank pickup/drop-off hotspots from an exported location table
    Hotspots {
        /// Location table written by `analyze`
        #[arg(value_name = "RIDE_SUMMARY_CSV")]
        source: PathBuf,

        /// First week to include
        #[arg(long)]
        from_week: Option<i64>,

        /// Last week to include
        #[arg(long)]
        to_week: Option<i64>,

        /// Only include this role (origin or destination)
        #[arg(short, long)]
        role: Option<Role>,

        /// Number of top locations to show
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,
    },
    /// Summarize users active within a week range from an exported user table
    Users {
        /// User table written by `analyze`
        #[arg(value_name = "USER_SUMMARY_CSV")]
        source: PathBuf,

        /// First week to include
        #[arg(long)]
        from_week: Option<i64>,

        /// Last week to include
        #[arg(long)]
        to_week: Option<i64>,

        /// Weekly ride rate above which a user counts as heavy
        #[arg(long, default_value_t = DEFAULT_HEAVY_THRESHOLD)]
        heavy_threshold: f64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ride_hotspots.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ride_hotspots.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            gzip,
            heavy_threshold,
            json,
        } => {
            let config = PipelineConfig {
                input,
                output_dir,
                gzip,
                heavy_user_threshold: heavy_threshold,
            };
            let output = analyze(&config)?;

            for (reason, count) in &output.report.skipped {
                warn!(%reason, count, "Trips dropped");
            }

            let stats = &output.statistics;
            info!(
                total_users = stats.total_users,
                total_rides = stats.total_rides,
                heavy_users = stats.users_more_than_1_ride_per_week,
                proportion_heavy_users = ?stats.proportion_heavy_users,
                correlation_distance_rides = ?stats.correlation_distance_rides,
                "Summary statistics"
            );

            if json {
                print_json(stats)?;
            }
        }
        Commands::Hotspots {
            source,
            from_week,
            to_week,
            role,
            top,
        } => {
            let points: Vec<LocationPoint> = load_table(&source)?;
            let domain = week_domain(&points);
            info!(points = points.len(), week_domain = ?domain, "Location table loaded");

            let filter = LocationFilter {
                weeks: week_range(from_week, to_week, domain),
                role,
            };
            let selected = filter.apply(&points);
            info!(selected = selected.len(), ?filter, "Filter applied");

            let metrics = LocationMetrics::from_points(selected.iter().copied());
            info!(
                total_rides = metrics.total_rides,
                unique_locations = metrics.unique_locations,
                avg_rides_per_location = ?metrics.avg_rides_per_location,
                pickup_points = metrics.pickup_points,
                dropoff_points = metrics.dropoff_points,
                unique_pickup_spots = metrics.unique_pickup_spots,
                unique_dropoff_spots = metrics.unique_dropoff_spots,
                "Location metrics"
            );

            for (week, rides) in rides_by_week(selected.iter().copied()) {
                info!(week, rides, "Rides by week");
            }
            let by_role = rides_by_role(selected.iter().copied());
            for role in Role::ALL {
                let count = by_role.get(&role).copied().unwrap_or(0);
                info!(%role, points = count, "Points by role");
            }
            for (rank, hotspot) in top_locations(selected.iter().copied(), top)
                .iter()
                .enumerate()
            {
                info!(
                    rank = rank + 1,
                    lat = hotspot.lat,
                    long = hotspot.long,
                    rides = hotspot.ride_count,
                    "Hotspot"
                );
            }
        }
        Commands::Users {
            source,
            from_week,
            to_week,
            heavy_threshold,
        } => {
            let users: Vec<UserSummary> = load_table(&source)?;
            let domain = users
                .iter()
                .map(|u| u.first_week)
                .min()
                .zip(users.iter().map(|u| u.last_week).max());
            info!(users = users.len(), week_domain = ?domain, "User table loaded");

            let active = match week_range(from_week, to_week, domain) {
                Some(weeks) => active_users(&users, weeks),
                None => users.iter().collect(),
            };

            for (week, count) in new_users_by_week(active.iter().copied()) {
                info!(week, new_users = count, "New users by first week");
            }

            let stats = SummaryStatistics::from_users(active.iter().copied(), heavy_threshold);
            print_json(&stats)?;
        }
    }

    Ok(())
}

/// Builds an inclusive week range, filling an open end from the table's domain.
fn week_range(
    from_week: Option<i64>,
    to_week: Option<i64>,
    domain: Option<(i64, i64)>,
) -> Option<(i64, i64)> {
    if from_week.is_none() && to_week.is_none() {
        return None;
    }
    let (min, max) = domain.unwrap_or((i64::MIN, i64::MAX));
    Some((from_week.unwrap_or(min), to_week.unwrap_or(max)))
}
