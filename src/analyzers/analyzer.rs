use crate::analyzers::enrich::{EnrichReport, enrich_with_report};
use crate::analyzers::locations::{rollup_locations, week_domain};
use crate::analyzers::summary::DEFAULT_HEAVY_THRESHOLD;
use crate::analyzers::types::{LocationPoint, SummaryStatistics, UserSummary};
use crate::analyzers::users::rollup_users;
use crate::output::write_table;
use crate::parser::load_trips;
use crate::trip::RawTrip;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

pub const USER_SUMMARY_TABLE: &str = "user_summary";
pub const RIDE_SUMMARY_TABLE: &str = "ride_summary";
pub const SUMMARY_STATISTICS_TABLE: &str = "summary_statistics";

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub gzip: bool,
    pub heavy_user_threshold: f64,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            gzip: false,
            heavy_user_threshold: DEFAULT_HEAVY_THRESHOLD,
        }
    }
}

/// Everything one batch run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    pub report: EnrichReport,
    pub users: BTreeMap<String, UserSummary>,
    pub locations: Vec<LocationPoint>,
    pub statistics: SummaryStatistics,
}

/// Runs enrichment and both rollups over an in-memory trip log.
pub fn run(trips: &[RawTrip], heavy_user_threshold: f64) -> PipelineOutput {
    let (enriched, report) = enrich_with_report(trips);

    let users = rollup_users(&enriched);
    let locations = rollup_locations(&enriched);
    let statistics = SummaryStatistics::from_users(users.values(), heavy_user_threshold);

    info!(
        users = users.len(),
        location_points = locations.len(),
        week_domain = ?week_domain(&locations),
        "Rollups complete"
    );

    PipelineOutput {
        report,
        users,
        locations,
        statistics,
    }
}

/// Loads the trip log, runs the pipeline, and writes the three summary tables.
#[tracing::instrument(skip(config), fields(input = %config.input.display(), output_dir = %config.output_dir.display()))]
pub fn analyze(config: &PipelineConfig) -> Result<PipelineOutput> {
    let trips = load_trips(&config.input)?;
    info!(trips = trips.len(), "Trip log loaded");

    let output = run(&trips, config.heavy_user_threshold);

    let users: Vec<&UserSummary> = output.users.values().collect();
    write_table(&config.output_dir, USER_SUMMARY_TABLE, &users, config.gzip)?;
    write_table(
        &config.output_dir,
        RIDE_SUMMARY_TABLE,
        &output.locations,
        config.gzip,
    )?;
    write_table(
        &config.output_dir,
        SUMMARY_STATISTICS_TABLE,
        &output.statistics.metric_rows(),
        config.gzip,
    )?;

    info!(
        rows_in = output.report.rows_in,
        rows_out = output.report.rows_out,
        users = output.users.len(),
        "Analysis complete"
    );
    Ok(output)
}
