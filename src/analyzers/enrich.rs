//! Trip enrichment: distance computation with a silent drop policy.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::trip::{EnrichedTrip, RawTrip, SkipReason};

/// Batch-level outcome of an enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl EnrichReport {
    pub fn rows_skipped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

/// Enriches every trip that has a computable distance, in input order.
///
/// Rows that fail are dropped; use [`enrich_with_report`] to see how many
/// and why.
pub fn enrich(trips: &[RawTrip]) -> Vec<EnrichedTrip> {
    enrich_with_report(trips).0
}

/// Same as [`enrich`], also returning per-reason skip counts.
pub fn enrich_with_report(trips: &[RawTrip]) -> (Vec<EnrichedTrip>, EnrichReport) {
    let mut report = EnrichReport {
        rows_in: trips.len(),
        ..Default::default()
    };

    let enriched: Vec<EnrichedTrip> = trips
        .iter()
        .filter_map(|raw| match EnrichedTrip::try_from(raw) {
            Ok(trip) => Some(trip),
            Err(reason) => {
                *report.skipped.entry(reason).or_default() += 1;
                None
            }
        })
        .collect();

    report.rows_out = enriched.len();

    for (reason, count) in &report.skipped {
        debug!(%reason, count, "Trips skipped");
    }
    info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        rows_skipped = report.rows_skipped(),
        "Trip enrichment complete"
    );

    (enriched, report)
}
