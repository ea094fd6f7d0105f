//! Location rollup: trip endpoints tagged by role with exact-match ride counts.

use std::collections::HashMap;

use crate::analyzers::types::{LocationPoint, Role};
use crate::trip::{Coordinate, EnrichedTrip};

/// Grouping key for a coordinate compared by exact numeric equality.
///
/// `0.0` and `-0.0` are equal as numbers, so both map to the same bits.
pub(crate) fn coordinate_key(lat: f64, long: f64) -> (u64, u64) {
    fn bits(v: f64) -> u64 {
        if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
    }
    (bits(lat), bits(long))
}

fn endpoint(trip: &EnrichedTrip, at: Coordinate, role: Role) -> LocationPoint {
    LocationPoint {
        lat: at.lat,
        long: at.long,
        customer_id: trip.customer_id.clone(),
        trip_id: trip.trip_id.clone(),
        week_index: trip.week_index,
        role,
        ride_count: 0,
    }
}

/// Explodes each trip into an origin and a destination point and stamps every
/// point with the size of its `(lat, long, role)` group.
///
/// All origins come first in trip order, then all destinations.
pub fn rollup_locations(enriched: &[EnrichedTrip]) -> Vec<LocationPoint> {
    let origins = enriched.iter().map(|t| endpoint(t, t.origin, Role::Origin));
    let destinations = enriched
        .iter()
        .map(|t| endpoint(t, t.destination, Role::Destination));
    let mut points: Vec<LocationPoint> = origins.chain(destinations).collect();

    let mut counts: HashMap<((u64, u64), Role), usize> = HashMap::new();
    for p in &points {
        *counts.entry((coordinate_key(p.lat, p.long), p.role)).or_default() += 1;
    }

    for p in &mut points {
        p.ride_count = counts[&(coordinate_key(p.lat, p.long), p.role)];
    }

    points
}

/// Smallest and largest week index present, for range selection.
pub fn week_domain(points: &[LocationPoint]) -> Option<(i64, i64)> {
    let min = points.iter().map(|p| p.week_index).min()?;
    let max = points.iter().map(|p| p.week_index).max()?;
    Some((min, max))
}
