//! Filtering and ranking over a location table.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::analyzers::locations::coordinate_key;
use crate::analyzers::types::{Hotspot, LocationMetrics, LocationPoint, Role};

/// Selects location points by inclusive week range and role.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationFilter {
    pub weeks: Option<(i64, i64)>,
    pub role: Option<Role>,
}

impl LocationFilter {
    pub fn matches(&self, point: &LocationPoint) -> bool {
        let in_weeks = self
            .weeks
            .is_none_or(|(from, to)| (from..=to).contains(&point.week_index));
        let in_role = self.role.is_none_or(|role| point.role == role);
        in_weeks && in_role
    }

    pub fn apply<'a>(&self, points: &'a [LocationPoint]) -> Vec<&'a LocationPoint> {
        points.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Sum of `ride_count` per week index.
pub fn rides_by_week<'a, I>(points: I) -> BTreeMap<i64, usize>
where
    I: IntoIterator<Item = &'a LocationPoint>,
{
    points.into_iter().fold(BTreeMap::new(), |mut totals, p| {
        *totals.entry(p.week_index).or_default() += p.ride_count;
        totals
    })
}

/// Number of points per role.
pub fn rides_by_role<'a, I>(points: I) -> BTreeMap<Role, usize>
where
    I: IntoIterator<Item = &'a LocationPoint>,
{
    points.into_iter().fold(BTreeMap::new(), |mut totals, p| {
        *totals.entry(p.role).or_default() += 1;
        totals
    })
}

/// The `n` coordinates with the largest summed `ride_count`, roles merged.
///
/// Ties are ordered by ascending `(lat, long)`.
pub fn top_locations<'a, I>(points: I, n: usize) -> Vec<Hotspot>
where
    I: IntoIterator<Item = &'a LocationPoint>,
{
    let mut index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut hotspots: Vec<Hotspot> = Vec::new();

    for p in points {
        let slot = *index
            .entry(coordinate_key(p.lat, p.long))
            .or_insert_with(|| {
                hotspots.push(Hotspot {
                    lat: p.lat,
                    long: p.long,
                    ride_count: 0,
                });
                hotspots.len() - 1
            });
        hotspots[slot].ride_count += p.ride_count;
    }

    hotspots.sort_by(|a, b| {
        b.ride_count
            .cmp(&a.ride_count)
            .then(a.lat.total_cmp(&b.lat))
            .then(a.long.total_cmp(&b.long))
    });
    hotspots.truncate(n);
    hotspots
}

impl LocationMetrics {
    /// Totals, distinct coordinates and per-role counts over `points`.
    ///
    /// `avg_rides_per_location` is the mean `ride_count` per row, `None` when
    /// there are no rows.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a LocationPoint>,
    {
        let mut metrics = LocationMetrics {
            total_rides: 0,
            unique_locations: 0,
            avg_rides_per_location: None,
            pickup_points: 0,
            dropoff_points: 0,
            unique_pickup_spots: 0,
            unique_dropoff_spots: 0,
        };
        let mut rows = 0usize;
        let mut locations = HashSet::new();
        let mut pickups = HashSet::new();
        let mut dropoffs = HashSet::new();

        for p in points {
            let key = coordinate_key(p.lat, p.long);
            rows += 1;
            metrics.total_rides += p.ride_count;
            locations.insert(key);

            match p.role {
                Role::Origin => {
                    metrics.pickup_points += 1;
                    pickups.insert(key);
                }
                Role::Destination => {
                    metrics.dropoff_points += 1;
                    dropoffs.insert(key);
                }
            }
        }

        metrics.unique_locations = locations.len();
        metrics.unique_pickup_spots = pickups.len();
        metrics.unique_dropoff_spots = dropoffs.len();
        metrics.avg_rides_per_location =
            (rows > 0).then(|| metrics.total_rides as f64 / rows as f64);
        metrics
    }
}
