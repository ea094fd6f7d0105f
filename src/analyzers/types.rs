//! Data types produced by the aggregation pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-customer behavioral summary, one row of `user_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub customer_id: String,
    pub total_rides: usize,
    pub avg_distance_miles: f64,
    pub active_weeks: usize,
    pub weekly_rides: f64,
    pub first_week: i64,
    pub last_week: i64,
}

/// Whether a location point is where a ride started or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Origin,
    Destination,
}

impl Role {
    /// Every role, in the order the location table emits them.
    pub const ALL: [Role; 2] = [Role::Origin, Role::Destination];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Origin => "origin",
            Role::Destination => "destination",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role '{0}', expected 'origin' or 'destination'")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "origin" => Ok(Role::Origin),
            "destination" => Ok(Role::Destination),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// One endpoint of a trip, one row of `ride_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub lat: f64,
    pub long: f64,
    pub customer_id: String,
    pub trip_id: String,
    pub week_index: i64,
    pub role: Role,
    pub ride_count: usize,
}

/// Total ride count at an exact coordinate, roles merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub lat: f64,
    pub long: f64,
    pub ride_count: usize,
}

/// Headline counts over a (possibly filtered) location table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMetrics {
    pub total_rides: usize,
    pub unique_locations: usize,
    pub avg_rides_per_location: Option<f64>,
    pub pickup_points: usize,
    pub dropoff_points: usize,
    pub unique_pickup_spots: usize,
    pub unique_dropoff_spots: usize,
}

/// Dataset-wide metrics derived from the user rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub generated_at: DateTime<Utc>,
    pub total_users: usize,
    pub total_rides: usize,
    pub avg_rides_per_user: Option<f64>,
    pub avg_weekly_rides_per_user: Option<f64>,
    pub avg_distance_per_user: Option<f64>,
    pub users_more_than_1_ride_per_week: usize,
    pub proportion_heavy_users: Option<f64>,
    pub correlation_distance_rides: Option<f64>,
}

/// One `metric,value` row of `summary_statistics.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub value: Option<f64>,
}
