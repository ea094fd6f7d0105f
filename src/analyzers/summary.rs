use chrono::Utc;

use crate::analyzers::types::{MetricRow, SummaryStatistics, UserSummary};
use crate::analyzers::utility::{mean, pearson};

/// Default weekly-ride rate above which a user counts as heavy.
pub const DEFAULT_HEAVY_THRESHOLD: f64 = 1.0;

impl SummaryStatistics {
    /// Derives dataset-wide metrics from a user table.
    ///
    /// A user is heavy when `weekly_rides` is strictly greater than
    /// `heavy_threshold`. Means and the proportion are `None` for an empty table.
    pub fn from_users<'a, I>(users: I, heavy_threshold: f64) -> Self
    where
        I: IntoIterator<Item = &'a UserSummary>,
    {
        let users: Vec<&UserSummary> = users.into_iter().collect();

        let rides: Vec<f64> = users.iter().map(|u| u.total_rides as f64).collect();
        let weekly: Vec<f64> = users.iter().map(|u| u.weekly_rides).collect();
        let distance: Vec<f64> = users.iter().map(|u| u.avg_distance_miles).collect();

        let total_users = users.len();
        let heavy = weekly.iter().filter(|&&w| w > heavy_threshold).count();
        let mean_of = |values: &[f64]| (!values.is_empty()).then(|| mean(values));

        SummaryStatistics {
            generated_at: Utc::now(),
            total_users,
            total_rides: users.iter().map(|u| u.total_rides).sum(),
            avg_rides_per_user: mean_of(&rides),
            avg_weekly_rides_per_user: mean_of(&weekly),
            avg_distance_per_user: mean_of(&distance),
            users_more_than_1_ride_per_week: heavy,
            proportion_heavy_users: (total_users > 0)
                .then(|| heavy as f64 / total_users as f64),
            correlation_distance_rides: pearson(&weekly, &distance),
        }
    }

    /// Flattens the statistics into `metric,value` rows.
    pub fn metric_rows(&self) -> Vec<MetricRow> {
        let row = |metric, value| MetricRow { metric, value };
        vec![
            row("total_users", Some(self.total_users as f64)),
            row("total_rides", Some(self.total_rides as f64)),
            row("avg_rides_per_user", self.avg_rides_per_user),
            row("avg_weekly_rides_per_user", self.avg_weekly_rides_per_user),
            row("avg_distance_per_user", self.avg_distance_per_user),
            row(
                "users_more_than_1_ride_per_week",
                Some(self.users_more_than_1_ride_per_week as f64),
            ),
            row("proportion_heavy_users", self.proportion_heavy_users),
            row("correlation_distance_rides", self.correlation_distance_rides),
        ]
    }
}
