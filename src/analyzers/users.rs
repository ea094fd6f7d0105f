//! Per-customer rollup and queries over the resulting user table.

use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::types::UserSummary;
use crate::trip::EnrichedTrip;

#[derive(Default)]
struct UserAccumulator {
    rides: usize,
    distance_sum: f64,
    weeks: BTreeSet<i64>,
}

/// Groups enriched trips by customer and derives one [`UserSummary`] each.
///
/// Customers whose trips were all dropped upstream do not appear.
pub fn rollup_users(enriched: &[EnrichedTrip]) -> BTreeMap<String, UserSummary> {
    let mut groups: BTreeMap<&str, UserAccumulator> = BTreeMap::new();

    for trip in enriched {
        let acc = groups.entry(trip.customer_id.as_str()).or_default();
        acc.rides += 1;
        acc.distance_sum += trip.distance_miles;
        acc.weeks.insert(trip.week_index);
    }

    groups
        .into_iter()
        .filter_map(|(customer_id, acc)| {
            // a group exists only once a trip was pushed into it
            let first_week = *acc.weeks.first()?;
            let last_week = *acc.weeks.last()?;
            let active_weeks = acc.weeks.len();

            Some((
                customer_id.to_string(),
                UserSummary {
                    customer_id: customer_id.to_string(),
                    total_rides: acc.rides,
                    avg_distance_miles: acc.distance_sum / acc.rides as f64,
                    active_weeks,
                    weekly_rides: acc.rides as f64 / active_weeks as f64,
                    first_week,
                    last_week,
                },
            ))
        })
        .collect()
}

/// Users whose `[first_week, last_week]` span overlaps the inclusive range.
pub fn active_users<'a, I>(users: I, weeks: (i64, i64)) -> Vec<&'a UserSummary>
where
    I: IntoIterator<Item = &'a UserSummary>,
{
    let (from, to) = weeks;
    users
        .into_iter()
        .filter(|u| u.first_week <= to && u.last_week >= from)
        .collect()
}

/// Number of users whose first active week is each week index.
pub fn new_users_by_week<'a, I>(users: I) -> BTreeMap<i64, usize>
where
    I: IntoIterator<Item = &'a UserSummary>,
{
    users.into_iter().fold(BTreeMap::new(), |mut counts, u| {
        *counts.entry(u.first_week).or_default() += 1;
        counts
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::Coordinate;

    #[test]
    fn test_rollup_empty() {
        assert!(rollup_users(&[]).is_empty());
    }

    #[test]
    fn test_rollup_single_user() {
        let trips = vec![
            create_trip("1", 1, 2.0),
            create_trip("1", 2, 4.0),
            create_trip("1", 2, 6.0),
            create_trip("1", 5, 8.0),
        ];

        let users = rollup_users(&trips);
        let user = &users["1"];

        assert_eq!(user.total_rides, 4);
        assert_eq!(user.avg_distance_miles, 5.0);
        assert_eq!(user.active_weeks, 3);
        assert!((user.weekly_rides - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(user.first_week, 1);
        assert_eq!(user.last_week, 5);
    }

    #[test]
    fn test_rollup_covers_every_customer_once() {
        let trips = vec![
            create_trip("b", 3, 1.0),
            create_trip("a", 1, 1.0),
            create_trip("b", 1, 1.0),
            create_trip("c", 7, 1.0),
        ];

        let users = rollup_users(&trips);
        let ids: Vec<_> = users.keys().map(String::as_str).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rollup_invariants() {
        let trips = vec![
            create_trip("x", 4, 1.0),
            create_trip("x", 9, 3.0),
            create_trip("y", 2, 0.0),
        ];

        for user in rollup_users(&trips).values() {
            assert!(user.first_week <= user.last_week);
            assert!(user.active_weeks as i64 <= user.last_week - user.first_week + 1);
            assert!(user.weekly_rides > 0.0);
        }
    }

    #[test]
    fn test_active_users_overlap() {
        let users = vec![
            create_summary("early", 1, 2),
            create_summary("spanning", 1, 10),
            create_summary("late", 8, 9),
        ];

        let active: Vec<_> = active_users(&users, (3, 7))
            .into_iter()
            .map(|u| u.customer_id.as_str())
            .collect();

        assert_eq!(active, vec!["spanning"]);
    }

    #[test]
    fn test_new_users_by_week() {
        let users = vec![
            create_summary("a", 1, 2),
            create_summary("b", 1, 4),
            create_summary("c", 3, 3),
        ];

        let counts = new_users_by_week(&users);

        assert_eq!(counts[&1], 2);
        assert_eq!(counts[&3], 1);
        assert_eq!(counts.len(), 2);
    }

    // Helper functions for tests
    fn create_trip(customer_id: &str, week_index: i64, distance_miles: f64) -> EnrichedTrip {
        let point = Coordinate {
            lat: 40.0,
            long: -74.0,
        };
        EnrichedTrip {
            trip_id: format!("{customer_id}-{week_index}"),
            customer_id: customer_id.to_string(),
            week_index,
            origin: point,
            destination: point,
            distance_miles,
        }
    }

    fn create_summary(customer_id: &str, first_week: i64, last_week: i64) -> UserSummary {
        UserSummary {
            customer_id: customer_id.to_string(),
            total_rides: 1,
            avg_distance_miles: 1.0,
            active_weeks: 1,
            weekly_rides: 1.0,
            first_week,
            last_week,
        }
    }
}
