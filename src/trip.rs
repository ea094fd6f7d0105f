//! Trip records: the raw input row and its distance-enriched form.

use std::fmt;

use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// A single ride as it appears in the input log.
///
/// Coordinates are optional: an empty or non-numeric cell deserializes as
/// `None` instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrip {
    pub trip_id: String,
    pub customer_id: String,
    pub week_index: i64,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub origin_lat: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub origin_long: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub destination_lat: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub destination_long: Option<f64>,
}

/// Identifies one of the four coordinate columns of a [`RawTrip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoordinateField {
    OriginLat,
    OriginLong,
    DestinationLat,
    DestinationLong,
}

impl CoordinateField {
    pub fn as_str(self) -> &'static str {
        match self {
            CoordinateField::OriginLat => "origin_lat",
            CoordinateField::OriginLong => "origin_long",
            CoordinateField::DestinationLat => "destination_lat",
            CoordinateField::DestinationLong => "destination_long",
        }
    }
}

impl fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a raw trip could not be turned into an [`EnrichedTrip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Error)]
pub enum SkipReason {
    #[error("{0} is missing or not a number")]
    MissingCoordinate(CoordinateField),
    #[error("{0} is outside the valid range")]
    OutOfRange(CoordinateField),
    #[error("geodesic distance is not finite")]
    NonFiniteDistance,
}

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub long: f64,
}

impl Coordinate {
    fn validate(
        lat: Option<f64>,
        long: Option<f64>,
        lat_field: CoordinateField,
        long_field: CoordinateField,
    ) -> Result<Self, SkipReason> {
        let lat = check_axis(lat, 90.0, lat_field)?;
        let long = check_axis(long, 180.0, long_field)?;
        Ok(Coordinate { lat, long })
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.long, self.lat)
    }
}

fn check_axis(value: Option<f64>, limit: f64, field: CoordinateField) -> Result<f64, SkipReason> {
    match value {
        None => Err(SkipReason::MissingCoordinate(field)),
        Some(v) if v.is_nan() => Err(SkipReason::MissingCoordinate(field)),
        Some(v) if !(-limit..=limit).contains(&v) => Err(SkipReason::OutOfRange(field)),
        Some(v) => Ok(v),
    }
}

/// Geodesic distance on the WGS-84 ellipsoid, in statute miles.
///
/// Distinct coordinates naming the same physical point (any longitude at a
/// pole, or longitude 180 vs -180) are 0 apart.
pub fn geodesic_miles(from: Coordinate, to: Coordinate) -> f64 {
    if from == to {
        return 0.0;
    }
    Geodesic.distance(from.to_point(), to.to_point()) / METERS_PER_MILE
}

/// A raw trip with validated endpoints and its computed distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTrip {
    pub trip_id: String,
    pub customer_id: String,
    pub week_index: i64,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub distance_miles: f64,
}

impl TryFrom<&RawTrip> for EnrichedTrip {
    type Error = SkipReason;

    fn try_from(raw: &RawTrip) -> Result<Self, Self::Error> {
        let origin = Coordinate::validate(
            raw.origin_lat,
            raw.origin_long,
            CoordinateField::OriginLat,
            CoordinateField::OriginLong,
        )?;
        let destination = Coordinate::validate(
            raw.destination_lat,
            raw.destination_long,
            CoordinateField::DestinationLat,
            CoordinateField::DestinationLong,
        )?;

        let distance_miles = geodesic_miles(origin, destination);
        if !distance_miles.is_finite() || distance_miles < 0.0 {
            return Err(SkipReason::NonFiniteDistance);
        }

        Ok(EnrichedTrip {
            trip_id: raw.trip_id.clone(),
            customer_id: raw.customer_id.clone(),
            week_index: raw.week_index,
            origin,
            destination,
            distance_miles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_endpoints_have_zero_distance() {
        let trip = create_trip(Some(40.0), Some(-74.0), Some(40.0), Some(-74.0));
        let enriched = EnrichedTrip::try_from(&trip).unwrap();

        assert_eq!(enriched.distance_miles, 0.0);
    }

    #[test]
    fn test_distinct_endpoints_have_positive_distance() {
        let pairs = [
            ((40.0, -74.0), (40.0, -74.000001)),
            ((0.0, 0.0), (0.0, 180.0)),
            ((89.9, 0.0), (89.9, 10.0)),
            ((-33.9, 151.2), (51.5, -0.1)),
        ];

        for ((lat1, long1), (lat2, long2)) in pairs {
            let d = geodesic_miles(
                Coordinate { lat: lat1, long: long1 },
                Coordinate { lat: lat2, long: long2 },
            );
            assert!(d > 0.0, "({lat1}, {long1}) -> ({lat2}, {long2}) gave {d}");
        }
    }

    #[test]
    fn test_aliased_endpoints_have_zero_distance() {
        let pole = geodesic_miles(
            Coordinate { lat: 90.0, long: 0.0 },
            Coordinate { lat: 90.0, long: 10.0 },
        );
        let antimeridian = geodesic_miles(
            Coordinate { lat: 10.0, long: 180.0 },
            Coordinate { lat: 10.0, long: -180.0 },
        );

        assert_eq!(pole, 0.0);
        assert_eq!(antimeridian, 0.0);
    }

    #[test]
    fn test_distance_matches_known_value() {
        // JFK to LAX is roughly 2475 statute miles on the ellipsoid.
        let trip = create_trip(Some(40.6413), Some(-73.7781), Some(33.9416), Some(-118.4085));
        let enriched = EnrichedTrip::try_from(&trip).unwrap();

        assert!((enriched.distance_miles - 2475.0).abs() < 10.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let trip = create_trip(Some(0.0), Some(0.0), Some(1.0), Some(0.0));
        let enriched = EnrichedTrip::try_from(&trip).unwrap();

        // 110.574 km at the equator
        assert!((enriched.distance_miles - 68.71).abs() < 0.05);
    }

    #[test]
    fn test_missing_coordinate_is_skipped() {
        let trip = create_trip(Some(40.0), Some(-74.0), None, Some(-74.1));

        assert_eq!(
            EnrichedTrip::try_from(&trip),
            Err(SkipReason::MissingCoordinate(CoordinateField::DestinationLat))
        );
    }

    #[test]
    fn test_nan_coordinate_is_missing() {
        let trip = create_trip(Some(f64::NAN), Some(-74.0), Some(40.0), Some(-74.1));

        assert_eq!(
            EnrichedTrip::try_from(&trip),
            Err(SkipReason::MissingCoordinate(CoordinateField::OriginLat))
        );
    }

    #[test]
    fn test_out_of_range_latitude() {
        let trip = create_trip(Some(91.0), Some(-74.0), Some(40.0), Some(-74.1));

        assert_eq!(
            EnrichedTrip::try_from(&trip),
            Err(SkipReason::OutOfRange(CoordinateField::OriginLat))
        );
    }

    #[test]
    fn test_out_of_range_longitude() {
        let trip = create_trip(Some(40.0), Some(-74.0), Some(40.0), Some(f64::INFINITY));

        assert_eq!(
            EnrichedTrip::try_from(&trip),
            Err(SkipReason::OutOfRange(CoordinateField::DestinationLong))
        );
    }

    #[test]
    fn test_skip_reason_message() {
        let reason = SkipReason::MissingCoordinate(CoordinateField::OriginLong);
        assert_eq!(reason.to_string(), "origin_long is missing or not a number");
    }

    fn create_trip(
        origin_lat: Option<f64>,
        origin_long: Option<f64>,
        destination_lat: Option<f64>,
        destination_long: Option<f64>,
    ) -> RawTrip {
        RawTrip {
            trip_id: "t1".to_string(),
            customer_id: "c1".to_string(),
            week_index: 1,
            origin_lat,
            origin_long,
            destination_lat,
            destination_long,
        }
    }
}
