//! Trip aggregation pipeline.
//!
//! This module enriches raw trips with geodesic distances, rolls them up
//! per customer and per pickup/drop-off location, derives dataset-wide
//! statistics, and answers hotspot queries over the resulting tables.

pub mod analyzer;
pub mod enrich;
pub mod hotspots;
pub mod locations;
pub mod summary;
pub mod types;
pub mod users;
pub mod utility;
