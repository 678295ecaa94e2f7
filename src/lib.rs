pub mod aggregator;
pub mod buckets;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod output;
pub mod parser;
pub mod scales;
pub mod stats;
pub mod time_filter;

pub use aggregator::{Endpoint, TrafficAggregator};
pub use error::TrafficError;
pub use model::{Station, StationTraffic, Trip};
pub use time_filter::{MinuteOfDay, TimeFilter, TimeWindow};
