//! Render hints for the map layer: marker radius, departure flow class and
//! tooltip text. Nothing here draws; it only turns counts into numbers a
//! renderer can bind directly.

use serde::Serialize;

use crate::model::{Station, StationTraffic};
use crate::time_filter::TimeFilter;

/// Radius range when every trip is shown.
pub const ANY_TIME_RADIUS_RANGE: (f64, f64) = (0.0, 25.0);

/// Radius range once a time filter is active.
pub const FILTERED_RADIUS_RANGE: (f64, f64) = (3.0, 50.0);

/// Square-root scale from traffic to marker radius, so marker area grows
/// linearly with traffic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    max_traffic: usize,
    range: (f64, f64),
}

impl RadiusScale {
    pub fn new(max_traffic: usize, range: (f64, f64)) -> Self {
        Self { max_traffic, range }
    }

    /// Scale for `filter`, with the domain fixed by the unfiltered maximum.
    pub fn for_filter(filter: TimeFilter, max_traffic: usize) -> Self {
        let range = if filter.is_filtered() {
            FILTERED_RADIUS_RANGE
        } else {
            ANY_TIME_RADIUS_RANGE
        };
        Self::new(max_traffic, range)
    }

    pub fn radius(&self, traffic: usize) -> f64 {
        let (start, end) = self.range;
        if self.max_traffic == 0 {
            return start;
        }
        let t = (traffic as f64).sqrt() / (self.max_traffic as f64).sqrt();
        start + (end - start) * t
    }
}

/// Quantizes a departure ratio into three classes: mostly arrivals (`0`),
/// balanced (`0.5`), mostly departures (`1`).
pub fn departure_flow(ratio: Option<f64>) -> Option<f64> {
    const CLASSES: [f64; 3] = [0.0, 0.5, 1.0];
    let ratio = ratio?.clamp(0.0, 1.0);
    let idx = ((ratio * CLASSES.len() as f64) as usize).min(CLASSES.len() - 1);
    Some(CLASSES[idx])
}

pub fn tooltip(traffic: &StationTraffic) -> String {
    format!(
        "{} trips ({} departures, {} arrivals)",
        traffic.total_traffic, traffic.departures, traffic.arrivals
    )
}

/// One station ready for the map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    pub short_name: String,
    pub name: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub arrivals: usize,
    pub departures: usize,
    pub total_traffic: usize,
    pub departure_ratio: Option<f64>,
    pub departure_flow: Option<f64>,
    pub radius: f64,
    pub tooltip: String,
}

impl StationMarker {
    pub fn new(station: &Station, traffic: &StationTraffic, scale: &RadiusScale) -> Self {
        let departure_ratio = traffic.departure_ratio();
        Self {
            short_name: traffic.short_name.clone(),
            name: station.name.clone(),
            lon: station.lon,
            lat: station.lat,
            arrivals: traffic.arrivals,
            departures: traffic.departures,
            total_traffic: traffic.total_traffic,
            departure_ratio,
            departure_flow: departure_flow(departure_ratio),
            radius: scale.radius(traffic.total_traffic),
            tooltip: tooltip(traffic),
        }
    }
}

/// Pairs stations with their traffic. Both slices must be in the same order,
/// as returned by `TrafficAggregator::compute_station_traffic`.
pub fn build_markers(
    stations: &[Station],
    traffic: &[StationTraffic],
    scale: &RadiusScale,
) -> Vec<StationMarker> {
    stations
        .iter()
        .zip(traffic)
        .map(|(station, traffic)| StationMarker::new(station, traffic, scale))
        .collect()
}

pub fn max_traffic(traffic: &[StationTraffic]) -> usize {
    traffic.iter().map(|t| t.total_traffic).max().unwrap_or(0)
}
