use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::StationTraffic;
use crate::time_filter::TimeFilter;

/// Summary of one filter application, one row per slider position.
#[derive(Debug, Default, Clone, Serialize)]
pub struct TrafficStats {
    pub timestamp: DateTime<Utc>,
    pub time_filter: i32,
    pub label: String,
    pub window_radius: u16,

    pub stations: usize,
    pub stations_with_traffic: usize,
    pub active_pct: f64,

    pub departures: usize,
    pub arrivals: usize,

    pub busiest_station: Option<String>,
    pub busiest_traffic: usize,

    pub mean_traffic: f64,
    pub stddev_traffic: f64,
}

impl TrafficStats {
    pub fn from_traffic(filter: TimeFilter, window_radius: u16, traffic: &[StationTraffic]) -> Self {
        let totals: Vec<f64> = traffic.iter().map(|t| t.total_traffic as f64).collect();
        let mean_traffic = mean(&totals);

        // first station wins ties
        let busiest = traffic
            .iter()
            .filter(|t| t.has_traffic())
            .fold(None::<&StationTraffic>, |best, t| match best {
                Some(b) if b.total_traffic >= t.total_traffic => Some(b),
                _ => Some(t),
            });

        let stations_with_traffic = traffic.iter().filter(|t| t.has_traffic()).count();

        TrafficStats {
            timestamp: Utc::now(),
            time_filter: filter.into(),
            label: filter.label(),
            window_radius,
            stations: traffic.len(),
            stations_with_traffic,
            active_pct: Self::pct(stations_with_traffic, traffic.len()),
            departures: traffic.iter().map(|t| t.departures).sum(),
            arrivals: traffic.iter().map(|t| t.arrivals).sum(),
            busiest_station: busiest.map(|t| t.short_name.clone()),
            busiest_traffic: busiest.map_or(0, |t| t.total_traffic),
            mean_traffic,
            stddev_traffic: stddev(&totals, mean_traffic),
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }
}

/// Arithmetic mean. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}
