//! Time-windowed station traffic.
//!
//! [`TrafficAggregator`] owns the trip set and its departure/arrival minute
//! buckets, both built once. Every query afterwards only reads them, so
//! moving the slider costs the size of the window rather than the size of
//! the trip set.

use std::collections::HashMap;

use tracing::debug;

use crate::buckets::MinuteBuckets;
use crate::model::{Station, StationTraffic, Trip};
use crate::time_filter::{DEFAULT_WINDOW_RADIUS, TimeFilter};

/// Which end of a trip a query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Departure,
    Arrival,
}

#[derive(Debug, Clone)]
pub struct TrafficAggregator {
    trips: Vec<Trip>,
    departures: MinuteBuckets,
    arrivals: MinuteBuckets,
    window_radius: u16,
}

impl TrafficAggregator {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self::with_window_radius(trips, DEFAULT_WINDOW_RADIUS)
    }

    pub fn with_window_radius(trips: Vec<Trip>, window_radius: u16) -> Self {
        let departures = MinuteBuckets::build(&trips, Trip::departure_minute);
        let arrivals = MinuteBuckets::build(&trips, Trip::arrival_minute);
        debug!(trips = trips.len(), window_radius, "Minute buckets built");

        Self {
            trips,
            departures,
            arrivals,
            window_radius,
        }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn window_radius(&self) -> u16 {
        self.window_radius
    }

    pub fn buckets(&self, endpoint: Endpoint) -> &MinuteBuckets {
        match endpoint {
            Endpoint::Departure => &self.departures,
            Endpoint::Arrival => &self.arrivals,
        }
    }

    /// Trips whose departure (or arrival) minute falls inside the filter.
    pub fn filter_by_minute(&self, endpoint: Endpoint, filter: TimeFilter) -> Vec<&Trip> {
        self.buckets(endpoint)
            .select(filter, self.window_radius)
            .into_iter()
            .map(|idx| &self.trips[idx])
            .collect()
    }

    /// Counts selected trips per station id on the given end of the trip.
    pub fn counts_by_station(&self, endpoint: Endpoint, filter: TimeFilter) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for trip in self.filter_by_minute(endpoint, filter) {
            let station_id = match endpoint {
                Endpoint::Departure => trip.start_station_id.as_str(),
                Endpoint::Arrival => trip.end_station_id.as_str(),
            };
            *counts.entry(station_id).or_default() += 1;
        }
        counts
    }

    /// Derives traffic for every station under `filter`.
    ///
    /// The result has one entry per input station, in input order. Stations
    /// with no matching trips report zero counts.
    pub fn compute_station_traffic(
        &self,
        stations: &[Station],
        filter: TimeFilter,
    ) -> Vec<StationTraffic> {
        let departures = self.counts_by_station(Endpoint::Departure, filter);
        let arrivals = self.counts_by_station(Endpoint::Arrival, filter);

        let traffic: Vec<StationTraffic> = stations
            .iter()
            .map(|station| {
                let id = station.short_name.as_str();
                StationTraffic::new(
                    id,
                    departures.get(id).copied().unwrap_or(0),
                    arrivals.get(id).copied().unwrap_or(0),
                )
            })
            .collect();

        debug!(
            filter = %filter,
            stations = traffic.len(),
            departures = departures.values().sum::<usize>(),
            arrivals = arrivals.values().sum::<usize>(),
            "Station traffic computed"
        );

        traffic
    }
}
