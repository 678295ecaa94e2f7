//! Core records: trips as loaded, stations as loaded, and per-station
//! traffic derived for one time filter.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::parser::{deserialize_coordinate, deserialize_timestamp};
use crate::time_filter::{MinuteOfDay, minutes_since_midnight};

/// One row of the trips CSV.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trip {
    #[serde(default)]
    pub ride_id: Option<String>,
    #[serde(default, alias = "rideable_type")]
    pub bike_type: Option<String>,
    #[serde(default, alias = "is_member")]
    pub member_casual: Option<String>,
    pub start_station_id: String,
    pub end_station_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub started_at: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub ended_at: NaiveDateTime,
}

impl Trip {
    pub fn new(
        start_station_id: impl Into<String>,
        end_station_id: impl Into<String>,
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
    ) -> Self {
        Self {
            ride_id: None,
            bike_type: None,
            member_casual: None,
            start_station_id: start_station_id.into(),
            end_station_id: end_station_id.into(),
            started_at,
            ended_at,
        }
    }

    pub fn departure_minute(&self) -> MinuteOfDay {
        minutes_since_midnight(&self.started_at)
    }

    pub fn arrival_minute(&self) -> MinuteOfDay {
        minutes_since_midnight(&self.ended_at)
    }
}

/// A dock location from the stations document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub short_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub lon: f64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub lat: f64,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl Station {
    pub fn new(short_name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            short_name: short_name.into(),
            name: None,
            lon,
            lat,
            capacity: None,
        }
    }
}

/// Departures and arrivals attributed to one station under a time filter.
///
/// `total_traffic` is always a count; a station nobody used reports `0`.
/// Callers that need to tell "no data" apart use [`StationTraffic::departure_ratio`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationTraffic {
    pub short_name: String,
    pub arrivals: usize,
    pub departures: usize,
    pub total_traffic: usize,
}

impl StationTraffic {
    pub fn new(short_name: impl Into<String>, departures: usize, arrivals: usize) -> Self {
        Self {
            short_name: short_name.into(),
            arrivals,
            departures,
            total_traffic: arrivals + departures,
        }
    }

    pub fn has_traffic(&self) -> bool {
        self.total_traffic > 0
    }

    /// Share of traffic that left the station, or `None` with no traffic.
    pub fn departure_ratio(&self) -> Option<f64> {
        self.has_traffic()
            .then(|| self.departures as f64 / self.total_traffic as f64)
    }
}
