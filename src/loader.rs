//! Initial load of stations and trips.

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::aggregator::TrafficAggregator;
use crate::config::DataSources;
use crate::fetch::{HttpClient, load_source};
use crate::model::{Station, Trip};
use crate::parser::{parse_stations, parse_trips};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub stations: Vec<Station>,
    pub trips: Vec<Trip>,
}

impl Dataset {
    pub fn into_aggregator(self, window_radius: u16) -> (Vec<Station>, TrafficAggregator) {
        let aggregator = TrafficAggregator::with_window_radius(self.trips, window_radius);
        (self.stations, aggregator)
    }
}

/// Fetches both resources concurrently and parses them.
///
/// # Errors
///
/// Any fetch or parse failure aborts the whole load.
#[tracing::instrument(skip_all, fields(stations = %sources.stations, trips = %sources.trips))]
pub async fn load_dataset<C: HttpClient + ?Sized>(client: &C, sources: &DataSources) -> Result<Dataset> {
    let (station_bytes, trip_bytes) = tokio::try_join!(
        load_source(client, &sources.stations),
        load_source(client, &sources.trips),
    )?;

    let stations = parse_stations(&station_bytes)
        .with_context(|| format!("Failed to load stations from {}", sources.stations))?;
    let trips = parse_trips(&trip_bytes)
        .with_context(|| format!("Failed to load trips from {}", sources.trips))?;

    info!(
        stations = stations.len(),
        trips = trips.len(),
        "Dataset loaded"
    );

    Ok(Dataset { stations, trips })
}

/// Like [`load_dataset`], but logs the full error chain once and returns
/// `None` so the caller can exit without reporting it again.
pub async fn try_load_dataset<C: HttpClient + ?Sized>(
    client: &C,
    sources: &DataSources,
) -> Option<Dataset> {
    match load_dataset(client, sources).await {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "Data load failed");
            None
        }
    }
}
