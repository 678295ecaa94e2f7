//! Runtime configuration read from the environment (and `.env` via `dotenvy`).

use anyhow::{Context, Result};

use crate::time_filter::DEFAULT_WINDOW_RADIUS;

pub const DEFAULT_STATIONS_URL: &str = "https://dsc106.com/labs/lab07/data/bluebikes-stations.json";
pub const DEFAULT_TRIPS_URL: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-traffic-2024-03.csv";

/// Where to load the two input resources from. Each is a URL or a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub stations: String,
    pub trips: String,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            stations: DEFAULT_STATIONS_URL.to_string(),
            trips: DEFAULT_TRIPS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sources: DataSources,
    /// Minutes on each side of the selected time.
    pub window_radius: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: DataSources::default(),
            window_radius: DEFAULT_WINDOW_RADIUS,
        }
    }
}

impl Config {
    /// Reads `STATIONS_URL`, `TRIPS_URL` and `TRAFFIC_WINDOW_MINUTES`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let window_radius = match lookup("TRAFFIC_WINDOW_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("TRAFFIC_WINDOW_MINUTES must be a minute count, got {raw:?}"))?,
            None => defaults.window_radius,
        };

        Ok(Self {
            sources: DataSources {
                stations: lookup("STATIONS_URL").unwrap_or(defaults.sources.stations),
                trips: lookup("TRIPS_URL").unwrap_or(defaults.sources.trips),
            },
            window_radius,
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        stations: Option<String>,
        trips: Option<String>,
        window_radius: Option<u16>,
    ) -> Self {
        if let Some(stations) = stations {
            self.sources.stations = stations;
        }
        if let Some(trips) = trips {
            self.sources.trips = trips;
        }
        if let Some(window_radius) = window_radius {
            self.window_radius = window_radius;
        }
        self
    }
}
