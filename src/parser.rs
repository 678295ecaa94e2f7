//! Decoders for the stations JSON document and the trips CSV.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::TrafficError;
use crate::model::{Station, Trip};

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

#[derive(Deserialize)]
struct StationFeed {
    data: StationData,
}

#[derive(Deserialize)]
struct StationData {
    stations: Vec<Station>,
}

/// Decodes the stations document.
///
/// Accepts the GBFS-style `{ "data": { "stations": [...] } }` envelope or a
/// bare array of stations.
///
/// # Errors
///
/// Returns an error if the bytes are not a stations document, or if two
/// stations share a `short_name`.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let document: serde_json::Value =
        serde_json::from_slice(bytes).context("Failed to parse stations JSON")?;

    // decode per shape so field-level errors reach the caller
    let stations = if document.is_array() {
        Vec::<Station>::deserialize(document).context("Failed to decode station list")?
    } else {
        StationFeed::deserialize(document)
            .context("Failed to decode stations feed")?
            .data
            .stations
    };

    let mut seen = HashSet::new();
    for station in &stations {
        if !seen.insert(station.short_name.as_str()) {
            return Err(TrafficError::DuplicateStation {
                short_name: station.short_name.clone(),
            }
            .into());
        }
    }

    Ok(stations)
}

/// Decodes the trips CSV. The first row must be a header.
///
/// # Errors
///
/// Fails on the first malformed row, naming its line.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<Trip>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);
    let mut trips = Vec::new();

    for result in rdr.deserialize() {
        let trip: Trip = result.with_context(|| {
            format!("Failed to parse trip on CSV row {}", trips.len() + 2)
        })?;
        trips.push(trip);
    }

    Ok(trips)
}

/// Parses a trip timestamp as local wall-clock time.
///
/// Offset-free timestamps are taken as written. RFC 3339 timestamps keep the
/// wall-clock time of their own offset.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TrafficError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| TrafficError::InvalidTimestamp {
            value: value.to_string(),
        })
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

pub(crate) fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(value) => Ok(value),
        Coordinate::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_parse_station_feed() {
        let json = br#"{
            "data": {
                "stations": [
                    {"short_name": "A32000", "name": "Fan Pier", "lon": -71.044, "lat": 42.353, "capacity": 15, "region_id": 10},
                    {"short_name": "M32006", "lon": "-71.09", "lat": "42.36"}
                ]
            }
        }"#;

        let stations = parse_stations(json).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].short_name, "A32000");
        assert_eq!(stations[0].name.as_deref(), Some("Fan Pier"));
        assert_eq!(stations[0].capacity, Some(15));
        assert_eq!(stations[1].lon, -71.09);
        assert_eq!(stations[1].lat, 42.36);
        assert_eq!(stations[1].name, None);
    }

    #[test]
    fn test_parse_station_list() {
        let json = br#"[{"short_name": "A", "lon": 1.5, "lat": 2.5}]"#;
        let stations = parse_stations(json).unwrap();
        assert_eq!(stations, vec![Station::new("A", 1.5, 2.5)]);
    }

    #[test]
    fn test_parse_stations_rejects_duplicates() {
        let json = br#"[
            {"short_name": "A", "lon": 1.0, "lat": 2.0},
            {"short_name": "A", "lon": 3.0, "lat": 4.0}
        ]"#;
        let err = parse_stations(json).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TrafficError>(),
            Some(&TrafficError::DuplicateStation {
                short_name: "A".to_string()
            })
        );
    }

    #[test]
    fn test_parse_stations_rejects_garbage() {
        assert!(parse_stations(b"not json").is_err());
        assert!(parse_stations(br#"{"data": {}}"#).is_err());
        assert!(parse_stations(br#"[{"short_name": "A", "lon": "east", "lat": 1}]"#).is_err());
    }

    #[test]
    fn test_bad_coordinate_error_is_reported() {
        let json = br#"{"data": {"stations": [{"short_name": "A", "lon": "east", "lat": 42.0}]}}"#;
        let err = parse_stations(json).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid coordinate \"east\""), "{message}");
        assert!(message.contains("Failed to decode stations feed"), "{message}");

        let json = br#"[{"short_name": "A", "lon": -71.0}]"#;
        let message = format!("{:#}", parse_stations(json).unwrap_err());
        assert!(message.contains("missing field `lat`"), "{message}");
    }

    #[test]
    fn test_parse_trips() {
        let csv = "ride_id,bike_type,started_at,ended_at,start_station_id,end_station_id,is_member\n\
                   r1,electric,2024-03-01 00:10:42.584,2024-03-01 00:40:01.002,A32000,M32006,1\n\
                   r2,classic,2024-03-01 23:59:59,2024-03-02 00:05:00,M32006,,0\n";

        let trips = parse_trips(csv.as_bytes()).unwrap();
        assert_eq!(trips.len(), 2);

        assert_eq!(trips[0].ride_id.as_deref(), Some("r1"));
        assert_eq!(trips[0].bike_type.as_deref(), Some("electric"));
        assert_eq!(trips[0].member_casual.as_deref(), Some("1"));
        assert_eq!(trips[0].start_station_id, "A32000");
        assert_eq!(trips[0].departure_minute().get(), 10);
        assert_eq!(trips[0].arrival_minute().get(), 40);

        assert_eq!(trips[1].end_station_id, "");
        assert_eq!(trips[1].departure_minute().get(), 1439);
        assert_eq!(trips[1].arrival_minute().get(), 5);
    }

    #[test]
    fn test_parse_trips_minimal_columns() {
        let csv = "start_station_id,end_station_id,started_at,ended_at\nA,B,2024-03-01T08:00:00,2024-03-01T08:30:00\n";
        let trips = parse_trips(csv.as_bytes()).unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].ride_id, None);
        assert_eq!(trips[0].bike_type, None);
        assert_eq!(trips[0].member_casual, None);
    }

    #[test]
    fn test_parse_trips_member_casual_column() {
        let csv = "ride_id,rideable_type,started_at,ended_at,start_station_id,end_station_id,member_casual\n\
                   r1,classic,2024-03-01 08:00:00,2024-03-01 08:30:00,A,B,member\n";
        let trips = parse_trips(csv.as_bytes()).unwrap();
        assert_eq!(trips[0].bike_type.as_deref(), Some("classic"));
        assert_eq!(trips[0].member_casual.as_deref(), Some("member"));
    }

    #[test]
    fn test_parse_trips_reports_bad_row() {
        let csv = "start_station_id,end_station_id,started_at,ended_at\n\
                   A,B,2024-03-01 08:00:00,2024-03-01 08:30:00\n\
                   A,B,yesterday,2024-03-01 08:30:00\n";
        let err = parse_trips(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn test_parse_trips_empty_body() {
        let csv = "start_station_id,end_station_id,started_at,ended_at\n";
        assert!(parse_trips(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 15, 42)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01 08:15:42").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T08:15:42").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-01 08:15:42.584").unwrap().minute(),
            15
        );
        assert_eq!(parse_timestamp("2024-03-01 08:15").unwrap().hour(), 8);
    }

    #[test]
    fn test_parse_timestamp_keeps_offset_wall_clock() {
        let ts = parse_timestamp("2024-03-01T08:15:42-05:00").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (8, 15));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(
            parse_timestamp("soon"),
            Err(TrafficError::InvalidTimestamp {
                value: "soon".to_string()
            })
        );
    }
}
