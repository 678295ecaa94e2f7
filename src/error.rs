//! Typed errors raised by the library.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrafficError {
    #[error("Time filter {0} is outside [-1, 1439]")]
    InvalidTimeFilter(i32),

    #[error("Unparseable timestamp {value:?}")]
    InvalidTimestamp { value: String },

    #[error("Station {short_name:?} appears more than once")]
    DuplicateStation { short_name: String },

    #[error("GET {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },
}
