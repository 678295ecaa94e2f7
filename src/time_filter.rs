//! Time-of-day filters over a circular 1440-minute day.
//!
//! A [`TimeFilter`] is what the slider produces: either no restriction
//! (wire value `-1`) or a minute of the day. A [`TimeWindow`] turns a minute
//! into the inclusive circular range of bucket indices around it.

use std::fmt;
use std::ops::Range;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::TrafficError;

/// Number of minutes in a day, and so the number of minute buckets.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Half-width of the default window around the selected minute.
pub const DEFAULT_WINDOW_RADIUS: u16 = 60;

/// Wire value meaning "no time restriction".
pub const ANY_TIME: i32 = -1;

/// A minute of the day in `0..1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(minute: u16) -> Option<Self> {
        (minute < MINUTES_PER_DAY).then_some(Self(minute))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Minutes since local midnight, seconds truncated.
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        // hour() < 24 and minute() < 60, so the result is always < 1440
        Self((ts.hour() * 60 + ts.minute()) as u16)
    }

    /// Shortest distance around the clock between two minutes.
    pub fn circular_distance(self, other: Self) -> u16 {
        let diff = self.0.abs_diff(other.0);
        diff.min(MINUTES_PER_DAY - diff)
    }
}

impl fmt::Display for MinuteOfDay {
    /// Formats like a US short clock time, e.g. `9:05 AM`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = NaiveTime::from_hms_opt(u32::from(self.0 / 60), u32::from(self.0 % 60), 0)
            .unwrap_or_default();
        write!(f, "{}", time.format("%-I:%M %p"))
    }
}

/// The slider position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum TimeFilter {
    #[default]
    AnyTime,
    Minute(MinuteOfDay),
}

impl TimeFilter {
    /// Label shown next to the slider.
    pub fn label(&self) -> String {
        match self {
            TimeFilter::AnyTime => "(any time)".to_string(),
            TimeFilter::Minute(minute) => minute.to_string(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, TimeFilter::Minute(_))
    }
}

impl TryFrom<i32> for TimeFilter {
    type Error = TrafficError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value == ANY_TIME {
            return Ok(TimeFilter::AnyTime);
        }
        u16::try_from(value)
            .ok()
            .and_then(MinuteOfDay::new)
            .map(TimeFilter::Minute)
            .ok_or(TrafficError::InvalidTimeFilter(value))
    }
}

impl From<TimeFilter> for i32 {
    fn from(filter: TimeFilter) -> Self {
        match filter {
            TimeFilter::AnyTime => ANY_TIME,
            TimeFilter::Minute(minute) => i32::from(minute.get()),
        }
    }
}

impl std::str::FromStr for TimeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let value: i32 = s.trim().parse()?;
        Ok(TimeFilter::try_from(value)?)
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Inclusive circular window `[center - radius, center + radius] mod 1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub center: MinuteOfDay,
    pub radius: u16,
}

impl TimeWindow {
    pub fn new(center: MinuteOfDay, radius: u16) -> Self {
        Self { center, radius }
    }

    pub fn around(center: MinuteOfDay) -> Self {
        Self::new(center, DEFAULT_WINDOW_RADIUS)
    }

    /// Number of distinct minutes the window covers.
    pub fn minute_count(&self) -> usize {
        (usize::from(self.radius) * 2 + 1).min(usize::from(MINUTES_PER_DAY))
    }

    pub fn contains(&self, minute: MinuteOfDay) -> bool {
        self.center.circular_distance(minute) <= self.radius
    }

    /// Bucket index ranges covered by the window, in ascending bucket order.
    ///
    /// A window that crosses midnight is split at the seam into
    /// `[lower, 1440)` and `[0, upper]`.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        let day = usize::from(MINUTES_PER_DAY);
        if self.minute_count() == day {
            return vec![0..day];
        }

        let radius = usize::from(self.radius);
        let center = self.center.index();
        let lower = (center + day - radius) % day;
        let upper = (center + radius) % day;

        if lower <= upper {
            vec![lower..upper + 1]
        } else {
            vec![lower..day, 0..upper + 1]
        }
    }
}

pub fn minutes_since_midnight(ts: &NaiveDateTime) -> MinuteOfDay {
    MinuteOfDay::from_timestamp(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn minute(m: u16) -> MinuteOfDay {
        MinuteOfDay::new(m).unwrap()
    }

    fn covered(window: &TimeWindow) -> Vec<usize> {
        window.ranges().into_iter().flatten().collect()
    }

    #[test]
    fn test_filter_from_wire_values() {
        assert_eq!(TimeFilter::try_from(-1), Ok(TimeFilter::AnyTime));
        assert_eq!(TimeFilter::try_from(0), Ok(TimeFilter::Minute(minute(0))));
        assert_eq!(
            TimeFilter::try_from(1439),
            Ok(TimeFilter::Minute(minute(1439)))
        );
        assert_eq!(
            TimeFilter::try_from(1440),
            Err(TrafficError::InvalidTimeFilter(1440))
        );
        assert_eq!(
            TimeFilter::try_from(-2),
            Err(TrafficError::InvalidTimeFilter(-2))
        );
    }

    #[test]
    fn test_filter_parses_from_str() {
        assert_eq!("-1".parse::<TimeFilter>().unwrap(), TimeFilter::AnyTime);
        assert_eq!(
            " 615 ".parse::<TimeFilter>().unwrap(),
            TimeFilter::Minute(minute(615))
        );
        assert!("noon".parse::<TimeFilter>().is_err());
        assert!("2000".parse::<TimeFilter>().is_err());
    }

    #[test]
    fn test_filter_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&TimeFilter::AnyTime).unwrap(), "-1");
        assert_eq!(
            serde_json::to_string(&TimeFilter::Minute(minute(700))).unwrap(),
            "700"
        );
        let parsed: TimeFilter = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, TimeFilter::Minute(minute(42)));
        assert!(serde_json::from_str::<TimeFilter>("1500").is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(TimeFilter::AnyTime.label(), "(any time)");
        assert_eq!(TimeFilter::Minute(minute(0)).label(), "12:00 AM");
        assert_eq!(TimeFilter::Minute(minute(615)).label(), "10:15 AM");
        assert_eq!(TimeFilter::Minute(minute(720)).label(), "12:00 PM");
        assert_eq!(TimeFilter::Minute(minute(780)).label(), "1:00 PM");
        assert_eq!(TimeFilter::Minute(minute(1439)).label(), "11:59 PM");
    }

    #[test]
    fn test_minutes_since_midnight_truncates_seconds() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(13, 7, 59, 999)
            .unwrap();
        assert_eq!(minutes_since_midnight(&ts), minute(13 * 60 + 7));
    }

    #[test]
    fn test_window_without_wrap() {
        let window = TimeWindow::around(minute(700));
        assert_eq!(window.ranges(), vec![640..761]);
        assert_eq!(covered(&window).len(), 121);
    }

    #[test]
    fn test_window_wraps_after_midnight() {
        let window = TimeWindow::around(minute(10));
        assert_eq!(window.ranges(), vec![1390..1440, 0..71]);
        assert_eq!(covered(&window).len(), 121);
    }

    #[test]
    fn test_window_at_seams() {
        let first = TimeWindow::around(minute(0));
        assert_eq!(first.ranges(), vec![1380..1440, 0..61]);

        let last = TimeWindow::around(minute(1439));
        assert_eq!(last.ranges(), vec![1379..1440, 0..60]);
        assert_eq!(covered(&last).len(), 121);
    }

    #[test]
    fn test_window_touching_seam_does_not_split() {
        let window = TimeWindow::around(minute(60));
        assert_eq!(window.ranges(), vec![0..121]);

        let window = TimeWindow::around(minute(1379));
        assert_eq!(window.ranges(), vec![1319..1440]);
    }

    #[test]
    fn test_wide_window_covers_day_once() {
        for radius in [720, 900, u16::MAX] {
            let window = TimeWindow::new(minute(300), radius);
            assert_eq!(window.ranges(), vec![0..1440]);
            assert_eq!(window.minute_count(), 1440);
        }
    }

    #[test]
    fn test_zero_radius_is_single_minute() {
        let window = TimeWindow::new(minute(0), 0);
        assert_eq!(window.ranges(), vec![0..1]);
    }

    #[test]
    fn test_contains_matches_ranges() {
        let window = TimeWindow::around(minute(1430));
        let indices = covered(&window);
        for m in 0..MINUTES_PER_DAY {
            let expected = indices.contains(&usize::from(m));
            assert_eq!(window.contains(minute(m)), expected, "minute {m}");
        }
    }
}
