//! Per-minute index of trips.
//!
//! A [`MinuteBuckets`] has one slot per minute of the day. Slots hold
//! indices into the trip list owned by the aggregator, so selecting a window
//! only touches the slots inside it.

use crate::time_filter::{MINUTES_PER_DAY, MinuteOfDay, TimeFilter, TimeWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinuteBuckets {
    slots: Vec<Vec<usize>>,
}

impl Default for MinuteBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl MinuteBuckets {
    pub fn new() -> Self {
        Self {
            slots: vec![Vec::new(); usize::from(MINUTES_PER_DAY)],
        }
    }

    /// Builds buckets by placing each item at the minute `minute_of` returns.
    pub fn build<T>(items: &[T], minute_of: impl Fn(&T) -> MinuteOfDay) -> Self {
        let mut buckets = Self::new();
        for (idx, item) in items.iter().enumerate() {
            buckets.push(minute_of(item), idx);
        }
        buckets
    }

    pub fn push(&mut self, minute: MinuteOfDay, idx: usize) {
        self.slots[minute.index()].push(idx);
    }

    pub fn slot(&self, minute: MinuteOfDay) -> &[usize] {
        &self.slots[minute.index()]
    }

    /// Total number of entries across all slots.
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Entries in every slot the filter selects, in bucket order then
    /// insertion order.
    ///
    /// `AnyTime` yields every entry. `Minute(m)` yields the inclusive
    /// circular window of `radius` minutes on each side of `m`.
    pub fn select(&self, filter: TimeFilter, radius: u16) -> Vec<usize> {
        match filter {
            TimeFilter::AnyTime => self.slots.iter().flatten().copied().collect(),
            TimeFilter::Minute(minute) => TimeWindow::new(minute, radius)
                .ranges()
                .into_iter()
                .flat_map(move |range| self.slots[range].iter().flatten())
                .copied()
                .collect(),
        }
    }
}
