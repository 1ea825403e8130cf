pub use super::value_objects::{Quote, Timestamp};
use serde::{Deserialize, Serialize};

/// Domain entity - one sample of a price/macro series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: Timestamp,
    pub value: Quote,
}

impl SeriesPoint {
    pub fn new(time: Timestamp, value: Quote) -> Self {
        Self { time, value }
    }
}

/// Domain entity - a full series for one symbol, ascending by time.
/// Possibly empty; gaps between points are expected (missing trading days).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    /// Build from provider output. Sorted on entry so the ascending-time
    /// invariant holds even when a feed misbehaves.
    pub fn new(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by(|a, b| a.time.value().cmp(&b.time.value()));
        Self { points }
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Map a wall-clock date to a data index: the greatest index whose time
    /// is `<= target`, clamped to `[0, len - 1]`. Binary search, O(log n).
    /// An empty series locates to index 0; callers check `is_empty` first.
    pub fn locate(&self, target: Timestamp) -> usize {
        let after = self
            .points
            .partition_point(|p| p.time.value() <= target.value());
        if after == 0 {
            return 0;
        }
        (after - 1).min(self.points.len().saturating_sub(1))
    }
}
