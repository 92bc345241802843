use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("window start {start} must come before its end {end}")]
pub struct InvalidTimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Half-open interval `[start, end)`. Two windows that merely touch at an
/// endpoint do not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidTimeWindow> {
        if start >= end {
            return Err(InvalidTimeWindow { start, end });
        }
        Ok(TimeWindow { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn conflicts_with_any<'a>(
        &self,
        mut existing: impl Iterator<Item = &'a TimeWindow>,
    ) -> bool {
        existing.any(|window| self.overlaps(window))
    }

    /// True when `self` lies entirely within `other`.
    pub fn within(&self, other: &TimeWindow) -> bool {
        self.start >= other.start && self.end <= other.end
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration().num_seconds() as f64 / 3600.0
    }

    /// Window of `± buffer` around `instant`, used for pooling candidates.
    pub fn around(instant: DateTime<Utc>, buffer: Duration) -> Self {
        TimeWindow {
            start: instant - buffer,
            end: instant + buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 14, hour, min, 0).unwrap()
    }

    fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
    }

    #[test]
    fn test_construction_rejects_inverted_and_empty_windows() {
        assert!(TimeWindow::new(at(12, 0), at(10, 0)).is_err());
        assert!(TimeWindow::new(at(12, 0), at(12, 0)).is_err());
    }

    #[test]
    fn test_partial_and_full_overlaps_are_detected() {
        let candidate = window((10, 0), (12, 0));
        assert!(candidate.overlaps(&window((11, 0), (13, 0))));
        assert!(candidate.overlaps(&window((9, 0), (11, 0))));
        assert!(candidate.overlaps(&window((9, 0), (13, 0))));
        assert!(candidate.overlaps(&window((10, 30), (11, 30))));
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        let candidate = window((10, 0), (12, 0));
        assert!(!candidate.overlaps(&window((12, 0), (14, 0))));
        assert!(!candidate.overlaps(&window((8, 0), (10, 0))));
    }

    #[test]
    fn test_conflicts_with_any_reduces_over_existing_windows() {
        let candidate = window((10, 0), (12, 0));
        let existing = [window((7, 0), (8, 0)), window((11, 30), (14, 0))];
        assert!(candidate.conflicts_with_any(existing.iter()));

        let disjoint = [window((7, 0), (8, 0)), window((12, 0), (14, 0))];
        assert!(!candidate.conflicts_with_any(disjoint.iter()));
    }

    #[test]
    fn test_within_requires_full_containment() {
        let original = window((10, 0), (12, 0));
        assert!(window((10, 30), (11, 30)).within(&original));
        assert!(window((10, 0), (12, 0)).within(&original));
        assert!(!window((9, 30), (11, 0)).within(&original));
        assert!(!window((11, 0), (12, 30)).within(&original));
    }

    #[test]
    fn test_duration_hours_is_fractional() {
        assert_eq!(window((10, 0), (11, 30)).duration_hours(), 1.5);
    }
}
