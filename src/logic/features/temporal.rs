//! Temporal Feature Extraction
//!
//! Time-to-deadline plus hour/day encoded as cyclic (sin, cos) pairs so that
//! 23:00 and 01:00 end up close to each other.

use chrono::{Datelike, Timelike};
use std::f64::consts::TAU;

use super::types::{BidRecord, TenderContext};
use super::vector::{FeatureFamily, FeatureVector};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalFeatures {
    /// Negative when submitted after the deadline
    pub days_to_deadline: f64,
    /// Hour of day including minutes (0.0 - 24.0)
    pub hour: f64,
    /// Monday = 0
    pub weekday: u32,
}

impl TemporalFeatures {
    pub fn derive(bid: &BidRecord, tender: &TenderContext) -> Self {
        let at = bid.submitted_at;
        let remaining = tender.deadline.signed_duration_since(at);

        Self {
            days_to_deadline: remaining.num_milliseconds() as f64 / MILLIS_PER_DAY,
            hour: at.hour() as f64 + at.minute() as f64 / 60.0,
            weekday: at.weekday().num_days_from_monday(),
        }
    }

    pub fn hour_cyclic(&self) -> (f64, f64) {
        let angle = TAU * self.hour / 24.0;
        (angle.sin(), angle.cos())
    }

    pub fn weekday_cyclic(&self) -> (f64, f64) {
        let angle = TAU * self.weekday as f64 / 7.0;
        (angle.sin(), angle.cos())
    }
}

impl FeatureFamily for TemporalFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        let (hour_sin, hour_cos) = self.hour_cyclic();
        let (day_sin, day_cos) = self.weekday_cyclic();

        vector.set(2, self.days_to_deadline); // days_to_deadline
        vector.set(3, hour_sin);
        vector.set(4, hour_cos);
        vector.set(5, day_sin);
        vector.set(6, day_cos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn context() -> TenderContext {
        TenderContext {
            tender_id: "T-1".into(),
            estimated_value: 1.0,
            deadline: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
            category: "Works".into(),
        }
    }

    #[test]
    fn test_days_to_deadline() {
        // Saturday 2026-02-28 00:00 → 2.5 days before deadline
        let bid = BidRecord::new("B", "T-1", "X", 1.0, Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap());
        let f = TemporalFeatures::derive(&bid, &context());
        assert!((f.days_to_deadline - 2.5).abs() < 1e-9);
        assert_eq!(f.weekday, 5);
    }

    #[test]
    fn test_late_submission_is_negative() {
        let bid = BidRecord::new("B", "T-1", "X", 1.0, Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap());
        let f = TemporalFeatures::derive(&bid, &context());
        assert!((f.days_to_deadline + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hour_encoding_is_cyclic() {
        let late = TemporalFeatures { hour: 23.5, ..Default::default() };
        let early = TemporalFeatures { hour: 0.5, ..Default::default() };
        let noon = TemporalFeatures { hour: 12.0, ..Default::default() };

        let dist = |a: (f64, f64), b: (f64, f64)| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
        assert!(dist(late.hour_cyclic(), early.hour_cyclic()) < dist(late.hour_cyclic(), noon.hour_cyclic()));
    }
}
