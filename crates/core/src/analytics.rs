//! Analytics report shaping.
//!
//! The store supplies raw aggregates; this module turns them into the
//! response shape (two-decimal averages, zero-filled distribution).

use crate::feedback::{MAX_RATING, MIN_RATING};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate over one time window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RatingStats {
    pub count: i64,
    /// `None` when the window holds no rows.
    pub average: Option<f64>,
}

/// Body of `GET /api/analytics/report`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_feedbacks: i64,
    pub overall_avg_rating: f64,
    pub avg_rating_last_30_days: f64,
    pub avg_rating_last_60_days: f64,
    pub avg_rating_last_90_days: f64,
    pub rating_distribution: BTreeMap<String, i64>,
}

/// Window lengths, in days, reported alongside the overall average.
pub const REPORT_WINDOWS_DAYS: [i64; 3] = [30, 60, 90];

impl AnalyticsReport {
    /// Build a report from the overall aggregate, the 30/60/90 day windows and
    /// per-rating counts. Ratings missing from `counts` are reported as 0.
    pub fn build(
        overall: RatingStats,
        windows: [RatingStats; 3],
        counts: impl IntoIterator<Item = (i32, i64)>,
    ) -> Self {
        let mut rating_distribution: BTreeMap<String, i64> = (MIN_RATING..=MAX_RATING)
            .map(|rating| (rating.to_string(), 0))
            .collect();
        for (rating, count) in counts {
            if let Some(slot) = rating_distribution.get_mut(&rating.to_string()) {
                *slot += count;
            }
        }

        let [last_30, last_60, last_90] = windows;
        Self {
            total_feedbacks: overall.count,
            overall_avg_rating: round_average(overall.average),
            avg_rating_last_30_days: round_average(last_30.average),
            avg_rating_last_60_days: round_average(last_60.average),
            avg_rating_last_90_days: round_average(last_90.average),
            rating_distribution,
        }
    }

    /// The report for an empty store.
    pub fn empty() -> Self {
        Self::build(RatingStats::default(), [RatingStats::default(); 3], [])
    }
}

/// Round to two decimals; an empty window is 0.
pub fn round_average(average: Option<f64>) -> f64 {
    match average {
        Some(avg) if avg.is_finite() => (avg * 100.0).round() / 100.0,
        _ => 0.0,
    }
}
