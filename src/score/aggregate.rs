//! Ranked aggregation of score entries.

use serde::{Deserialize, Serialize};

use super::scorer::ScoreEntry;

/// Ranked summary of one analysis run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Entries sorted descending by raw score, ties broken ascending by
    /// scope name.
    pub entries: Vec<ScoreEntry>,
    /// Sum of all entry scores, accumulated in sorted order.
    pub total_score: f64,
    /// Mean entry score; 0.0 when there are no entries.
    pub average_score: f64,
}

/// Combine per-scope entries into a ranked report.
///
/// The sort is stable and total: descending raw score, with ties broken
/// lexicographically by scope name, so parallel producers and repeated runs
/// emit identical reports. The rollups are computed after sorting, keeping
/// the floating-point accumulation order fixed. An empty input yields zero
/// rollups, not NaN.
pub fn aggregate(mut entries: Vec<ScoreEntry>) -> AggregateReport {
    entries.sort_by(|a, b| {
        b.raw_score
            .partial_cmp(&a.raw_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.scope_name.cmp(&b.scope_name))
    });

    let total_score: f64 = entries.iter().map(|entry| entry.raw_score).sum();
    let average_score = if entries.is_empty() {
        0.0
    } else {
        total_score / entries.len() as f64
    };

    AggregateReport {
        entries,
        total_score,
        average_score,
    }
}
