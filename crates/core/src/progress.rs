//! Descriptive statistics over a student's scored session history.

use serde::{Deserialize, Serialize};

/// Coarse direction of score change across a history.
///
/// Compares only the first and last score; the shape of the series in
/// between does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

/// Derived statistics over an ordered series of session scores.
///
/// Recomputed fresh on every query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub average: f64,
    pub high: f64,
    pub low: f64,
    pub trend: Trend,
    pub first_score: f64,
    pub last_score: f64,
}

/// Aggregate scores ordered by ascending session time.
///
/// Returns `None` for an empty series rather than a zero-valued struct.
/// A single-element series is trivially `Stable`. Intended for bounded,
/// per-student histories (tens of points), so full recomputation per call
/// is the right trade-off.
#[must_use]
pub fn aggregate(scores: &[f64]) -> Option<ProgressStats> {
    let first_score = *scores.first()?;
    let last_score = *scores.last()?;

    // NOTE: converting the length to `f64` loses precision only for
    // absurdly long histories; per-student series stay in the tens.
    #[allow(clippy::cast_precision_loss)]
    let average = scores.iter().sum::<f64>() / scores.len() as f64;

    let high = scores.iter().copied().fold(first_score, f64::max);
    let low = scores.iter().copied().fold(first_score, f64::min);

    let trend = if last_score > first_score {
        Trend::Improving
    } else if last_score < first_score {
        Trend::Declining
    } else {
        Trend::Stable
    };

    Some(ProgressStats {
        average,
        high,
        low,
        trend,
        first_score,
        last_score,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
