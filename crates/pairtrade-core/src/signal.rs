use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::rolling::{rolling_stats, z_scores};
use crate::types::{PriceSeries, Signal, SignalRow};
use crate::{PairTradeError, PairTradeResult};

fn default_lower_threshold() -> Decimal {
    dec!(-1)
}

fn default_upper_threshold() -> Decimal {
    dec!(1)
}

/// Input for spread signal construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInput {
    /// First instrument of the pair
    pub series_a: PriceSeries,
    /// Second instrument of the pair
    pub series_b: PriceSeries,
    /// Rolling window length for spread mean/std (W ≥ 2 recommended)
    pub window: u32,
    /// Z-score below which to go long the spread (default −1)
    #[serde(default = "default_lower_threshold")]
    pub lower_threshold: Decimal,
    /// Z-score above which to go short the spread (default +1)
    #[serde(default = "default_upper_threshold")]
    pub upper_threshold: Decimal,
}

/// Build the spread, rolling statistics, z-scores and threshold signals
/// for an aligned pair of price series.
///
/// The two series must share an identical, strictly increasing timestamp
/// index; anything else is rejected with an `Alignment` error. Thin
/// history and zero-variance windows are not errors — the affected cells
/// come back as `None` and the signal stays `Flat`.
pub fn build_signals(input: &SignalInput) -> PairTradeResult<Vec<SignalRow>> {
    validate(input)?;

    let spread: Vec<Decimal> = input
        .series_a
        .points
        .iter()
        .zip(&input.series_b.points)
        .map(|(a, b)| a.price - b.price)
        .collect();

    let stats = rolling_stats(&spread, input.window as usize);
    let z = z_scores(&spread, &stats);

    let rows = input
        .series_a
        .points
        .iter()
        .enumerate()
        .map(|(t, point)| SignalRow {
            date: point.date,
            spread: spread[t],
            rolling_mean: stats.mean[t],
            rolling_std: stats.std[t],
            z_score: z[t],
            signal: classify(z[t], input.lower_threshold, input.upper_threshold),
        })
        .collect();

    Ok(rows)
}

/// Threshold classification. Strict inequalities: a z-score exactly on a
/// threshold does not cross it, and an undefined z-score is always flat.
fn classify(z: Option<Decimal>, lower: Decimal, upper: Decimal) -> Signal {
    match z {
        Some(z) if z < lower => Signal::Long,
        Some(z) if z > upper => Signal::Short,
        _ => Signal::Flat,
    }
}

fn validate(input: &SignalInput) -> PairTradeResult<()> {
    if input.window == 0 {
        return Err(PairTradeError::InvalidParameter {
            field: "window".into(),
            reason: "Rolling window must be > 0".into(),
        });
    }
    if input.lower_threshold >= input.upper_threshold {
        return Err(PairTradeError::InvalidParameter {
            field: "lower_threshold".into(),
            reason: format!(
                "Lower threshold {} must be below upper threshold {}",
                input.lower_threshold, input.upper_threshold
            ),
        });
    }
    if input.series_a.len() != input.series_b.len() {
        return Err(PairTradeError::Alignment(format!(
            "{} has {} observations but {} has {} — series must be aligned",
            input.series_a.name,
            input.series_a.len(),
            input.series_b.name,
            input.series_b.len()
        )));
    }
    if !input.series_a.is_strictly_increasing() || !input.series_b.is_strictly_increasing() {
        return Err(PairTradeError::Alignment(
            "Timestamps must be strictly increasing".into(),
        ));
    }
    for (a, b) in input.series_a.points.iter().zip(&input.series_b.points) {
        if a.date != b.date {
            return Err(PairTradeError::Alignment(format!(
                "Timestamp mismatch: {} has {} where {} has {}",
                input.series_a.name, a.date, input.series_b.name, b.date
            )));
        }
    }
    Ok(())
}
