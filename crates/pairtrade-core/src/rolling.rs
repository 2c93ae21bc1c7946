use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Decimal math helpers
// ---------------------------------------------------------------------------

/// Newton's method square root (20 iterations).
pub(crate) fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let mut guess = val / dec!(2);
    if guess == Decimal::ZERO {
        guess = Decimal::ONE;
    }
    for _ in 0..20 {
        guess = (guess + val / guess) / dec!(2);
    }
    guess
}

// ---------------------------------------------------------------------------
// Rolling statistics
// ---------------------------------------------------------------------------

/// Trailing-window mean and sample standard deviation, one entry per input
/// observation. Cells before the window fills are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    pub mean: Vec<Option<Decimal>>,
    pub std: Vec<Option<Decimal>>,
}

/// Rolling mean and sample (N−1) standard deviation over a trailing window
/// of `window` observations inclusive of the current one.
///
/// Maintains a sliding sum and sum-of-squares, so the whole series is a
/// single O(n) pass. With `window == 1` the mean is the observation itself
/// and the sample standard deviation is undefined everywhere.
pub fn rolling_stats(values: &[Decimal], window: usize) -> RollingStats {
    let n = values.len();
    let mut mean = vec![None; n];
    let mut std = vec![None; n];
    if window == 0 {
        return RollingStats { mean, std };
    }

    let w_dec = Decimal::from(window as i64);
    let mut sum = Decimal::ZERO;
    let mut sum_sq = Decimal::ZERO;

    for t in 0..n {
        sum += values[t];
        sum_sq += values[t] * values[t];
        if t >= window {
            let out = values[t - window];
            sum -= out;
            sum_sq -= out * out;
        }
        if t + 1 < window {
            continue;
        }

        let m = sum / w_dec;
        mean[t] = Some(m);

        if window >= 2 {
            // Sample variance: (Σx² − (Σx)²/n) / (n−1), clamped against
            // tiny negative rounding residue.
            let mut var = (sum_sq - sum * sum / w_dec) / (w_dec - Decimal::ONE);
            if var < Decimal::ZERO {
                var = Decimal::ZERO;
            }
            std[t] = Some(sqrt_decimal(var));
        }
    }

    RollingStats { mean, std }
}

/// Standardized deviation of each value from its rolling mean, in rolling
/// standard-deviation units. `None` wherever the rolling std is undefined
/// or zero.
pub fn z_scores(values: &[Decimal], stats: &RollingStats) -> Vec<Option<Decimal>> {
    values
        .iter()
        .enumerate()
        .map(|(t, v)| match (stats.mean[t], stats.std[t]) {
            (Some(m), Some(s)) if s != Decimal::ZERO => Some((*v - m) / s),
            _ => None,
        })
        .collect()
}
