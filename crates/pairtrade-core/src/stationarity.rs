use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::rolling::sqrt_decimal;

/// Unit-root test result for a spread series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-statistic of the lag coefficient; more negative = stronger
    /// evidence of mean reversion
    pub statistic: Decimal,
    /// Approximate p-value under the Dickey-Fuller τ_μ distribution
    pub p_value: Decimal,
}

/// Approximate asymptotic percentiles of the Dickey-Fuller τ_μ
/// distribution (regression with constant, no trend).
const TAU_MU_PERCENTILES: [(Decimal, Decimal); 10] = [
    (dec!(-4.00), dec!(0.001)),
    (dec!(-3.43), dec!(0.01)),
    (dec!(-3.12), dec!(0.025)),
    (dec!(-2.86), dec!(0.05)),
    (dec!(-2.57), dec!(0.10)),
    (dec!(-1.57), dec!(0.50)),
    (dec!(-0.44), dec!(0.90)),
    (dec!(-0.07), dec!(0.95)),
    (dec!(0.60), dec!(0.99)),
    (dec!(1.28), dec!(0.999)),
];

/// Dickey-Fuller style unit-root test on a series.
///
/// Regresses first differences on the lagged level with an intercept,
/// ΔS_t = α + β·S_{t−1} + ε_t, and returns the t-statistic of β together
/// with an interpolated p-value. Returns `None` for fewer than 3
/// observations or a degenerate (zero-variance) series — those are
/// expected states of thin or flat spreads, not errors.
pub fn adf_test(series: &[Decimal]) -> Option<AdfResult> {
    let n = series.len();
    if n < 3 {
        return None;
    }
    let m = n - 1; // number of (ΔS, S_lag) pairs
    let m_dec = Decimal::from(m as i64);

    let mut sum_lag = Decimal::ZERO;
    let mut sum_ds = Decimal::ZERO;
    let mut sum_lag2 = Decimal::ZERO;
    let mut sum_lag_ds = Decimal::ZERO;

    for t in 1..n {
        let ds = series[t] - series[t - 1];
        let lag = series[t - 1];
        sum_lag += lag;
        sum_ds += ds;
        sum_lag2 += lag * lag;
        sum_lag_ds += lag * ds;
    }

    let mean_lag = sum_lag / m_dec;
    let mean_ds = sum_ds / m_dec;

    let cov = sum_lag_ds / m_dec - mean_lag * mean_ds;
    let var_lag = sum_lag2 / m_dec - mean_lag * mean_lag;

    if var_lag == Decimal::ZERO {
        return None;
    }

    let beta = cov / var_lag;
    let alpha = mean_ds - beta * mean_lag;

    // Residual standard error
    let mut sse = Decimal::ZERO;
    for t in 1..n {
        let ds = series[t] - series[t - 1];
        let lag = series[t - 1];
        let e = ds - alpha - beta * lag;
        sse += e * e;
    }
    let residual_var = sse / Decimal::from((m - 2).max(1) as i64);
    let se_beta = sqrt_decimal(residual_var / (var_lag * m_dec));

    if se_beta == Decimal::ZERO {
        return None;
    }

    let statistic = beta / se_beta;
    Some(AdfResult {
        statistic,
        p_value: p_value_from_stat(statistic),
    })
}

/// Linear interpolation of the p-value over the τ_μ percentile table,
/// clamped flat outside its range.
fn p_value_from_stat(stat: Decimal) -> Decimal {
    let (first_stat, first_p) = TAU_MU_PERCENTILES[0];
    if stat <= first_stat {
        return first_p;
    }
    let (last_stat, last_p) = TAU_MU_PERCENTILES[TAU_MU_PERCENTILES.len() - 1];
    if stat >= last_stat {
        return last_p;
    }
    for pair in TAU_MU_PERCENTILES.windows(2) {
        let (s0, p0) = pair[0];
        let (s1, p1) = pair[1];
        if stat <= s1 {
            let frac = (stat - s0) / (s1 - s0);
            return p0 + frac * (p1 - p0);
        }
    }
    last_p
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_adf_too_short() {
        assert_eq!(adf_test(&[dec!(1)]), None);
        assert_eq!(adf_test(&[dec!(1), dec!(2)]), None);
    }

    #[test]
    fn test_adf_constant_series_undefined() {
        let series = vec![dec!(3); 20];
        assert_eq!(adf_test(&series), None);
    }

    #[test]
    fn test_adf_oscillating_series_is_stationary() {
        // A series snapping between fixed levels strongly mean-reverts
        let series: Vec<Decimal> = (0..40)
            .map(|i| match i % 4 {
                0 => dec!(1),
                1 => dec!(-1),
                2 => dec!(0.5),
                _ => dec!(-0.5),
            })
            .collect();
        let result = adf_test(&series).unwrap();
        assert!(result.statistic < Decimal::ZERO);
        assert!(result.p_value < dec!(0.10));
    }

    #[test]
    fn test_adf_trending_series_not_stationary() {
        // A steadily drifting series (with a little oscillation so the
        // regression has residuals) should not look mean-reverting
        let series: Vec<Decimal> = (0..40)
            .map(|i| {
                let noise = if i % 2 == 0 { dec!(0.3) } else { dec!(-0.3) };
                Decimal::from(i) + noise
            })
            .collect();
        let result = adf_test(&series).unwrap();
        assert!(result.p_value > dec!(0.5));
    }

    #[test]
    fn test_adf_perfect_linear_trend_undefined() {
        // Zero regression residuals leave no standard error to divide by
        let series: Vec<Decimal> = (0..40).map(Decimal::from).collect();
        assert_eq!(adf_test(&series), None);
    }

    #[test]
    fn test_p_value_bounds() {
        assert_eq!(p_value_from_stat(dec!(-50)), dec!(0.001));
        assert_eq!(p_value_from_stat(dec!(50)), dec!(0.999));
    }

    #[test]
    fn test_p_value_at_knots() {
        assert_eq!(p_value_from_stat(dec!(-2.86)), dec!(0.05));
        assert_eq!(p_value_from_stat(dec!(-2.57)), dec!(0.10));
    }

    #[test]
    fn test_p_value_monotone_in_stat() {
        let stats = [dec!(-4.5), dec!(-3.2), dec!(-2.7), dec!(-1.0), dec!(0.1), dec!(1.0)];
        let mut prev = Decimal::ZERO;
        for (i, s) in stats.iter().enumerate() {
            let p = p_value_from_stat(*s);
            if i > 0 {
                assert!(p >= prev, "p-value must not decrease as stat rises");
            }
            prev = p;
        }
    }
}
