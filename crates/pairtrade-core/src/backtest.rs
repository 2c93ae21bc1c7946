use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rolling::sqrt_decimal;
use crate::signal::{build_signals, SignalInput};
use crate::stationarity::adf_test;
use crate::types::{BacktestRow, MetricsRecord, Signal, SignalRow};
use crate::{PairTradeError, PairTradeResult};

fn default_periods_per_year() -> u32 {
    252
}

/// When the per-period transaction cost is charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// Charge whenever a non-flat signal is active, whether or not the
    /// position changed. The literal behavior of the original strategy.
    #[default]
    PerActivePeriod,
    /// Charge only when an active signal differs from the previous one
    /// (a trade entry or flip) — the conventional cost-per-trade
    /// treatment.
    PerSignalChange,
}

/// Backtest parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Transaction cost per charged period, in spread units (≥ 0)
    #[serde(default)]
    pub cost: Decimal,
    /// Trading periods per year for Sharpe annualization (default 252)
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    #[serde(default)]
    pub cost_model: CostModel,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            cost: Decimal::ZERO,
            periods_per_year: default_periods_per_year(),
            cost_model: CostModel::default(),
        }
    }
}

/// Full pipeline input: signal construction plus backtest parameters,
/// deserializable from a single flat JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairBacktestInput {
    #[serde(flatten)]
    pub signal: SignalInput,
    #[serde(flatten)]
    pub config: BacktestConfig,
}

/// Backtest output: the augmented per-period table plus the metrics
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutput {
    pub rows: Vec<BacktestRow>,
    pub metrics: MetricsRecord,
}

/// Run the cost-adjusted backtest over a finalized signal table.
///
/// Positions lag signals by one period, the first row has no PnL, and the
/// metrics are pure functions of the completed series. Degenerate inputs
/// (no trades, zero PnL variance, flat spread) surface as `None` metric
/// fields, never as errors.
pub fn run_backtest(
    rows: &[SignalRow],
    config: &BacktestConfig,
) -> PairTradeResult<BacktestOutput> {
    validate(config)?;

    let mut out = Vec::with_capacity(rows.len());
    let mut cumulative = Decimal::ZERO;

    for (t, row) in rows.iter().enumerate() {
        let position = if t == 0 { Signal::Flat } else { rows[t - 1].signal };

        let pnl = if t == 0 {
            None
        } else {
            Some(position.value() * (row.spread - rows[t - 1].spread))
        };

        let pnl_after_costs = pnl.map(|p| {
            if charged(rows, t, config.cost_model) {
                p - config.cost
            } else {
                p
            }
        });

        if let Some(p) = pnl_after_costs {
            cumulative += p;
        }

        out.push(BacktestRow {
            date: row.date,
            spread: row.spread,
            rolling_mean: row.rolling_mean,
            rolling_std: row.rolling_std,
            z_score: row.z_score,
            signal: row.signal,
            position,
            pnl,
            pnl_after_costs,
            cumulative_pnl: cumulative,
        });
    }

    let metrics = compute_metrics(&out, config.periods_per_year);
    Ok(BacktestOutput { rows: out, metrics })
}

/// Build signals and backtest them in one pass. The unit exposed to the
/// CLI and bindings.
pub fn analyze_pair(input: &PairBacktestInput) -> PairTradeResult<BacktestOutput> {
    let rows = build_signals(&input.signal)?;
    run_backtest(&rows, &input.config)
}

fn charged(rows: &[SignalRow], t: usize, model: CostModel) -> bool {
    match model {
        CostModel::PerActivePeriod => rows[t].signal.is_active(),
        CostModel::PerSignalChange => {
            rows[t].signal.is_active() && (t == 0 || rows[t].signal != rows[t - 1].signal)
        }
    }
}

fn validate(config: &BacktestConfig) -> PairTradeResult<()> {
    if config.cost < Decimal::ZERO {
        return Err(PairTradeError::InvalidParameter {
            field: "cost".into(),
            reason: "Transaction cost must be non-negative".into(),
        });
    }
    if config.periods_per_year == 0 {
        return Err(PairTradeError::InvalidParameter {
            field: "periods_per_year".into(),
            reason: "Annualization periods must be > 0".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn compute_metrics(rows: &[BacktestRow], periods_per_year: u32) -> MetricsRecord {
    let spread: Vec<Decimal> = rows.iter().map(|r| r.spread).collect();
    let adf = adf_test(&spread);

    let pnls: Vec<Decimal> = rows.iter().filter_map(|r| r.pnl_after_costs).collect();
    let (mean_pnl, pnl_volatility) = mean_and_sample_std(&pnls);

    let annualized_sharpe = match (mean_pnl, pnl_volatility) {
        (Some(mean), Some(std)) if std != Decimal::ZERO => {
            Some(mean / std * sqrt_decimal(Decimal::from(periods_per_year)))
        }
        _ => None,
    };

    let num_trades = rows.iter().filter(|r| r.signal.is_active()).count();
    let win_rate = if num_trades > 0 {
        let wins = rows
            .iter()
            .filter(|r| matches!(r.pnl_after_costs, Some(p) if p > Decimal::ZERO))
            .count();
        Some(Decimal::from(wins as i64) / Decimal::from(num_trades as i64))
    } else {
        None
    };

    MetricsRecord {
        stationarity_stat: adf.as_ref().map(|a| a.statistic),
        stationarity_p_value: adf.as_ref().map(|a| a.p_value),
        mean_pnl,
        pnl_volatility,
        annualized_sharpe,
        max_drawdown: max_drawdown(rows),
        num_trades,
        win_rate,
    }
}

fn mean_and_sample_std(values: &[Decimal]) -> (Option<Decimal>, Option<Decimal>) {
    let n = values.len();
    if n == 0 {
        return (None, None);
    }
    let n_dec = Decimal::from(n as i64);
    let mean = values.iter().copied().sum::<Decimal>() / n_dec;
    if n < 2 {
        return (Some(mean), None);
    }
    let var = values
        .iter()
        .map(|v| {
            let d = *v - mean;
            d * d
        })
        .sum::<Decimal>()
        / (n_dec - Decimal::ONE);
    (Some(mean), Some(sqrt_decimal(var)))
}

/// Largest decline of cumulative PnL from its running peak; zero when the
/// series never falls below a prior peak.
fn max_drawdown(rows: &[BacktestRow]) -> Decimal {
    let mut peak: Option<Decimal> = None;
    let mut max_dd = Decimal::ZERO;
    for row in rows {
        let cum = row.cumulative_pnl;
        let p = match peak {
            Some(p) if p >= cum => p,
            _ => {
                peak = Some(cum);
                cum
            }
        };
        if p - cum > max_dd {
            max_dd = p - cum;
        }
    }
    max_dd
}
