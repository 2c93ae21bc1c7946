use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All price values. Wraps Decimal to prevent accidental f64 usage.
pub type Price = Decimal;

/// Profit-and-loss values, in spread units.
pub type Pnl = Decimal;

/// A single dated price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Price,
}

/// An ordered price series for one instrument.
///
/// Timestamps must be strictly increasing; the signal builder rejects
/// anything else with an `Alignment` error. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Instrument name or ticker
    pub name: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(name: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether every timestamp is strictly greater than its predecessor.
    pub fn is_strictly_increasing(&self) -> bool {
        self.points.windows(2).all(|w| w[0].date < w[1].date)
    }
}

/// Discrete trading signal derived from z-score threshold crossings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Spread unusually low — long the spread (+1)
    Long,
    /// Spread unusually high — short the spread (−1)
    Short,
    /// No position (0)
    #[default]
    Flat,
}

impl Signal {
    /// Numeric signal value: +1, −1 or 0.
    pub fn value(&self) -> Decimal {
        match self {
            Signal::Long => Decimal::ONE,
            Signal::Short => -Decimal::ONE,
            Signal::Flat => Decimal::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Signal::Flat)
    }
}

/// One row of the signal builder output, indexed by date.
///
/// Cells that cannot be computed yet (window not filled, zero variance)
/// are `None`, never a NaN-style sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub spread: Decimal,
    pub rolling_mean: Option<Decimal>,
    pub rolling_std: Option<Decimal>,
    pub z_score: Option<Decimal>,
    pub signal: Signal,
}

/// One row of the backtest output: the signal columns plus position,
/// per-period PnL before and after costs, and cumulative PnL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    pub date: NaiveDate,
    pub spread: Decimal,
    pub rolling_mean: Option<Decimal>,
    pub rolling_std: Option<Decimal>,
    pub z_score: Option<Decimal>,
    pub signal: Signal,
    /// Signal held one period earlier; `Flat` at the first row.
    pub position: Signal,
    /// `position × (spread(t) − spread(t−1))`; `None` at the first row.
    pub pnl: Option<Pnl>,
    pub pnl_after_costs: Option<Pnl>,
    /// Running sum of `pnl_after_costs`, undefined cells contributing zero.
    pub cumulative_pnl: Pnl,
}

/// Performance snapshot computed once over the finalized series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Dickey-Fuller style unit-root t-statistic of the spread
    pub stationarity_stat: Option<Decimal>,
    /// Approximate p-value of the stationarity statistic
    pub stationarity_p_value: Option<Decimal>,
    /// Mean per-period PnL after costs
    pub mean_pnl: Option<Decimal>,
    /// Sample standard deviation of per-period PnL after costs
    pub pnl_volatility: Option<Decimal>,
    /// mean / std × sqrt(periods_per_year); undefined for zero volatility
    pub annualized_sharpe: Option<Decimal>,
    /// Largest peak-to-trough decline of cumulative PnL
    pub max_drawdown: Decimal,
    /// Number of periods with an active signal
    pub num_trades: usize,
    /// Fraction of periods with positive cost-adjusted PnL; undefined
    /// when no trades occurred
    pub win_rate: Option<Decimal>,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
