use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use pairtrade_core::backtest::{self, PairBacktestInput};
use pairtrade_core::signal::{self, SignalInput};
use pairtrade_core::with_metadata;

use crate::input;

/// Arguments for spread signal construction
#[derive(Args)]
pub struct SignalArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the rolling window length from the input document
    #[arg(long)]
    pub window: Option<u32>,
}

/// Arguments for the full backtest pipeline
#[derive(Args)]
pub struct BacktestArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the rolling window length from the input document
    #[arg(long)]
    pub window: Option<u32>,

    /// Override the per-period transaction cost from the input document
    #[arg(long)]
    pub cost: Option<Decimal>,
}

pub fn run_signal(args: SignalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut signal_input: SignalInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for signal construction".into());
    };
    if let Some(window) = args.window {
        signal_input.window = window;
    }
    let rows = signal::build_signals(&signal_input)?;
    Ok(serde_json::to_value(rows)?)
}

pub fn run_backtest(args: BacktestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut backtest_input: PairBacktestInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for backtest".into());
    };
    if let Some(window) = args.window {
        backtest_input.signal.window = window;
    }
    if let Some(cost) = args.cost {
        backtest_input.config.cost = cost;
    }

    let started = Instant::now();
    let result = backtest::analyze_pair(&backtest_input)?;
    let elapsed_us = started.elapsed().as_micros() as u64;

    let mut warnings = Vec::new();
    if result.metrics.num_trades == 0 {
        warnings.push("No trades generated — window may exceed series length or \
                       thresholds were never crossed"
            .to_string());
    }

    let envelope = with_metadata(
        "Rolling z-score mean reversion on the pair spread",
        &backtest_input.config,
        warnings,
        elapsed_us,
        result,
    );
    Ok(serde_json::to_value(envelope)?)
}
