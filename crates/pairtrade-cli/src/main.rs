mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::pairs::{BacktestArgs, SignalArgs};

/// Mean-reversion pair-trading signals and backtests
#[derive(Parser)]
#[command(
    name = "ptb",
    version,
    about = "Mean-reversion pair-trading signals and backtests",
    long_about = "A CLI for deriving mean-reversion trading signals from the spread \
                  of two aligned price series and backtesting them with decimal \
                  precision. Reports rolling z-scores, cost-adjusted PnL, and \
                  performance diagnostics (stationarity, Sharpe, drawdown, win rate)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build spread, rolling z-score and threshold signals for a pair
    Signal(SignalArgs),
    /// Run the full signal-and-backtest pipeline for a pair
    Backtest(BacktestArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Signal(args) => commands::pairs::run_signal(args),
        Commands::Backtest(args) => commands::pairs::run_backtest(args),
        Commands::Version => {
            println!("ptb {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
