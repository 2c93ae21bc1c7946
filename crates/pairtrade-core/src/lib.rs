pub mod backtest;
pub mod error;
pub mod rolling;
pub mod signal;
pub mod stationarity;
pub mod types;

pub use error::PairTradeError;
pub use types::*;

/// Standard result type for all pair-trading operations
pub type PairTradeResult<T> = Result<T, PairTradeError>;
