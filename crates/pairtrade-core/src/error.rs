use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairTradeError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PairTradeError {
    fn from(e: serde_json::Error) -> Self {
        PairTradeError::Serialization(e.to_string())
    }
}
