//! Typed failures of a refresh cycle.
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a refresh cycle.
///
/// An empty [`AlignedTable`](crate::core::ratio::AlignedTable) and a stale
/// quote are not errors and never appear here.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to fetch market data for {symbol}")]
    FetchFailure {
        symbol: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid daily series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },
}

impl CoreError {
    pub fn fetch_failure(symbol: &str, source: anyhow::Error) -> Self {
        CoreError::FetchFailure {
            symbol: symbol.to_string(),
            source: source.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            CoreError::FetchFailure { symbol, .. } | CoreError::InvalidSeries { symbol, .. } => {
                symbol
            }
        }
    }
}
