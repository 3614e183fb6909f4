//! Market data abstractions

use crate::core::bar::{BarSeries, Quote};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full daily history for `symbol`, non-empty and date-ascending.
    async fn fetch_daily_series(&self, symbol: &str) -> Result<BarSeries>;

    /// Latest intraday observation for `symbol`, if the feed has any.
    async fn fetch_latest_quote(&self, symbol: &str) -> Result<Option<Quote>>;
}
