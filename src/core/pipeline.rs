//! One refresh cycle: fetch, reconcile, align and derive the ratio.
use crate::core::align::align;
use crate::core::bar::BarSeries;
use crate::core::error::CoreError;
use crate::core::market::MarketDataProvider;
use crate::core::ratio::{AlignedTable, with_ratio};
use crate::core::reconcile::reconcile;
use tracing::{debug, instrument};

async fn fetch_reconciled(
    provider: &dyn MarketDataProvider,
    symbol: &str,
) -> Result<BarSeries, CoreError> {
    let (series, quote) = futures::try_join!(
        provider.fetch_daily_series(symbol),
        provider.fetch_latest_quote(symbol)
    )
    .map_err(|e| CoreError::fetch_failure(symbol, e))?;

    Ok(reconcile(series, quote.as_ref()))
}

/// Computes the aligned ratio table for `symbol_a / symbol_b`.
///
/// Both instruments are fetched concurrently. Any fetch failure aborts the
/// whole cycle. An empty table means the two series share no dates.
#[instrument(skip(provider))]
pub async fn compute_aligned_ratio(
    provider: &dyn MarketDataProvider,
    symbol_a: &str,
    symbol_b: &str,
) -> Result<AlignedTable, CoreError> {
    let (a, b) = futures::try_join!(
        fetch_reconciled(provider, symbol_a),
        fetch_reconciled(provider, symbol_b)
    )?;

    let table = with_ratio(align(&a, &b));
    debug!(
        a_bars = a.len(),
        b_bars = b.len(),
        rows = table.len(),
        "Computed aligned ratio"
    );
    Ok(table)
}
