//! Folds the latest intraday quote into a daily bar series.
use crate::core::bar::{BarSeries, DailyBar, Quote};
use std::cmp::Ordering;
use tracing::debug;

/// Which branch [`reconcile_with_outcome`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No quote was available; the series passed through.
    NoQuote,
    /// The quote is for a day the daily feed has not published yet.
    Appended,
    /// The quote is for the current day; only its close was refreshed.
    CloseUpdated,
    /// The quote predates the last daily bar and was ignored.
    StaleQuote,
}

/// Returns `series` updated with `quote`.
///
/// A quote for a newer day appends a placeholder bar, a quote for the last
/// bar's day replaces that bar's close and nothing else, and an older quote
/// leaves the series untouched.
pub fn reconcile(series: BarSeries, quote: Option<&Quote>) -> BarSeries {
    reconcile_with_outcome(series, quote).0
}

pub fn reconcile_with_outcome(mut series: BarSeries, quote: Option<&Quote>) -> (BarSeries, Outcome) {
    let Some(quote) = quote else {
        debug!(symbol = series.symbol(), "No intraday quote, keeping daily series");
        return (series, Outcome::NoQuote);
    };

    let last_date = series.last_bar().date;
    let quote_date = quote.date();

    let outcome = match quote_date.cmp(&last_date) {
        Ordering::Greater => {
            series.push_after_last(DailyBar::from_quote(quote));
            Outcome::Appended
        }
        Ordering::Equal => {
            series.last_bar_mut().close = quote.close;
            Outcome::CloseUpdated
        }
        Ordering::Less => Outcome::StaleQuote,
    };

    debug!(
        symbol = series.symbol(),
        %last_date,
        %quote_date,
        close = quote.close,
        ?outcome,
        "Reconciled intraday quote"
    );
    (series, outcome)
}
