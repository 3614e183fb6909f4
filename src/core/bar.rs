//! Daily bar and intraday quote types

use crate::core::error::CoreError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One trading day's aggregated record for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_interest: f64,
    pub settlement: f64,
}

impl DailyBar {
    /// Builds the placeholder bar for a trading day the daily feed has not
    /// published yet. Open interest is unknown intraday and the settlement
    /// price defaults to the last traded price.
    pub fn from_quote(quote: &Quote) -> Self {
        DailyBar {
            date: quote.date(),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            open_interest: 0.0,
            settlement: quote.close,
        }
    }
}

/// The most recent intraday trade observation for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Quote {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Date-ascending daily bars for a single instrument.
///
/// A series always holds at least one bar and never two bars for the same
/// date; [`BarSeries::new`] enforces both, including on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBarSeries")]
pub struct BarSeries {
    symbol: String,
    bars: Vec<DailyBar>,
}

#[derive(Deserialize)]
struct RawBarSeries {
    symbol: String,
    bars: Vec<DailyBar>,
}

impl TryFrom<RawBarSeries> for BarSeries {
    type Error = CoreError;

    fn try_from(raw: RawBarSeries) -> Result<Self, Self::Error> {
        BarSeries::new(&raw.symbol, raw.bars)
    }
}

impl BarSeries {
    pub fn new(symbol: &str, mut bars: Vec<DailyBar>) -> Result<Self, CoreError> {
        if bars.is_empty() {
            return Err(CoreError::InvalidSeries {
                symbol: symbol.to_string(),
                reason: "no daily bars".to_string(),
            });
        }

        bars.sort_by_key(|bar| bar.date);
        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(CoreError::InvalidSeries {
                symbol: symbol.to_string(),
                reason: format!("duplicate bar for {}", pair[0].date),
            });
        }

        Ok(BarSeries {
            symbol: symbol.to_string(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_bar(&self) -> &DailyBar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub(crate) fn last_bar_mut(&mut self) -> &mut DailyBar {
        let last = self.bars.len() - 1;
        &mut self.bars[last]
    }

    /// Appends a bar dated strictly after the current last bar.
    pub(crate) fn push_after_last(&mut self, bar: DailyBar) {
        debug_assert!(bar.date > self.last_bar().date);
        self.bars.push(bar);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn bar(d: &str, close: f64) -> DailyBar {
        DailyBar {
            date: date(d),
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 1000.0,
            open_interest: 5000.0,
            settlement: close - 0.5,
        }
    }

    /// A bar `offset` days after 2024-01-01.
    pub fn bar_on(offset: i64, close: f64) -> DailyBar {
        DailyBar {
            date: date("2024-01-01") + chrono::Duration::days(offset),
            ..bar("2024-01-01", close)
        }
    }

    /// Series on distinct, increasing day offsets with positive closes.
    pub fn arb_series(symbol: &'static str) -> impl Strategy<Value = BarSeries> {
        prop::collection::btree_map(0i64..365, 1.0..100_000.0_f64, 1..40).prop_map(move |days| {
            let bars = days
                .into_iter()
                .map(|(offset, close)| bar_on(offset, close))
                .collect();
            BarSeries::new(symbol, bars).unwrap()
        })
    }

    pub fn quote(ts: &str, close: f64) -> Quote {
        Quote {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            open: close - 3.0,
            high: close + 4.0,
            low: close - 4.0,
            close,
            volume: 42.0,
        }
    }

    #[test]
    fn test_new_sorts_bars_by_date() {
        let series = BarSeries::new(
            "cu0",
            vec![bar("2024-01-03", 3.0), bar("2024-01-01", 1.0), bar("2024-01-02", 2.0)],
        )
        .unwrap();

        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]
        );
        assert_eq!(series.last_bar().close, 3.0);
        assert_eq!(series.symbol(), "cu0");
    }

    #[test]
    fn test_new_rejects_empty_series() {
        let err = BarSeries::new("al0", vec![]).unwrap_err();
        assert_eq!(err.to_string(), "invalid daily series for al0: no daily bars");
    }

    #[test]
    fn test_new_rejects_duplicate_dates() {
        let err = BarSeries::new("al0", vec![bar("2024-01-02", 1.0), bar("2024-01-02", 2.0)])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate bar for 2024-01-02"));
    }

    #[test]
    fn test_bar_from_quote_uses_placeholders() {
        let q = quote("2024-01-02 14:59:00", 110.0);
        let b = DailyBar::from_quote(&q);
        assert_eq!(b.date, date("2024-01-02"));
        assert_eq!(b.open, 107.0);
        assert_eq!(b.high, 114.0);
        assert_eq!(b.low, 106.0);
        assert_eq!(b.close, 110.0);
        assert_eq!(b.volume, 42.0);
        assert_eq!(b.open_interest, 0.0);
        assert_eq!(b.settlement, 110.0);
    }

    #[test]
    fn test_deserialize_rejects_empty_series() {
        let result = serde_json::from_str::<BarSeries>(r#"{"symbol":"cu0","bars":[]}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid daily series for cu0: no daily bars"));
    }

    #[test]
    fn test_deserialize_sorts_and_checks_bars() {
        let unsorted = serde_json::json!({
            "symbol": "cu0",
            "bars": [bar("2024-01-03", 3.0), bar("2024-01-01", 1.0)],
        });
        let series: BarSeries = serde_json::from_value(unsorted).unwrap();
        assert_eq!(series.bars()[0].date, date("2024-01-01"));
        assert_eq!(series.last_bar().date, date("2024-01-03"));

        let duplicated = serde_json::json!({
            "symbol": "cu0",
            "bars": [bar("2024-01-02", 1.0), bar("2024-01-02", 2.0)],
        });
        let err = serde_json::from_value::<BarSeries>(duplicated).unwrap_err();
        assert!(err.to_string().contains("duplicate bar for 2024-01-02"));
    }

    #[test]
    fn test_serialized_series_round_trips_through_validation() {
        let series = BarSeries::new("al0", vec![bar("2024-01-02", 2.0)]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(serde_json::from_str::<BarSeries>(&json).unwrap(), series);
    }
}
