use crate::core::{BarSeries, DailyBar, MarketDataProvider, Quote};
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, instrument};

// YahooFinanceProvider implementation for MarketDataProvider
pub struct YahooFinanceProvider {
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chart(&self, symbol: &str, interval: &str, range: &str) -> Result<ChartItem> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval={}&range={}",
            self.base_url, symbol, interval, range
        );
        debug!("Requesting chart data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("ratiowatch/1.0")
            .build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 2, 500)
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        data.chart
            .result
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| anyhow!("No chart data found for symbol: {}", symbol))
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    // Required, but Yahoo sends `null` alongside an error object.
    #[serde(deserialize_with = "Option::deserialize")]
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug, Default)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<OhlcvArrays>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct OhlcvArrays {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// One complete chart row in exchange-local time.
struct ChartRow {
    local_time: NaiveDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl ChartItem {
    /// Rows with a close price; Yahoo pads gaps with nulls.
    fn rows(&self) -> Result<Vec<ChartRow>> {
        let (Some(timestamps), Some(quote)) = (
            self.timestamp.as_ref(),
            self.indicators.as_ref().and_then(|inds| inds.quote.first()),
        ) else {
            return Ok(Vec::new());
        };

        let offset = FixedOffset::east_opt(self.meta.gmtoffset)
            .ok_or_else(|| anyhow!("Invalid exchange gmtoffset: {}", self.meta.gmtoffset))?;
        let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(close) = field(&quote.close, i) else {
                continue;
            };
            let local_time = DateTime::from_timestamp(*ts, 0)
                .with_context(|| format!("Invalid chart timestamp: {ts}"))?
                .with_timezone(&offset)
                .naive_local();
            rows.push(ChartRow {
                local_time,
                open: field(&quote.open, i).unwrap_or(close),
                high: field(&quote.high, i).unwrap_or(close),
                low: field(&quote.low, i).unwrap_or(close),
                close,
                volume: field(&quote.volume, i).unwrap_or(0.0),
            });
        }
        Ok(rows)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooDailyFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_daily_series(&self, symbol: &str) -> Result<BarSeries> {
        let item = self.fetch_chart(symbol, "1d", "1y").await?;
        let mut bars: Vec<DailyBar> = Vec::new();
        for row in item.rows()? {
            let bar = DailyBar {
                date: row.local_time.date(),
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
                // Yahoo charts carry neither open interest nor settlement.
                open_interest: 0.0,
                settlement: row.close,
            };
            // The live bar can repeat the last session's date; keep the newest.
            match bars.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => bars.push(bar),
            }
        }

        if bars.is_empty() {
            return Err(anyhow!("No daily data found for symbol: {}", symbol));
        }
        debug!(bars = bars.len(), "Received Yahoo daily bars");
        Ok(BarSeries::new(symbol, bars)?)
    }

    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_latest_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let item = self.fetch_chart(symbol, "1m", "1d").await?;
        let quote = item.rows()?.pop().map(|row| Quote {
            timestamp: row.local_time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
        debug!(?quote, "Received Yahoo intraday quote");
        Ok(quote)
    }
}
