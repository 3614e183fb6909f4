//! Sina Finance futures feed for domestic (SHFE/DCE/ZCE) contracts.
use crate::core::{BarSeries, DailyBar, MarketDataProvider, Quote};
use crate::providers::util::{jsonp_array, number_or_string, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

const DAILY_PATH: &str = "/futures/api/jsonp.php/=/InnerFuturesNewService.getDailyKLine";
const MINUTE_PATH: &str = "/futures/api/jsonp.php/=/InnerFuturesNewService.getFewMinLine";

pub struct SinaFuturesProvider {
    base_url: String,
    client: reqwest::Client,
}

impl SinaFuturesProvider {
    pub fn new(base_url: &str) -> Self {
        SinaFuturesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_jsonp(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = reqwest::Url::parse_with_params(&format!("{}{}", self.base_url, path), query)
            .with_context(|| format!("Invalid Sina base URL: {}", self.base_url))?;
        debug!("Requesting {}", url);

        let response = with_retry(
            || async {
                self.client
                    .get(url.clone())
                    .header(reqwest::header::REFERER, "https://finance.sina.com.cn/")
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
            },
            2,
            500,
        )
        .await
        .with_context(|| format!("Request failed: {url}"))?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))
    }
}

#[derive(Deserialize, Debug)]
struct SinaDailyRow {
    d: String,
    #[serde(deserialize_with = "number_or_string")]
    o: f64,
    #[serde(deserialize_with = "number_or_string")]
    h: f64,
    #[serde(deserialize_with = "number_or_string")]
    l: f64,
    #[serde(deserialize_with = "number_or_string")]
    c: f64,
    #[serde(deserialize_with = "number_or_string")]
    v: f64,
    #[serde(deserialize_with = "number_or_string")]
    p: f64,
    #[serde(deserialize_with = "number_or_string")]
    s: f64,
}

// The intraday timestamp has shipped under several names over time.
#[derive(Deserialize, Debug)]
struct SinaMinuteRow {
    #[serde(alias = "datetime", alias = "day")]
    d: String,
    #[serde(deserialize_with = "number_or_string")]
    o: f64,
    #[serde(deserialize_with = "number_or_string")]
    h: f64,
    #[serde(deserialize_with = "number_or_string")]
    l: f64,
    #[serde(deserialize_with = "number_or_string")]
    c: f64,
    #[serde(deserialize_with = "number_or_string")]
    v: f64,
}

impl SinaDailyRow {
    fn into_bar(self) -> Result<DailyBar> {
        let date = NaiveDate::parse_from_str(&self.d, "%Y-%m-%d")
            .with_context(|| format!("Invalid daily bar date: '{}'", self.d))?;
        Ok(DailyBar {
            date,
            open: self.o,
            high: self.h,
            low: self.l,
            close: self.c,
            volume: self.v,
            open_interest: self.p,
            settlement: self.s,
        })
    }
}

impl SinaMinuteRow {
    fn into_quote(self) -> Result<Quote> {
        let timestamp = NaiveDateTime::parse_from_str(&self.d, "%Y-%m-%d %H:%M:%S")
            .with_context(|| format!("Invalid quote timestamp: '{}'", self.d))?;
        Ok(Quote {
            timestamp,
            open: self.o,
            high: self.h,
            low: self.l,
            close: self.c,
            volume: self.v,
        })
    }
}

fn parse_rows<T: DeserializeOwned>(body: &str, symbol: &str) -> Result<Vec<T>> {
    match jsonp_array(body) {
        Some(json) => serde_json::from_str(json)
            .with_context(|| format!("Failed to parse Sina response for {symbol}")),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl MarketDataProvider for SinaFuturesProvider {
    #[instrument(name = "SinaDailyFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_daily_series(&self, symbol: &str) -> Result<BarSeries> {
        let body = self.fetch_jsonp(DAILY_PATH, &[("symbol", symbol)]).await?;
        let rows: Vec<SinaDailyRow> = parse_rows(&body, symbol)?;
        if rows.is_empty() {
            return Err(anyhow!("No daily data found for symbol: {}", symbol));
        }

        let bars = rows
            .into_iter()
            .map(SinaDailyRow::into_bar)
            .collect::<Result<Vec<_>>>()?;
        debug!(bars = bars.len(), "Received Sina daily bars");
        Ok(BarSeries::new(symbol, bars)?)
    }

    #[instrument(name = "SinaQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_latest_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let body = self
            .fetch_jsonp(MINUTE_PATH, &[("symbol", symbol), ("type", "1")])
            .await?;
        let mut rows: Vec<SinaMinuteRow> = parse_rows(&body, symbol)?;

        let quote = rows.pop().map(SinaMinuteRow::into_quote).transpose()?;
        debug!(?quote, "Received Sina intraday quote");
        Ok(quote)
    }
}
