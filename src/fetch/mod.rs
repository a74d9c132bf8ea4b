// src/fetch/mod.rs
//! Input collaborator: Alpha Vantage news and daily close prices.
//!
//! The rest of the pipeline only sees the `NewsSource` trait and a table of
//! `NewsDocument` rows; tests inject mocks at this seam.

pub mod cache;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::time::Duration;

use crate::types::{NewsDocument, PriceBar};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const TIME_PUBLISHED_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Query parameters of one news fetch. Hashed for the disk-cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NewsQuery {
    pub tickers: Vec<String>,
    pub topics: Vec<String>,
    /// `YYYYMMDDTHHMM`, per the upstream API.
    pub time_from: Option<String>,
    pub time_to: Option<String>,
}

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsDocument>>;
    fn name(&self) -> &'static str;
}

pub struct AlphaVantageClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            bail!("Alpha Vantage API key must not be empty");
        }
        let http = reqwest::Client::builder()
            .user_agent("news-sentiment-pipeline/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    async fn get_json(&self, params: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .context("sending Alpha Vantage request")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("Alpha Vantage returned {status}");
        }
        resp.json().await.context("decoding Alpha Vantage payload")
    }

    /// Fetch the daily close-price series for one ticker, sorted by date.
    /// A payload without the time series (e.g. a rate-limit notice) is an
    /// empty table.
    pub async fn fetch_prices(&self, ticker: &str) -> Result<Vec<PriceBar>> {
        let params = [
            ("function", "TIME_SERIES_DAILY".to_string()),
            ("symbol", ticker.to_string()),
            ("outputsize", "full".to_string()),
            ("apikey", self.api_key.clone()),
        ];
        let data = self.get_json(&params).await?;
        Ok(parse_prices_payload(&data))
    }
}

#[async_trait::async_trait]
impl NewsSource for AlphaVantageClient {
    /// Fetch the news table. A payload without a `feed` array is an empty
    /// table, not an error; transport and HTTP failures surface as `Err`.
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsDocument>> {
        let mut params = vec![
            ("function", "NEWS_SENTIMENT".to_string()),
            ("apikey", self.api_key.clone()),
            ("limit", "1000".to_string()),
        ];
        if !query.tickers.is_empty() {
            params.push(("tickers", query.tickers.join(",")));
        }
        if !query.topics.is_empty() {
            params.push(("topics", query.topics.join(",")));
        }
        if let Some(from) = &query.time_from {
            params.push(("time_from", from.clone()));
        }
        if let Some(to) = &query.time_to {
            params.push(("time_to", to.clone()));
        }

        let data = self.get_json(&params).await?;
        Ok(parse_news_payload(&data))
    }

    fn name(&self) -> &'static str {
        "alpha-vantage"
    }
}

/// Turn a NEWS_SENTIMENT payload into news rows. Items with no usable
/// timestamp or blank combined text are skipped.
pub fn parse_news_payload(data: &Value) -> Vec<NewsDocument> {
    let feed = match data.get("feed").and_then(Value::as_array) {
        Some(feed) if !feed.is_empty() => feed,
        _ => return Vec::new(),
    };

    let mut docs = Vec::with_capacity(feed.len());
    for item in feed {
        let title = item.get("title").and_then(Value::as_str).unwrap_or("");
        let summary = item.get("summary").and_then(Value::as_str).unwrap_or("");
        let text = format!("{title}. {summary}");
        if text.trim_matches(['.', ' ']).is_empty() {
            continue;
        }

        let date = match item
            .get("time_published")
            .and_then(Value::as_str)
            .and_then(parse_time_published)
        {
            Some(d) => d,
            None => continue,
        };

        docs.push(NewsDocument {
            date,
            text,
            source: item
                .get("source")
                .and_then(Value::as_str)
                .map(str::to_string),
            url: item.get("url").and_then(Value::as_str).map(str::to_string),
        });
    }
    docs
}

/// `20240102T143000` → 2024-01-02 (time component truncated).
fn parse_time_published(raw: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(raw, TIME_PUBLISHED_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

/// Turn a TIME_SERIES_DAILY payload into bars sorted by date. Entries that
/// fail to parse are skipped with a warning.
pub fn parse_prices_payload(data: &Value) -> Vec<PriceBar> {
    let series = match data.get("Time Series (Daily)").and_then(Value::as_object) {
        Some(s) => s,
        None => return Vec::new(),
    };

    let mut bars = Vec::with_capacity(series.len());
    for (date_str, values) in series {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok();
        let close = values
            .get("4. close")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<f64>().ok());
        match (date, close) {
            (Some(date), Some(close)) => bars.push(PriceBar { date, close }),
            _ => tracing::warn!(date = %date_str, "skipping malformed daily price entry"),
        }
    }
    bars.sort_by_key(|b| b.date);
    bars
}
