//! Core domain model for the favorites dashboard: tickers, favorites and enrichment rows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "trader-core";

/// Display name written into a placeholder record before the worker resolves it.
pub const PLACEHOLDER_NAME: &str = "New";
pub const DEFAULT_AI_ANALYSIS: &str = "Awaiting processing";
pub const DEFAULT_NEWS_SUMMARY: &str = "No news available";
pub const DEFAULT_FULL_REPORT: &str = "Details unavailable";
pub const DEFAULT_SENTIMENT: &str = "Neutral";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("ticker must not be empty")]
    Empty,
}

/// Normalized ticker symbol: surrounding whitespace trimmed, upper-cased, never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, TickerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TickerError::Empty);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

/// A ticker the user asked to track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub ticker: Ticker,
    pub added_at: DateTime<Utc>,
}

/// Latest enrichment snapshot for a ticker, as stored.
///
/// Every content field mirrors a nullable column. The enrichment worker owns these
/// values; the favorites path only ever inserts [`EnrichmentRecord::placeholder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    pub ticker: Ticker,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dy_percentage: Option<f64>,
    pub ai_analysis: Option<String>,
    pub news_summary: Option<String>,
    pub full_report: Option<String>,
    pub sentiment: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

impl EnrichmentRecord {
    /// Record with no content at all.
    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            name: None,
            price: None,
            pe_ratio: None,
            dy_percentage: None,
            ai_analysis: None,
            news_summary: None,
            full_report: None,
            sentiment: None,
            last_update: None,
        }
    }

    /// Record seeded when a ticker is favorited before the worker has seen it.
    pub fn placeholder(ticker: Ticker) -> Self {
        Self {
            ticker,
            name: Some(PLACEHOLDER_NAME.to_string()),
            price: Some(0.0),
            pe_ratio: Some(0.0),
            dy_percentage: Some(0.0),
            ai_analysis: Some(DEFAULT_AI_ANALYSIS.to_string()),
            news_summary: Some(DEFAULT_NEWS_SUMMARY.to_string()),
            full_report: Some(DEFAULT_FULL_REPORT.to_string()),
            sentiment: Some(DEFAULT_SENTIMENT.to_string()),
            last_update: None,
        }
    }
}

/// One dashboard line: a favorite left-joined with its enrichment, with no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub ticker: Ticker,
    pub name: String,
    pub price: f64,
    pub pe_ratio: f64,
    pub dy_percentage: f64,
    pub ai_analysis: String,
    pub news_summary: String,
    pub full_report: String,
    pub sentiment: String,
    pub last_update: DateTime<Utc>,
    pub added_at: DateTime<Utc>,
}

impl DashboardRow {
    /// Applies the default table field by field, so a partially populated record only
    /// has its missing parts filled in.
    pub fn from_parts(favorite: Favorite, enrichment: Option<EnrichmentRecord>) -> Self {
        let record = enrichment.unwrap_or_else(|| EnrichmentRecord::empty(favorite.ticker.clone()));
        Self {
            ticker: favorite.ticker,
            name: record.name.unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
            price: record.price.unwrap_or(0.0),
            pe_ratio: record.pe_ratio.unwrap_or(0.0),
            dy_percentage: record.dy_percentage.unwrap_or(0.0),
            ai_analysis: record
                .ai_analysis
                .unwrap_or_else(|| DEFAULT_AI_ANALYSIS.to_string()),
            news_summary: record
                .news_summary
                .unwrap_or_else(|| DEFAULT_NEWS_SUMMARY.to_string()),
            full_report: record
                .full_report
                .unwrap_or_else(|| DEFAULT_FULL_REPORT.to_string()),
            sentiment: record.sentiment.unwrap_or_else(|| DEFAULT_SENTIMENT.to_string()),
            last_update: record.last_update.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            added_at: favorite.added_at,
        }
    }
}

/// What an add actually changed in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOutcome {
    pub ticker: Ticker,
    pub favorite_created: bool,
    pub placeholder_created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

impl RemoveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Removed => "removed",
            Self::NotFound => "not_found",
        }
    }
}

/// Row of the active-asset listing: the tickers the enrichment worker processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub id: i64,
    pub ticker: Ticker,
    pub name: Option<String>,
}

/// Headline analyzed by the news worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketNews {
    pub id: i64,
    pub ticker: String,
    pub title: String,
    pub url: String,
    pub sentiment_score: f64,
    pub sentiment_summary: String,
    pub created_at: DateTime<Utc>,
}

/// Daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}
