// src/quote.rs
use crate::error::QuoteError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;

const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub high: f64,
    pub low: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Anything that can price a ticker symbol.
pub trait QuoteSource: Send + Sync {
    fn quote(&self, symbol: &str) -> impl Future<Output = Result<Quote, QuoteError>> + Send;
}

#[derive(Deserialize)]
struct GlobalQuoteData {
    #[serde(rename = "01. symbol")]
    symbol: String,
    #[serde(rename = "03. high")]
    high: String,
    #[serde(rename = "04. low")]
    low: String,
    #[serde(rename = "05. price")]
    price: String,
}

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        AlphaVantageClient {
            client,
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl QuoteSource for AlphaVantageClient {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        info!("Fetching quote for {} from provider.", symbol);
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!("Provider replied with {} bytes for {}.", body.len(), symbol);
        parse_global_quote(symbol, &body)
    }
}

/// Parses an Alpha Vantage `GLOBAL_QUOTE` body. The provider answers unknown
/// symbols with an empty object rather than an error status.
pub fn parse_global_quote(symbol: &str, body: &str) -> Result<Quote, QuoteError> {
    let response: GlobalQuoteResponse =
        serde_json::from_str(body).map_err(|e| QuoteError::Decode(e.to_string()))?;
    let raw = match response.global_quote {
        Some(value) if value.as_object().map_or(false, |o| !o.is_empty()) => value,
        _ => return Err(QuoteError::NotFound(symbol.to_string())),
    };
    let data: GlobalQuoteData =
        serde_json::from_value(raw).map_err(|e| QuoteError::Decode(e.to_string()))?;

    Ok(Quote {
        price: parse_number("05. price", &data.price)?,
        high: parse_number("03. high", &data.high)?,
        low: parse_number("04. low", &data.low)?,
        symbol: data.symbol,
        fetched_at: Utc::now(),
    })
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, QuoteError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| QuoteError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IBM_BODY: &str = r#"{
        "Global Quote": {
            "01. symbol": "IBM",
            "02. open": "168.2000",
            "03. high": "170.1500",
            "04. low": "167.5200",
            "05. price": "169.7800",
            "06. volume": "3141592",
            "07. latest trading day": "2024-05-03",
            "08. previous close": "168.3000",
            "09. change": "1.4800",
            "10. change percent": "0.8794%"
        }
    }"#;

    #[test]
    fn parses_global_quote() {
        let quote = parse_global_quote("IBM", IBM_BODY).unwrap();
        assert_eq!(quote.symbol, "IBM");
        assert_eq!(quote.price, 169.78);
        assert_eq!(quote.high, 170.15);
        assert_eq!(quote.low, 167.52);
    }

    #[test]
    fn empty_quote_object_means_unknown_symbol() {
        let err = parse_global_quote("ZZZZ", r#"{"Global Quote": {}}"#).unwrap_err();
        assert!(matches!(err, QuoteError::NotFound(s) if s == "ZZZZ"));

        // rate-limit notes come back without the quote key at all
        let err = parse_global_quote("IBM", r#"{"Note": "Thank you for using Alpha Vantage!"}"#)
            .unwrap_err();
        assert!(matches!(err, QuoteError::NotFound(_)));
    }

    #[test]
    fn malformed_price_is_reported() {
        let body = IBM_BODY.replace("169.7800", "n/a");
        let err = parse_global_quote("IBM", &body).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidNumber { field: "05. price", .. }));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = parse_global_quote("IBM", "<html>").unwrap_err();
        assert!(matches!(err, QuoteError::Decode(_)));
    }
}
