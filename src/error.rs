// src/error.rs
use crate::models::PositionId;
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioError {
    Validation(String),
    NotFound(PositionId),
    StoreClosed,
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioError::Validation(msg) => write!(f, "invalid position: {}", msg),
            PortfolioError::NotFound(id) => write!(f, "no position with id {}", id),
            PortfolioError::StoreClosed => write!(f, "portfolio store is shut down"),
        }
    }
}

impl std::error::Error for PortfolioError {}

#[derive(Debug)]
pub enum QuoteError {
    Http(reqwest::Error),
    Decode(String),
    NotFound(String),
    InvalidNumber { field: &'static str, value: String },
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteError::Http(e) => write!(f, "quote request failed: {}", e),
            QuoteError::Decode(msg) => write!(f, "unexpected quote payload: {}", msg),
            QuoteError::NotFound(symbol) => write!(f, "no quote found for {}", symbol),
            QuoteError::InvalidNumber { field, value } => {
                write!(f, "quote field {} is not a number: {:?}", field, value)
            }
        }
    }
}

impl std::error::Error for QuoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuoteError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for QuoteError {
    fn from(e: reqwest::Error) -> Self {
        QuoteError::Http(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeError {
    NoQuoteSelected,
    NotHeld(String),
    ShareLimit(String),
}

impl fmt::Display for TradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeError::NoQuoteSelected => write!(f, "search for a stock first"),
            TradeError::NotHeld(symbol) => write!(f, "{} is not in the portfolio", symbol),
            TradeError::ShareLimit(symbol) => write!(f, "cannot hold more shares of {}", symbol),
        }
    }
}

impl std::error::Error for TradeError {}

#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Rejection carried out of a warp handler and rendered as JSON.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl Reject for ApiError {}

impl From<PortfolioError> for ApiError {
    fn from(e: PortfolioError) -> Self {
        let status = match e {
            PortfolioError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PortfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            PortfolioError::StoreClosed => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

impl From<QuoteError> for ApiError {
    fn from(e: QuoteError) -> Self {
        let status = match e {
            QuoteError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

impl From<TradeError> for ApiError {
    fn from(e: TradeError) -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portfolio_errors_map_to_http_statuses() {
        let e: ApiError = PortfolioError::NotFound(PositionId(42)).into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.message, "no position with id 42");

        let e: ApiError = PortfolioError::Validation("quantity is required".into()).into();
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_quote_failures_are_bad_gateway() {
        let e: ApiError = QuoteError::Decode("missing field".into()).into();
        assert_eq!(e.status, StatusCode::BAD_GATEWAY);
        let e: ApiError = QuoteError::NotFound("ZZZZ".into()).into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
    }
}
