/**
* filename : error
* author : HAMA
* date: 2025. 5. 8.
* description: TWAP 실행 오류 타입
**/

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwapError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Market not found: {0}")]
    MarketNotFound(String),

    #[error("Insufficient {asset} balance: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid slice count: {0}")]
    InvalidSliceCount(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Exchange error: {0}")]
    ExchangeError(String),

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl TwapError {
    /// 주문 제출 전에 실행을 중단시키는 사전 점검 오류인지 여부
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            TwapError::AuthenticationFailed(_)
                | TwapError::MarketNotFound(_)
                | TwapError::InsufficientBalance { .. }
                | TwapError::MalformedResponse(_)
                | TwapError::Timeout(_)
        )
    }
}

impl From<::config::ConfigError> for TwapError {
    fn from(e: ::config::ConfigError) -> Self {
        TwapError::ConfigError(e.to_string())
    }
}
