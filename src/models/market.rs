use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TwapError;
use crate::models::order::OrderSide;

/// "BASE-QUOTE" 형식의 거래쌍
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        TradingPair {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// 주문 방향에 따라 잔고를 확인해야 하는 자산 (매수는 호가 통화, 매도는 기준 통화)
    pub fn balance_asset(&self, side: OrderSide) -> &str {
        match side {
            OrderSide::Buy => &self.quote,
            OrderSide::Sell => &self.base,
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

impl FromStr for TradingPair {
    type Err = TwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((base, quote)) if !quote.contains('-') => Ok(TradingPair::new(base, quote)),
            _ => Err(TwapError::MarketNotFound(format!("invalid market {}", s))),
        }
    }
}

/// 거래소 마켓 목록의 원본 항목. 증분 값은 거래소가 준 문자열 그대로 보관한다.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketInfo {
    pub pair: TradingPair,
    pub base_increment: String,
    pub quote_increment: String,
}

/// 증분이 Decimal 로 해석된 마켓 정보
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSpec {
    pub pair: TradingPair,
    pub base_increment: Decimal,
    pub quote_increment: Decimal,
}

impl MarketSpec {
    /// 문자열 증분을 해석한다. 해석할 수 없거나 0 이하이면 MalformedResponse.
    pub fn parse(info: &MarketInfo) -> Result<Self, TwapError> {
        let base_increment = parse_increment(&info.base_increment, &info.pair, "base")?;
        let quote_increment = parse_increment(&info.quote_increment, &info.pair, "quote")?;

        Ok(MarketSpec {
            pair: info.pair.clone(),
            base_increment,
            quote_increment,
        })
    }

    /// 매수 수량은 호가 통화로, 매도 수량은 기준 통화로 표시된다
    pub fn increment_for(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.quote_increment,
            OrderSide::Sell => self.base_increment,
        }
    }
}

fn parse_increment(raw: &str, pair: &TradingPair, which: &str) -> Result<Decimal, TwapError> {
    let value = Decimal::from_str(raw.trim()).map_err(|_| {
        TwapError::MalformedResponse(format!("unable to parse {} increment '{}' for {}", which, raw, pair))
    })?;
    if value <= Decimal::ZERO {
        return Err(TwapError::MalformedResponse(format!(
            "{} increment for {} must be positive, got {}",
            which, pair, raw
        )));
    }
    Ok(value)
}
