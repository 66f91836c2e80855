use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::config::ExchangeConfig;
use crate::error::TwapError;
use crate::exchange::traits::Exchange;
use crate::exchange::types::{
  ApiResponse, CreateSpotOrderResponse, GetBalanceRequest, GetBalanceResponse, GetMarketsResponse,
  SpotOrderRequest,
};
use crate::models::market::{MarketInfo, TradingPair};
use crate::models::order::{OrderAck, OrderSide, OrderType};
use crate::utils::current_timestamp_ms;
use crate::utils::math::format_quantity;

type HmacSha256 = Hmac<Sha256>;

const AUTHED_HELLO_PATH: &str = "/authedHello";
const MARKETS_PATH: &str = "/v1/markets";
const BALANCE_PATH: &str = "/v0/get_balance";
const ORDERS_PATH: &str = "/v1/orders";

/// Enclave Markets spot REST connector
pub struct EnclaveExchange {
  base_url: String,
  api_key: String,
  api_secret: String,
  http: reqwest::Client,
}

impl EnclaveExchange {
  pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
    let base_url: String = base_url.into();
    EnclaveExchange {
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.into(),
      api_secret: api_secret.into(),
      http: reqwest::Client::new(),
    }
  }

  /// 설정에서 접속 정보를 읽어 생성. 키와 시크릿은 비어 있을 수 없다.
  pub fn from_config(config: &ExchangeConfig) -> Result<Self, TwapError> {
    let api_key = config.api_key.as_deref().unwrap_or_default();
    let api_secret = config.api_secret.as_deref().unwrap_or_default();
    if api_key.is_empty() || api_secret.is_empty() {
      return Err(TwapError::ConfigError("variables apiKey and apiSecret must be set".to_string()));
    }
    if config.base_url.is_empty() {
      return Err(TwapError::ConfigError("variable baseURL must be set".to_string()));
    }
    Ok(Self::new(config.base_url.clone(), api_key, api_secret))
  }

  /// hex(HMAC-SHA256(secret, timestamp + method + path + body))
  pub fn sign(&self, timestamp: &str, method: &str, path: &str, body: &str) -> Result<String, TwapError> {
    let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
      .map_err(|e| TwapError::ConfigError(format!("invalid api secret: {}", e)))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
  }

  async fn send<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<String>,
    signed: bool,
  ) -> Result<ApiResponse<T>, TwapError> {
    let url = format!("{}{}", self.base_url, path);
    let mut req = self.http.request(method.clone(), url);

    if signed {
      let timestamp = current_timestamp_ms().to_string();
      let signature = self.sign(&timestamp, method.as_str(), path, body.as_deref().unwrap_or(""))?;
      req = req
        .header("ENCLAVE-KEY-ID", &self.api_key)
        .header("ENCLAVE-TIMESTAMP", timestamp)
        .header("ENCLAVE-SIGN", signature);
    }
    if let Some(body) = body {
      req = req.header(CONTENT_TYPE, "application/json").body(body);
    }

    let res = req.send().await?;
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<ApiResponse<T>>(&text) {
      Ok(parsed) => Ok(parsed),
      Err(_) if !status.is_success() => {
        Err(TwapError::ExchangeError(format!("{} {} failed: {} {}", method, path, status, text)))
      }
      Err(e) => Err(TwapError::MalformedResponse(format!("{} {}: {}", method, path, e))),
    }
  }
}

#[async_trait]
impl Exchange for EnclaveExchange {
  async fn is_authenticated(&self) -> Result<bool, TwapError> {
    let response: ApiResponse<String> = self.send(Method::GET, AUTHED_HELLO_PATH, None, true).await?;
    if let Some(msg) = response.error_message() {
      log::debug!("authedHello rejected: {}", msg);
      return Ok(false);
    }
    Ok(true)
  }

  async fn get_markets(&self) -> Result<Vec<MarketInfo>, TwapError> {
    let response: ApiResponse<GetMarketsResponse> = self.send(Method::GET, MARKETS_PATH, None, false).await?;
    if let Some(msg) = response.error_message() {
      return Err(TwapError::ExchangeError(format!("get markets failed: {}", msg)));
    }
    let markets = response
      .result
      .ok_or_else(|| TwapError::MalformedResponse("markets response has no result".to_string()))?;

    Ok(markets.spot.trading_pairs.into_iter()
      .map(|m| MarketInfo {
        pair: TradingPair::new(m.pair.base, m.pair.quote),
        base_increment: m.base_increment,
        quote_increment: m.quote_increment,
      })
      .collect())
  }

  async fn get_balance(&self, asset: &str) -> Result<String, TwapError> {
    let body = serde_json::to_string(&GetBalanceRequest { symbol: asset })?;
    let response: ApiResponse<GetBalanceResponse> = self.send(Method::POST, BALANCE_PATH, Some(body), true).await?;
    if let Some(msg) = response.error_message() {
      return Err(TwapError::ExchangeError(format!("error getting balance: {}", msg)));
    }
    response
      .result
      .map(|b| b.free_balance)
      .ok_or_else(|| TwapError::MalformedResponse(format!("balance response for {} has no result", asset)))
  }

  async fn submit_market_order(
    &self,
    market: &TradingPair,
    side: OrderSide,
    quantity: Decimal,
  ) -> Result<OrderAck, TwapError> {
    let amount = format_quantity(quantity);
    let (quote_size, size) = match side {
      OrderSide::Buy => (Some(amount), None),
      OrderSide::Sell => (None, Some(amount)),
    };
    let request = SpotOrderRequest {
      client_order_id: Some(uuid::Uuid::new_v4().to_string()),
      market: market.to_string(),
      quote_size,
      side,
      size,
      order_type: OrderType::Market,
    };
    let body = serde_json::to_string(&request)?;

    let response: ApiResponse<CreateSpotOrderResponse> = self.send(Method::POST, ORDERS_PATH, Some(body), true).await?;
    if let Some(msg) = response.error_message() {
      return Err(TwapError::OrderRejected(msg));
    }
    let order = response
      .result
      .ok_or_else(|| TwapError::MalformedResponse("order response has no result".to_string()))?;

    Ok(OrderAck::new(order.order_id, order.size))
  }
}
