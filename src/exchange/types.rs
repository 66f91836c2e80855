//! Enclave REST API 요청/응답 타입

use serde::{Deserialize, Serialize};

use crate::models::order::{OrderSide, OrderType};

/// 모든 응답을 감싸는 공통 봉투
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 거래소가 보고한 오류 메시지. 성공 플래그가 false 이거나 error 필드가 있으면 Some.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_deref() {
            Some(msg) if !msg.is_empty() => Some(match self.error_code.as_deref() {
                Some(code) if !code.is_empty() => format!("{} ({})", msg, code),
                _ => msg.to_string(),
            }),
            _ if !self.success => Some("request was not successful".to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotMarketResult {
    pub pair: CurrencyPair,
    #[serde(default)]
    pub disabled: bool,
    pub base_increment: String,
    pub quote_increment: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotMarkets {
    #[serde(default)]
    pub trading_pairs: Vec<SpotMarketResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetMarketsResponse {
    #[serde(default)]
    pub spot: SpotMarkets,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBalanceResponse {
    #[serde(default)]
    pub account_id: String,
    pub free_balance: String,
    #[serde(default)]
    pub reserved_balance: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub total_balance: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetBalanceRequest<'a> {
    pub symbol: &'a str,
}

/// 시장가 주문 요청. 매수는 quoteSize, 매도는 size 를 채운다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    pub market: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_size: Option<String>,
    pub side: OrderSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpotOrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: String,
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub filled_size: String,
    #[serde(default)]
    pub filled_cost: String,
    #[serde(default)]
    pub status: String,
}
