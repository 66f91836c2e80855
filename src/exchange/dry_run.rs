use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::TwapError;
use crate::exchange::traits::Exchange;
use crate::models::market::{MarketInfo, TradingPair};
use crate::models::order::{OrderAck, OrderSide};
use crate::utils::current_timestamp_ms;
use crate::utils::math::format_quantity;

/// An exchange wrapper that answers queries from the real venue but
/// acknowledges orders locally without sending them
pub struct DryRunExchange {
  inner: Arc<dyn Exchange>,
  order_counter: AtomicU64,
}

impl DryRunExchange {
  pub fn new(inner: Arc<dyn Exchange>) -> Self {
    DryRunExchange { inner, order_counter: AtomicU64::new(0) }
  }

  /// 지금까지 가상으로 접수한 주문 수
  pub fn orders_recorded(&self) -> u64 {
    self.order_counter.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl Exchange for DryRunExchange {
  async fn is_authenticated(&self) -> Result<bool, TwapError> {
    self.inner.is_authenticated().await
  }

  async fn get_markets(&self) -> Result<Vec<MarketInfo>, TwapError> {
    self.inner.get_markets().await
  }

  async fn get_balance(&self, asset: &str) -> Result<String, TwapError> {
    self.inner.get_balance(asset).await
  }

  async fn submit_market_order(
    &self,
    market: &TradingPair,
    side: OrderSide,
    quantity: Decimal,
  ) -> Result<OrderAck, TwapError> {
    let seq = self.order_counter.fetch_add(1, Ordering::SeqCst) + 1;
    log::info!("[dry-run] {} {} {} not sent", side, format_quantity(quantity), market);
    Ok(OrderAck::new(
      format!("dry-{}-{}-{}", market, current_timestamp_ms(), seq),
      format_quantity(quantity),
    ))
  }
}
