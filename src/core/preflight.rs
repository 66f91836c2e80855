/**
* filename : preflight
* author : HAMA
* date: 2025. 5. 12.
* description: 주문 제출 전 인증/마켓/잔고 확인 후 실행 계획 생성
**/

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::config::ExecutionConfig;
use crate::error::TwapError;
use crate::exchange::traits::Exchange;
use crate::models::market::{MarketSpec, TradingPair};
use crate::models::twap::{TwapPlan, TwapRequest};
use crate::utils::math::round_down;

/// 사전 점검기. 어떤 단계든 실패하면 주문은 하나도 나가지 않는다.
pub struct Preflight {
  exchange: Arc<dyn Exchange>,
  timeout: Duration,
  max_slices: usize,
}

impl Preflight {
  pub fn new(exchange: Arc<dyn Exchange>, config: &ExecutionConfig) -> Self {
    Preflight {
      exchange,
      timeout: config.preflight_timeout(),
      max_slices: config.max_slices,
    }
  }

  /// 요청을 거래소 조건에 맞춘 실행 계획으로 변환
  pub async fn prepare(&self, request: &TwapRequest) -> Result<TwapPlan, TwapError> {
    self.check_authenticated().await?;
    log::info!("API keys valid");

    let spec = self.resolve_market(&request.market).await?;
    let increment = spec.increment_for(request.side);
    log::info!("smallest increment for this market: {}", increment);

    let total = round_down(request.total_quantity, increment)?;
    if total != request.total_quantity {
      log::info!(
        "minimum increment for this trading pair is {}, rounding {} amount down to {}",
        increment, request.side, total
      );
    }
    if total <= Decimal::ZERO {
      return Err(TwapError::InvalidParameter(format!(
        "amount {} is smaller than the minimum increment {}",
        request.total_quantity, increment
      )));
    }

    self.check_balance(spec.pair.balance_asset(request.side), total).await?;

    TwapPlan::new(
      request.side,
      spec.pair,
      total,
      increment,
      request.duration,
      request.interval,
      self.max_slices,
    )
  }

  async fn check_authenticated(&self) -> Result<(), TwapError> {
    match tokio::time::timeout(self.timeout, self.exchange.is_authenticated()).await {
      Ok(Ok(true)) => Ok(()),
      Ok(Ok(false)) => Err(TwapError::AuthenticationFailed("not logged in".to_string())),
      Ok(Err(e)) => Err(TwapError::AuthenticationFailed(e.to_string())),
      Err(_) => Err(TwapError::AuthenticationFailed(format!(
        "authentication check timed out after {:?}",
        self.timeout
      ))),
    }
  }

  /// 요청한 거래쌍의 증분 정보 조회
  pub async fn resolve_market(&self, market: &TradingPair) -> Result<MarketSpec, TwapError> {
    let markets = self.bounded("market lookup", self.exchange.get_markets()).await?;

    let info = markets
      .iter()
      .find(|m| &m.pair == market)
      .ok_or_else(|| TwapError::MarketNotFound(format!("market {} does not exist", market)))?;

    MarketSpec::parse(info)
  }

  async fn check_balance(&self, asset: &str, required: Decimal) -> Result<(), TwapError> {
    let raw = self.bounded("balance check", self.exchange.get_balance(asset)).await?;
    let available = Decimal::from_str(raw.trim())
      .map_err(|_| TwapError::MalformedResponse(format!("unable to parse {} balance '{}'", asset, raw)))?;

    if available < required {
      return Err(TwapError::InsufficientBalance {
        asset: asset.to_string(),
        required,
        available,
      });
    }
    log::info!("{} balance {} covers {}", asset, available, required);
    Ok(())
  }

  async fn bounded<T, F>(&self, step: &str, fut: F) -> Result<T, TwapError>
  where
    F: Future<Output = Result<T, TwapError>>,
  {
    tokio::time::timeout(self.timeout, fut)
      .await
      .map_err(|_| TwapError::Timeout(format!("{} did not complete within {:?}", step, self.timeout)))?
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exchange::mocks::SimulatedExchange;
  use crate::exchange::traits::MockExchange;
  use crate::models::market::MarketInfo;
  use crate::models::order::OrderSide;
  use rust_decimal_macros::dec;

  fn request(side: OrderSide, market: &str, amount: Decimal) -> TwapRequest {
    TwapRequest {
      side,
      market: market.parse().unwrap(),
      total_quantity: amount,
      duration: Duration::from_secs(30),
      interval: Duration::from_secs(1),
    }
  }

  fn preflight(exchange: Arc<dyn Exchange>) -> Preflight {
    Preflight::new(exchange, &ExecutionConfig::default())
  }

  #[tokio::test]
  async fn test_buy_uses_quote_increment_and_rounds_down() {
    let exchange = SimulatedExchange::new()
      .with_market("AVAX", "USDC", "0.001", "0.01")
      .with_balance("USDC", "20");

    let plan = preflight(Arc::new(exchange))
      .prepare(&request(OrderSide::Buy, "AVAX-USDC", dec!(13.9171)))
      .await
      .unwrap();

    assert_eq!(plan.increment, dec!(0.01));
    assert_eq!(plan.total_quantity, dec!(13.91));
    assert_eq!(plan.slice_count, 30);
  }

  #[tokio::test]
  async fn test_sell_checks_base_balance() {
    let exchange = SimulatedExchange::new()
      .with_market("AVAX", "USDC", "0.001", "0.01")
      .with_balance("USDC", "1000000")
      .with_balance("AVAX", "1.5");

    let err = preflight(Arc::new(exchange))
      .prepare(&request(OrderSide::Sell, "AVAX-USDC", dec!(2)))
      .await
      .unwrap_err();

    match err {
      TwapError::InsufficientBalance { asset, required, available } => {
        assert_eq!(asset, "AVAX");
        assert_eq!(required, dec!(2));
        assert_eq!(available, dec!(1.5));
      }
      other => panic!("unexpected error {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_unknown_market() {
    let exchange = SimulatedExchange::seeded();
    let err = preflight(Arc::new(exchange))
      .prepare(&request(OrderSide::Buy, "DOGE-USDC", dec!(10)))
      .await
      .unwrap_err();
    assert!(matches!(err, TwapError::MarketNotFound(_)));
  }

  #[tokio::test]
  async fn test_rejected_credentials() {
    let exchange = SimulatedExchange::seeded().with_authenticated(false);
    let err = preflight(Arc::new(exchange))
      .prepare(&request(OrderSide::Buy, "AVAX-USDC", dec!(10)))
      .await
      .unwrap_err();
    assert!(matches!(err, TwapError::AuthenticationFailed(_)));
  }

  #[tokio::test]
  async fn test_malformed_balance() {
    let exchange = SimulatedExchange::seeded().with_balance("USDC", "lots");
    let err = preflight(Arc::new(exchange))
      .prepare(&request(OrderSide::Buy, "AVAX-USDC", dec!(10)))
      .await
      .unwrap_err();
    assert!(matches!(err, TwapError::MalformedResponse(_)));
  }

  #[tokio::test]
  async fn test_amount_below_increment() {
    let exchange = SimulatedExchange::seeded();
    let err = preflight(Arc::new(exchange))
      .prepare(&request(OrderSide::Buy, "AVAX-USDC", dec!(0.004)))
      .await
      .unwrap_err();
    assert!(matches!(err, TwapError::InvalidParameter(_)));
  }

  #[tokio::test]
  async fn test_oversized_amount_is_rejected_before_orders() {
    let exchange = Arc::new(SimulatedExchange::seeded());
    let amount = Decimal::from_str("1000000000000000000000000000").unwrap();
    let err = preflight(exchange.clone())
      .prepare(&request(OrderSide::Buy, "AVAX-USDC", amount))
      .await
      .unwrap_err();

    assert!(matches!(err, TwapError::InvalidParameter(_)));
    assert_eq!(exchange.order_calls().await, 0);
  }

  #[tokio::test]
  async fn test_auth_transport_error_fails_fast() {
    let mut exchange = MockExchange::new();
    exchange
      .expect_is_authenticated()
      .times(1)
      .returning(|| Err(TwapError::ExchangeError("connection refused".into())));
    exchange.expect_get_markets().never();
    exchange.expect_get_balance().never();
    exchange.expect_submit_market_order().never();

    let err = preflight(Arc::new(exchange))
      .prepare(&request(OrderSide::Buy, "AVAX-USDC", dec!(10)))
      .await
      .unwrap_err();
    assert!(matches!(err, TwapError::AuthenticationFailed(_)));
  }

  struct StalledExchange;

  #[async_trait::async_trait]
  impl Exchange for StalledExchange {
    async fn is_authenticated(&self) -> Result<bool, TwapError> {
      Ok(true)
    }

    async fn get_markets(&self) -> Result<Vec<MarketInfo>, TwapError> {
      std::future::pending().await
    }

    async fn get_balance(&self, _asset: &str) -> Result<String, TwapError> {
      std::future::pending().await
    }

    async fn submit_market_order(
      &self,
      _market: &TradingPair,
      _side: OrderSide,
      _quantity: Decimal,
    ) -> Result<crate::models::order::OrderAck, TwapError> {
      panic!("no order may be placed during preflight")
    }
  }

  #[tokio::test(start_paused = true)]
  async fn test_stalled_venue_times_out() {
    let started = tokio::time::Instant::now();
    let err = preflight(Arc::new(StalledExchange))
      .prepare(&request(OrderSide::Buy, "AVAX-USDC", dec!(10)))
      .await
      .unwrap_err();

    assert!(matches!(err, TwapError::Timeout(_)));
    assert!(err.is_preflight());
    assert!(started.elapsed() >= Duration::from_secs(5));
  }
}
