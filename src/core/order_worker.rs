/**
* filename : order_worker
* author : HAMA
* date: 2025. 5. 12.
* description: 분할 주문 하나를 제출하고 실패 시 재시도하는 워커
**/

use std::sync::Arc;
use std::time::Duration;

use crate::config::ExecutionConfig;
use crate::core::run_state::RunState;
use crate::exchange::traits::Exchange;
use crate::models::market::TradingPair;
use crate::models::order::OrderSide;
use crate::models::twap::{AbortReason, Slice, SliceReport, SliceStatus};

/// 분할 주문 재시도 정책 (고정 간격, 지수 백오프 아님)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub backoff: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    RetryPolicy {
      max_attempts: 3,
      backoff: Duration::from_millis(200),
    }
  }
}

impl From<&ExecutionConfig> for RetryPolicy {
  fn from(config: &ExecutionConfig) -> Self {
    RetryPolicy {
      max_attempts: config.max_attempts.max(1),
      backoff: config.retry_backoff(),
    }
  }
}

/// 분할 주문 워커
///
/// 상태 전이: Pending -> Submitting -> {Filled | Retrying -> Submitting | Aborted}
#[derive(Clone)]
pub struct OrderWorker {
  exchange: Arc<dyn Exchange>,
  state: Arc<RunState>,
  market: TradingPair,
  side: OrderSide,
  policy: RetryPolicy,
}

impl OrderWorker {
  pub fn new(
    exchange: Arc<dyn Exchange>,
    state: Arc<RunState>,
    market: TradingPair,
    side: OrderSide,
    policy: RetryPolicy,
  ) -> Self {
    OrderWorker { exchange, state, market, side, policy }
  }

  /// 분할 주문 하나를 체결되거나 중단될 때까지 처리
  pub async fn execute(&self, slice: Slice) -> SliceReport {
    let mut attempts: u32 = 0;

    loop {
      // 취소는 매 시도 직전에만 확인한다. 진행 중인 요청이나 대기는 끊지 않는다.
      if self.state.is_cancelled() {
        log::info!("order {} aborted due to cancellation", slice.index);
        return Self::report(&slice, attempts, SliceStatus::Aborted(AbortReason::Cancelled));
      }

      attempts += 1;
      if attempts > 1 {
        log::info!("retrying order, iteration {}, amount = {} (attempt {}/{})",
          slice.index, slice.quantity, attempts, self.policy.max_attempts);
      } else {
        log::info!("creating order, iteration {}, amount = {}", slice.index, slice.quantity);
      }

      match self.exchange.submit_market_order(&self.market, self.side, slice.quantity).await {
        Ok(ack) => {
          let filled = self.state.record_fill();
          log::info!("{} order created, iteration {}, amount = {} ({} filled so far)",
            ack.order_id, slice.index, ack.filled_size, filled);
          return Self::report(&slice, attempts, SliceStatus::Filled {
            order_id: ack.order_id,
            filled_size: ack.filled_size,
          });
        }
        Err(e) => {
          log::warn!("error creating order, iteration {}, attempt {}/{}: {}",
            slice.index, attempts, self.policy.max_attempts, e);
          if attempts >= self.policy.max_attempts {
            break;
          }
          tokio::time::sleep(self.policy.backoff).await;
        }
      }
    }

    if self.state.trigger_abort() {
      log::error!("order {} failed {} times, canceling all orders", slice.index, attempts);
    } else {
      log::warn!("order {} failed {} times, run already aborted", slice.index, attempts);
    }
    Self::report(&slice, attempts, SliceStatus::Aborted(AbortReason::RetriesExhausted))
  }

  fn report(slice: &Slice, attempts: u32, status: SliceStatus) -> SliceReport {
    SliceReport {
      index: slice.index,
      quantity: slice.quantity,
      attempts,
      status,
    }
  }
}
