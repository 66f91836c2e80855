/**
* filename : twap_scheduler
* author : HAMA
* date: 2025. 5. 8.
* description: TWAP 실행 스케줄러. 일정 간격으로 분할 주문을 디스패치한다.
**/

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::ExecutionConfig;
use crate::core::order_worker::{OrderWorker, RetryPolicy};
use crate::core::partitioner::partition;
use crate::core::preflight::Preflight;
use crate::core::run_state::RunState;
use crate::error::TwapError;
use crate::exchange::traits::Exchange;
use crate::models::twap::{AbortReason, RunSummary, SliceReport, SliceStatus, TwapPlan, TwapRequest};
use crate::utils::logging;

/// TWAP 실행 스케줄러
pub struct TwapScheduler {
  /// 거래소 인스턴스 (실행 중 읽기 전용)
  exchange: Arc<dyn Exchange>,
  /// 재시도/타임아웃 정책
  config: ExecutionConfig,
}

impl TwapScheduler {
  pub fn new(exchange: Arc<dyn Exchange>, config: ExecutionConfig) -> Self {
    TwapScheduler { exchange, config }
  }

  /// 사전 점검 후 실행. 점검 단계의 오류는 주문 제출 전에 그대로 반환된다.
  pub async fn execute(&self, request: &TwapRequest, cancel: CancellationToken) -> Result<RunSummary, TwapError> {
    let plan = Preflight::new(self.exchange.clone(), &self.config)
      .prepare(request)
      .await?;
    self.run(&plan, cancel).await
  }

  /// 준비된 계획을 실행
  ///
  /// 첫 분할은 즉시, 이후 분할은 `interval` 마다 하나씩 디스패치한다. 워커의 결과를
  /// 기다리지 않고 다음 틱을 기다리며, 취소가 관찰되면 남은 분할은 디스패치하지 않는다.
  /// `cancel` 이 취소되면 실행이 중단되지만, 재시도 소진에 의한 중단은 `cancel` 을 건드리지 않는다.
  pub async fn run(&self, plan: &TwapPlan, cancel: CancellationToken) -> Result<RunSummary, TwapError> {
    let slices = partition(plan.total_quantity, plan.increment, plan.slice_count)?;
    logging::log_twap_start(plan);

    let state = Arc::new(RunState::new(cancel.child_token()));
    let worker = OrderWorker::new(
      self.exchange.clone(),
      state.clone(),
      plan.market.clone(),
      plan.side,
      RetryPolicy::from(&self.config),
    );

    let started = Instant::now();
    let mut ticker = interval_at(started + plan.interval, plan.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut reports = Vec::with_capacity(slices.len());
    let mut dispatched = Vec::with_capacity(slices.len());

    for slice in slices {
      if state.is_cancelled() {
        log::info!("skipping iteration {} due to cancellation", slice.index);
        reports.push(SliceReport::not_dispatched(&slice));
        continue;
      }

      if slice.index != 0 {
        tokio::select! {
          biased;
          _ = state.cancelled() => {
            log::info!("skipping iteration {} due to cancellation during wait", slice.index);
            reports.push(SliceReport::not_dispatched(&slice));
            continue;
          }
          _ = ticker.tick() => {}
        }
      }

      log::info!("dispatching iteration {}/{} at +{:?}", slice.index + 1, plan.slice_count, started.elapsed());
      let worker = worker.clone();
      let meta = (slice.index, slice.quantity);
      dispatched.push((meta, tokio::spawn(async move { worker.execute(slice).await })));
    }

    let (metas, handles): (Vec<_>, Vec<_>) = dispatched.into_iter().unzip();
    for ((index, quantity), joined) in metas.into_iter().zip(join_all(handles).await) {
      match joined {
        Ok(report) => reports.push(report),
        Err(e) => {
          log::error!("order worker for iteration {} did not complete: {}", index, e);
          reports.push(SliceReport {
            index,
            quantity,
            attempts: 0,
            status: SliceStatus::Aborted(AbortReason::WorkerFailed),
          });
        }
      }
    }
    drop(ticker);
    reports.sort_by_key(|r| r.index);

    let filled_quantity: Decimal = reports.iter().filter(|r| r.is_filled()).map(|r| r.quantity).sum();
    let summary = RunSummary {
      elapsed: started.elapsed(),
      successful_count: state.successful_count(),
      slice_count: plan.slice_count,
      aborted: state.abort_requested(),
      requested_quantity: plan.total_quantity,
      filled_quantity,
      reports,
    };
    logging::log_twap_summary(&summary);

    Ok(summary)
  }
}
