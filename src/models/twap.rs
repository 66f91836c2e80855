use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;

use crate::error::TwapError;
use crate::models::market::TradingPair;
use crate::models::order::{OrderId, OrderSide};

/// 검증을 통과한 TWAP 실행 요청
#[derive(Debug, Clone, PartialEq)]
pub struct TwapRequest {
    pub side: OrderSide,
    pub market: TradingPair,
    pub total_quantity: Decimal,
    pub duration: Duration,
    pub interval: Duration,
}

/// 실행 한 번에 대한 불변 계획
#[derive(Debug, Clone, PartialEq)]
pub struct TwapPlan {
    pub side: OrderSide,
    pub market: TradingPair,
    /// 증분 단위로 내림한 총 수량
    pub total_quantity: Decimal,
    pub increment: Decimal,
    pub slice_count: usize,
    pub interval: Duration,
}

impl TwapPlan {
    pub fn new(
        side: OrderSide,
        market: TradingPair,
        total_quantity: Decimal,
        increment: Decimal,
        duration: Duration,
        interval: Duration,
        max_slices: usize,
    ) -> Result<Self, TwapError> {
        let slice_count = slice_count(duration, interval)?;
        if slice_count == 0 || slice_count > max_slices {
            return Err(TwapError::InvalidParameter(format!(
                "slice count must be between 1 and {}, got {}",
                max_slices, slice_count
            )));
        }

        Ok(TwapPlan {
            side,
            market,
            total_quantity,
            increment,
            slice_count,
            interval,
        })
    }

    /// 실행 전체 기간
    pub fn duration(&self) -> Duration {
        self.interval * self.slice_count as u32
    }
}

/// duration / interval, 나누어 떨어지지 않으면 오류
pub fn slice_count(duration: Duration, interval: Duration) -> Result<usize, TwapError> {
    let interval_ns = interval.as_nanos();
    if interval_ns == 0 {
        return Err(TwapError::InvalidParameter("interval must be positive".to_string()));
    }
    let duration_ns = duration.as_nanos();
    if duration_ns % interval_ns != 0 {
        return Err(TwapError::InvalidParameter(
            "interval must divide perfectly into the duration".to_string(),
        ));
    }
    usize::try_from(duration_ns / interval_ns)
        .map_err(|_| TwapError::InvalidParameter("too many intervals".to_string()))
}

/// 예약된 분할 주문 하나
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub index: usize,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// 재시도 한도를 모두 소진함
    RetriesExhausted,
    /// 제출 전 또는 재시도 전에 취소를 관찰함
    Cancelled,
    /// 취소 이후 예정 시각이 되어 디스패치되지 않음
    NotDispatched,
    /// 워커 태스크가 결과 없이 종료됨 (panic 등)
    WorkerFailed,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbortReason::RetriesExhausted => "retries exhausted",
            AbortReason::Cancelled => "cancelled",
            AbortReason::NotDispatched => "not dispatched",
            AbortReason::WorkerFailed => "worker failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SliceStatus {
    Filled { order_id: OrderId, filled_size: String },
    Aborted(AbortReason),
}

/// 분할 주문 하나의 최종 결과
#[derive(Debug, Clone, PartialEq)]
pub struct SliceReport {
    pub index: usize,
    pub quantity: Decimal,
    /// 실제로 거래소에 보낸 제출 횟수
    pub attempts: u32,
    pub status: SliceStatus,
}

impl SliceReport {
    pub fn not_dispatched(slice: &Slice) -> Self {
        SliceReport {
            index: slice.index,
            quantity: slice.quantity,
            attempts: 0,
            status: SliceStatus::Aborted(AbortReason::NotDispatched),
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self.status, SliceStatus::Filled { .. })
    }
}

/// 실행 종료 요약
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub successful_count: usize,
    pub slice_count: usize,
    /// 재시도 소진으로 전역 중단이 발생했는지
    pub aborted: bool,
    pub requested_quantity: Decimal,
    pub filled_quantity: Decimal,
    pub reports: Vec<SliceReport>,
}

impl RunSummary {
    pub fn shortfall(&self) -> usize {
        self.slice_count.saturating_sub(self.successful_count)
    }

    pub fn is_complete(&self) -> bool {
        self.successful_count == self.slice_count
    }
}
