/**
* filename : run_state
* author : HAMA
* date: 2025. 5. 12.
* description: 실행 중 워커들이 공유하는 카운터와 취소 신호
**/

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// TWAP 실행 한 번 동안 공유되는 상태
///
/// 체결 수와 중단 플래그만 변경 가능하며 둘 다 원자적 연산으로만 갱신된다.
#[derive(Debug)]
pub struct RunState {
  successful_count: AtomicUsize,
  abort_requested: AtomicBool,
  cancel: CancellationToken,
}

impl RunState {
  /// `cancel` 은 이 실행 전용 토큰이어야 한다 (보통 호출자 토큰의 child)
  pub fn new(cancel: CancellationToken) -> Self {
    RunState {
      successful_count: AtomicUsize::new(0),
      abort_requested: AtomicBool::new(false),
      cancel,
    }
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// 취소될 때까지 대기
  pub async fn cancelled(&self) {
    self.cancel.cancelled().await
  }

  pub fn abort_requested(&self) -> bool {
    self.abort_requested.load(Ordering::Acquire)
  }

  /// 체결 1건 기록, 갱신된 체결 수 반환
  pub fn record_fill(&self) -> usize {
    self.successful_count.fetch_add(1, Ordering::AcqRel) + 1
  }

  pub fn successful_count(&self) -> usize {
    self.successful_count.load(Ordering::Acquire)
  }

  /// 전역 중단 요청. 플래그를 false -> true 로 바꾼 호출만 취소를 수행하고 true 를 받는다.
  pub fn trigger_abort(&self) -> bool {
    let won = self
      .abort_requested
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_ok();
    if won {
      self.cancel.cancel();
    }
    won
  }
}
