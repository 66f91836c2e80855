//! 수량 관련 유틸리티
//!
//! 거래소 증분(step size) 단위 계산 함수 제공

use rust_decimal::Decimal;

use crate::error::TwapError;

/// 수량을 증분 단위로 내림 (거래소 요구사항에 맞춰)
///
/// `increment` 의 배수 중 `value` 를 넘지 않는 가장 큰 값을 돌려준다.
/// 증분이 0 이하이면 값을 그대로 돌려준다. Decimal 범위를 넘으면 InvalidParameter.
pub fn round_down(value: Decimal, increment: Decimal) -> Result<Decimal, TwapError> {
  if increment <= Decimal::ZERO {
    return Ok(value);
  }
  value
    .checked_div(increment)
    .map(|q| q.floor())
    .and_then(|steps| steps.checked_mul(increment))
    .ok_or_else(|| {
      TwapError::InvalidParameter(format!("amount {} is too large for increment {}", value, increment))
    })
}

/// 주문 요청에 넣을 수량 문자열 (불필요한 0 제거)
pub fn format_quantity(quantity: Decimal) -> String {
  quantity.normalize().to_string()
}
