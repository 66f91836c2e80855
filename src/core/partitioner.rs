/**
* filename : partitioner
* author : HAMA
* date: 2025. 5. 12.
* description: 총 수량을 증분 단위 분할 주문으로 나누기
**/

use rust_decimal::Decimal;

use crate::error::TwapError;
use crate::models::twap::Slice;
use crate::utils::math::round_down;

/// `total` 을 `slice_count` 개의 분할 주문으로 나눈다.
///
/// 각 분할은 `total / slice_count` 를 증분 단위로 내린 값에서 시작하고, 남은 수량은
/// 앞쪽 분할부터 증분 하나씩 더해 나간다. 증분보다 작은 잔여분은 다음 분할 하나에
/// 모두 더해지므로 증분의 배수가 아닌 분할은 최대 하나다. 합계는 항상 `total` 과 같다.
pub fn partition(total: Decimal, increment: Decimal, slice_count: usize) -> Result<Vec<Slice>, TwapError> {
  if slice_count == 0 {
    return Err(TwapError::InvalidSliceCount(slice_count));
  }

  let count = Decimal::from(slice_count);
  let overflow = || {
    TwapError::InvalidParameter(format!("amount {} cannot be split into {} slices", total, slice_count))
  };
  let share = total.checked_div(count).ok_or_else(overflow)?;
  let base = round_down(share, increment)?;
  let mut remaining = base
    .checked_mul(count)
    .and_then(|spread| total.checked_sub(spread))
    .ok_or_else(overflow)?;

  let mut slices: Vec<Slice> = (0..slice_count)
    .map(|index| Slice { index, quantity: base })
    .collect();

  for slice in slices.iter_mut() {
    if remaining <= Decimal::ZERO {
      break;
    }
    if remaining >= increment {
      slice.quantity += increment;
      remaining -= increment;
    } else {
      slice.quantity += remaining;
      remaining = Decimal::ZERO;
    }
  }

  Ok(slices)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;
  use rust_decimal_macros::dec;

  fn sum(slices: &[Slice]) -> Decimal {
    slices.iter().map(|s| s.quantity).sum()
  }

  #[test]
  fn test_thirty_slices_of_rounded_total() {
    let total = round_down(dec!(13.9171), dec!(0.01)).unwrap();
    let slices = partition(total, dec!(0.01), 30).unwrap();

    assert_eq!(slices.len(), 30);
    for slice in &slices {
      assert!(
        slice.quantity == dec!(0.46) || slice.quantity == dec!(0.47),
        "unexpected slice quantity {}",
        slice.quantity
      );
    }
    assert_eq!(sum(&slices), dec!(13.91));
    // 잔여분은 앞쪽 분할에 배정된다
    assert_eq!(slices[0].quantity, dec!(0.47));
    assert_eq!(slices[29].quantity, dec!(0.46));
  }

  #[rstest]
  #[case(dec!(100), dec!(0.01), 7)]
  #[case(dec!(1), dec!(0.3), 2)]
  #[case(dec!(0.05), dec!(0.01), 10)]
  #[case(dec!(123.456789), dec!(0.0001), 1000)]
  #[case(dec!(9.99), dec!(1), 4)]
  #[case(dec!(5), dec!(0.01), 1)]
  fn test_sum_and_step_alignment(#[case] total: Decimal, #[case] increment: Decimal, #[case] count: usize) {
    let slices = partition(total, increment, count).unwrap();

    assert_eq!(slices.len(), count);
    assert_eq!(sum(&slices), total);
    let misaligned = slices
      .iter()
      .filter(|s| s.quantity % increment != Decimal::ZERO)
      .count();
    assert!(misaligned <= 1, "{} slices are not multiples of {}", misaligned, increment);
    assert!(slices.iter().enumerate().all(|(i, s)| s.index == i));
  }

  #[test]
  fn test_dust_goes_to_next_slice_in_order() {
    // base 0.3, remainder 0.4 -> 0.3 + 0.1 dust
    let slices = partition(dec!(1), dec!(0.3), 2).unwrap();
    assert_eq!(slices[0].quantity, dec!(0.6));
    assert_eq!(slices[1].quantity, dec!(0.4));
  }

  #[test]
  fn test_total_smaller_than_slices() {
    let slices = partition(dec!(0.03), dec!(0.01), 5).unwrap();
    let quantities: Vec<Decimal> = slices.iter().map(|s| s.quantity).collect();
    assert_eq!(quantities, vec![dec!(0.01), dec!(0.01), dec!(0.01), dec!(0), dec!(0)]);
  }

  #[test]
  fn test_largest_amount_splits_without_overflow() {
    let slices = partition(Decimal::MAX, dec!(1), 10).unwrap();
    assert_eq!(sum(&slices), Decimal::MAX);
  }

  #[test]
  fn test_zero_slices_is_rejected() {
    assert!(matches!(
      partition(dec!(10), dec!(0.01), 0),
      Err(TwapError::InvalidSliceCount(0))
    ));
  }
}
