//! 도메인 모델

pub mod market;
pub mod order;
pub mod twap;
