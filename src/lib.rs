//! TWAP 주문 실행 라이브러리
//!
//! 큰 주문을 일정 간격의 시장가 분할 주문으로 나누어 실행합니다.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod models;
pub mod utils;
pub mod validator;

// 핵심 타입 재노출
pub use crate::core::TwapScheduler;
pub use crate::error::TwapError;
pub use crate::exchange::traits::Exchange;
pub use crate::models::order::{OrderAck, OrderId, OrderSide};
pub use crate::models::twap::{RunSummary, SliceReport, SliceStatus, TwapPlan, TwapRequest};

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 결과 타입 별칭
pub type Result<T> = std::result::Result<T, TwapError>;
