//! TWAP 실행 알고리즘의 핵심 구현체

pub mod order_worker;
pub mod partitioner;
pub mod preflight;
pub mod run_state;
pub mod twap_scheduler;

pub use twap_scheduler::TwapScheduler;
