//! 거래소 커넥터

pub mod dry_run;
pub mod enclave;
pub mod mocks;
pub mod traits;
pub mod types;

use std::sync::Arc;

use crate::config::ExchangeConfig;
use crate::error::TwapError;
use crate::exchange::dry_run::DryRunExchange;
use crate::exchange::enclave::EnclaveExchange;
use crate::exchange::mocks::SimulatedExchange;
use crate::exchange::traits::Exchange;

/// 설정에 맞는 거래소 인스턴스 생성
pub fn connect(config: &ExchangeConfig, dry_run: bool) -> Result<Arc<dyn Exchange>, TwapError> {
    let exchange: Arc<dyn Exchange> = if config.use_mock {
        log::info!("모의 거래소 사용");
        Arc::new(SimulatedExchange::seeded())
    } else {
        log::info!("Enclave 거래소 연결: {}", config.base_url);
        Arc::new(EnclaveExchange::from_config(config)?)
    };

    if dry_run {
        log::info!("dry-run 모드: 주문은 전송되지 않습니다");
        return Ok(Arc::new(DryRunExchange::new(exchange)));
    }
    Ok(exchange)
}
