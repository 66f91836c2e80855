//! 로깅 유틸리티
//!
//! 로그 초기화 및 유틸리티 함수 제공

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::config::LoggingConfig;
use crate::error::TwapError;
use crate::models::twap::{RunSummary, TwapPlan};

/// 표준 출력과 로그 파일에 동시에 기록하는 writer
struct TeeWriter {
  file: Option<File>,
}

impl Write for TeeWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    io::stdout().write_all(buf)?;
    if let Some(file) = self.file.as_mut() {
      file.write_all(buf)?;
    }
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    io::stdout().flush()?;
    if let Some(file) = self.file.as_mut() {
      file.flush()?;
    }
    Ok(())
  }
}

fn parse_level(level: &str) -> LevelFilter {
  match level.to_lowercase().as_str() {
    "trace" => LevelFilter::Trace,
    "debug" => LevelFilter::Debug,
    "info" => LevelFilter::Info,
    "warn" => LevelFilter::Warn,
    "error" => LevelFilter::Error,
    _ => LevelFilter::Info,
  }
}

/// 로깅 시스템 초기화
pub fn init(config: &LoggingConfig) -> Result<(), TwapError> {
  let mut builder = Builder::from_default_env();

  // RUST_LOG 가 있으면 설정 파일보다 우선
  let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());

  let file = match config.file_path.as_deref() {
    Some(path) if !path.is_empty() => Some(
      OpenOptions::new().create(true).append(true).open(path)?,
    ),
    _ => None,
  };

  builder
    .filter_level(parse_level(&log_level))
    .format_timestamp_millis()
    .target(Target::Pipe(Box::new(TeeWriter { file })))
    .try_init()
    .map_err(|e| TwapError::ConfigError(format!("logger already initialised: {}", e)))?;

  log::info!("로깅 시스템 초기화 완료: 레벨 = {}", log_level);

  Ok(())
}

/// TWAP 실행 시작 로그
pub fn log_twap_start(plan: &TwapPlan) {
  log::info!(
    "TWAP 시작: {} {} {} - 분할 {}개, 간격 {:?}, 증분 {}",
    plan.side, plan.total_quantity, plan.market, plan.slice_count, plan.interval, plan.increment
  );
}

/// TWAP 실행 종료 로그
pub fn log_twap_summary(summary: &RunSummary) {
  log::info!("TWAP completed in {:?}", summary.elapsed);
  log::info!(
    "completed iterations: {}/{} (filled {} of {})",
    summary.successful_count, summary.slice_count, summary.filled_quantity, summary.requested_quantity
  );
  if !summary.is_complete() {
    log::warn!(
      "TWAP 미완료: {}개 분할 미체결{}",
      summary.shortfall(),
      if summary.aborted { " (재시도 한도 초과로 중단)" } else { "" }
    );
  }
}

/// 오류 로그
pub fn log_error(context: &str, error: &TwapError) {
  log::error!("오류 발생 - {}: {}", context, error);
}
