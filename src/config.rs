/**
* filename : config
* author : HAMA
* date: 2025. 5. 8.
* description: 실행 설정 로드
**/

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TwapError;

/// 샌드박스 API 기본 주소
pub const DEFAULT_BASE_URL: &str = "https://api-sandbox.enclave.market";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: String,
    pub use_mock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// 분할 주문 하나당 최대 제출 시도 횟수
    pub max_attempts: u32,
    /// 재시도 사이의 고정 대기 시간 (밀리초)
    pub retry_backoff_ms: u64,
    /// 인증/마켓/잔고 조회 각각의 제한 시간 (밀리초)
    pub preflight_timeout_ms: u64,
    /// 허용되는 최소 실행 간격 (밀리초)
    pub min_interval_ms: u64,
    /// 실행당 최대 분할 수
    pub max_slices: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from an optional `twap.{toml,json,yaml}` file and the environment
    pub fn load() -> Result<Self, TwapError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("twap").required(false))
            .add_source(
                ::config::Environment::with_prefix("TWAP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| TwapError::ConfigError(format!("Failed to read configuration: {}", e)))?;

        let mut cfg: Config = settings
            .try_deserialize()
            .map_err(|e| TwapError::ConfigError(format!("Failed to parse configuration: {}", e)))?;
        // environment overrides
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply environment variable overrides for sensitive/runtime fields
    fn apply_env_overrides(&mut self) {
        use std::env;
        if let Ok(v) = env::var("API_KEY") { if !v.is_empty() { self.exchange.api_key = Some(v); } }
        if let Ok(v) = env::var("API_SECRET") { if !v.is_empty() { self.exchange.api_secret = Some(v); } }
        if let Ok(v) = env::var("BASE_URL") { if !v.is_empty() { self.exchange.base_url = v; } }
        if let Ok(v) = env::var("LOG_FILE") { if !v.is_empty() { self.logging.file_path = Some(v); } }
        if let Ok(v) = env::var("USE_MOCK") {
            let lower = v.to_lowercase();
            if ["1","true","yes"].contains(&lower.as_str()) { self.exchange.use_mock = true; }
            if ["0","false","no"].contains(&lower.as_str()) { self.exchange.use_mock = false; }
        }
    }

    fn validate(&self) -> Result<(), TwapError> {
        if self.execution.max_attempts == 0 {
            return Err(TwapError::ConfigError("execution.max_attempts must be at least 1".to_string()));
        }
        if self.execution.max_slices == 0 {
            return Err(TwapError::ConfigError("execution.max_slices must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl ExecutionConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn preflight_timeout(&self) -> Duration {
        Duration::from_millis(self.preflight_timeout_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_key: None,
            api_secret: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            use_mock: false,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            max_attempts: 3,
            retry_backoff_ms: 200,
            preflight_timeout_ms: 5000,
            min_interval_ms: 500,
            max_slices: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file_path: Some("app.log".to_string()),
        }
    }
}
