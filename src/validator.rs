/**
* filename : validator
* author : HAMA
* date: 2025. 5. 12.
* description: twap 명령 인수 검증
**/

use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use rust_decimal::Decimal;

use crate::cli::TwapArgs;
use crate::config::{ExecutionConfig, DEFAULT_BASE_URL};
use crate::error::TwapError;
use crate::models::market::TradingPair;
use crate::models::order::OrderSide;
use crate::models::twap::TwapRequest;

/// 허용된 거래소 API 주소
pub const ALLOWED_BASE_URLS: [&str; 3] = [
    "https://api.enclave.market",
    "https://api-staging.enclavemarket.dev",
    "https://api-sandbox.enclave.market",
];

static MARKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]*-[A-Za-z0-9]*$").expect("market pattern is a valid regex"));

fn invalid(msg: impl Into<String>) -> TwapError {
    TwapError::InvalidParameter(msg.into())
}

fn parse_duration(name: &str, raw: &str) -> Result<Duration, TwapError> {
    humantime::parse_duration(raw.trim())
        .map_err(|_| invalid(format!("{} must be a valid time duration, received: {}", name, raw)))
}

/// 인수를 검사하고 실행 요청으로 변환. 첫 번째로 실패한 검사의 오류를 반환한다.
pub fn validate_twap_args(args: &TwapArgs, config: &ExecutionConfig) -> Result<TwapRequest, TwapError> {
    let side = OrderSide::from_str(&args.side).map_err(|_| invalid("side must be either buy or sell"))?;

    let duration = parse_duration("duration", &args.duration)?;
    let interval = parse_duration("interval", &args.interval)?;

    if interval > duration {
        return Err(invalid("interval must be less than the duration"));
    }
    if interval < config.min_interval() {
        return Err(invalid(format!(
            "minimum interval allowed is {}",
            humantime::format_duration(config.min_interval())
        )));
    }
    if duration.as_nanos() % interval.as_nanos() != 0 {
        return Err(invalid("interval must divide perfectly into the duration"));
    }
    if duration.as_nanos() / interval.as_nanos() > config.max_slices as u128 {
        return Err(invalid(format!(
            "maximum of {} intervals is allowed per execution",
            config.max_slices
        )));
    }

    let total_quantity = Decimal::from_str(args.amount.trim())
        .map_err(|_| invalid(format!("amount must be a valid number, received: {}", args.amount)))?;
    if total_quantity <= Decimal::ZERO {
        return Err(invalid(format!("amount must be positive, received: {}", args.amount)));
    }

    if !MARKET_PATTERN.is_match(&args.market) {
        return Err(invalid("market must be in the format BASE-QUOTE e.g AVAX-USDC"));
    }
    let market = TradingPair::from_str(&args.market)
        .map_err(|_| invalid("market must be in the format BASE-QUOTE e.g AVAX-USDC"))?;

    if args.api_key.as_deref().map_or(true, str::is_empty) {
        return Err(invalid("api-key must be provided"));
    }
    if args.api_secret.as_deref().map_or(true, str::is_empty) {
        return Err(invalid("api-secret must be provided"));
    }

    let base_url = args.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    if !ALLOWED_BASE_URLS.contains(&base_url) {
        return Err(invalid(format!("base-url must be one of {}", ALLOWED_BASE_URLS.join(", "))));
    }

    Ok(TwapRequest {
        side,
        market,
        total_quantity,
        duration,
        interval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn args(
        side: &str,
        amount: &str,
        duration: &str,
        market: &str,
        interval: &str,
        api_key: &str,
        api_secret: &str,
        base_url: &str,
    ) -> TwapArgs {
        TwapArgs {
            side: side.to_string(),
            amount: amount.to_string(),
            duration: duration.to_string(),
            interval: interval.to_string(),
            market: market.to_string(),
            api_key: Some(api_key.to_string()),
            api_secret: Some(api_secret.to_string()),
            base_url: Some(base_url.to_string()),
            dry_run: false,
        }
    }

    #[rstest]
    #[case::valid_buy("buy", "100.0", "10m", "BTC-USD", "1m", "key", "secret", "https://api.enclave.market", true)]
    #[case::valid_sell("sell", "50.0", "15m", "ETH-USDC", "5m", "key", "secret", "https://api-sandbox.enclave.market", true)]
    #[case::upper_case_side("BUY", "1", "10s", "AVAX-USDC", "1s", "key", "secret", "https://api-staging.enclavemarket.dev", true)]
    #[case::invalid_side("hold", "100.0", "10m", "BTC-USD", "1m", "key", "secret", "https://api.enclave.market", false)]
    #[case::invalid_duration("buy", "100.0", "invalid_duration", "BTC-USD", "1m", "key", "secret", "https://api.enclave.market", false)]
    #[case::interval_over_duration("buy", "100.0", "5m", "BTC-USD", "10m", "key", "secret", "https://api.enclave.market", false)]
    #[case::uneven_division("buy", "100.0", "10m", "BTC-USD", "3m", "key", "secret", "https://api.enclave.market", false)]
    #[case::below_min_interval("buy", "100.0", "5s", "BTC-USD", "100ms", "key", "secret", "https://api.enclave.market", false)]
    #[case::too_many_intervals("buy", "100.0", "10m", "BTC-USD", "500ms", "key", "secret", "https://api.enclave.market", false)]
    #[case::invalid_amount("buy", "invalid_amount", "10m", "BTC-USD", "1m", "key", "secret", "https://api.enclave.market", false)]
    #[case::negative_amount("buy", "-5", "10m", "BTC-USD", "1m", "key", "secret", "https://api.enclave.market", false)]
    #[case::market_with_two_dashes("buy", "100.0", "10m", "BTC-USD-X", "1m", "key", "secret", "https://api.enclave.market", false)]
    #[case::market_without_dash("buy", "100.0", "10m", "BTCUSD", "1m", "key", "secret", "https://api.enclave.market", false)]
    #[case::missing_key("buy", "100.0", "10m", "BTC-USD", "1m", "", "secret", "https://api.enclave.market", false)]
    #[case::missing_secret("buy", "100.0", "10m", "BTC-USD", "1m", "key", "", "https://api.enclave.market", false)]
    #[case::unknown_base_url("buy", "100.0", "10m", "BTC-USD", "1m", "key", "secret", "https://invalid-url.com", false)]
    fn test_validate_twap_args(
        #[case] side: &str,
        #[case] amount: &str,
        #[case] duration: &str,
        #[case] market: &str,
        #[case] interval: &str,
        #[case] api_key: &str,
        #[case] api_secret: &str,
        #[case] base_url: &str,
        #[case] ok: bool,
    ) {
        let result = validate_twap_args(
            &args(side, amount, duration, market, interval, api_key, api_secret, base_url),
            &ExecutionConfig::default(),
        );
        assert_eq!(result.is_ok(), ok, "{:?}", result);
        if let Err(e) = result {
            assert!(matches!(e, TwapError::InvalidParameter(_)));
        }
    }

    #[rstest]
    #[case("AVAX-USDC", true)]
    #[case("avax-usdc", true)]
    #[case("-", true)]
    #[case("AVAX_USDC", false)]
    #[case("AVAX-USDC ", false)]
    fn test_market_pattern(#[case] market: &str, #[case] matches: bool) {
        assert_eq!(MARKET_PATTERN.is_match(market), matches);
        // 같은 컴파일된 패턴이 반복 호출에도 동일한 결과를 낸다
        assert_eq!(MARKET_PATTERN.is_match(market), matches);
    }

    #[test]
    fn test_valid_args_become_request() {
        let request = validate_twap_args(
            &args("sell", "13.9171", "30s", "AVAX-USDC", "1s", "k", "s", "https://api-sandbox.enclave.market"),
            &ExecutionConfig::default(),
        )
        .unwrap();

        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.market, TradingPair::new("AVAX", "USDC"));
        assert_eq!(request.total_quantity, dec!(13.9171));
        assert_eq!(request.duration, Duration::from_secs(30));
        assert_eq!(request.interval, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_base_url_uses_default() {
        let mut a = args("buy", "1", "10s", "AVAX-USDC", "1s", "k", "s", "");
        a.base_url = None;
        assert!(validate_twap_args(&a, &ExecutionConfig::default()).is_ok());
    }

    #[test]
    fn test_side_checked_before_duration() {
        let err = validate_twap_args(
            &args("hold", "1", "nonsense", "AVAX-USDC", "1s", "k", "s", "https://api.enclave.market"),
            &ExecutionConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("side"));
    }
}
