//! 명령줄 인터페이스 정의

use clap::{Args, Parser, Subcommand};

/// xtwap - 시간 가중 평균 가격(TWAP) 주문 실행기
#[derive(Parser, Debug)]
#[command(name = "xtwap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 정해진 기간 동안 일정 간격으로 시장가 주문을 나누어 실행
    Twap(TwapArgs),
}

/// `twap` 명령 인수. 값은 모두 문자열로 받고 `validator` 에서 검증한다.
#[derive(Args, Debug, Clone, Default)]
pub struct TwapArgs {
    /// buy 또는 sell
    #[arg(short, long, env = "TRADE_SIDE")]
    pub side: String,

    /// 매수는 quote 수량, 매도는 base 수량
    #[arg(short, long, env = "AMOUNT")]
    pub amount: String,

    /// 전체 실행 기간 (예: 20m)
    #[arg(short, long, env = "DURATION")]
    pub duration: String,

    /// 주문 간격 (예: 30s)
    #[arg(short, long, env = "INTERVAL")]
    pub interval: String,

    /// BASE-QUOTE 형식의 거래쌍 (예: AVAX-USDC)
    #[arg(short, long, env = "MARKET")]
    pub market: String,

    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// 거래소 API 주소
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// 거래소 조회는 하지만 주문은 전송하지 않음
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "xtwap", "twap", "-s", "buy", "-a", "100", "-d", "20m", "-i", "30s", "-m", "AVAX-USDC",
            "--api-key", "k", "--api-secret", "s", "--dry-run",
        ])
        .unwrap();

        let Commands::Twap(args) = cli.command;
        assert_eq!(args.side, "buy");
        assert_eq!(args.amount, "100");
        assert_eq!(args.duration, "20m");
        assert_eq!(args.interval, "30s");
        assert_eq!(args.market, "AVAX-USDC");
        assert_eq!(args.api_key.as_deref(), Some("k"));
        assert!(args.dry_run);
    }

    #[test]
    fn test_help_needs_no_configuration() {
        // 설정 로드 전에 파싱되므로 help 는 clap 이 바로 처리한다
        let err = Cli::try_parse_from(["xtwap", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["xtwap", "twap", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["xtwap", "vwap"]).is_err());
    }
}
