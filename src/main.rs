/**
* filename : main
* author : HAMA
* date: 2025. 5. 8.
* description: TWAP 실행기 진입점
**/

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use xtwap::cli::{Cli, Commands, TwapArgs};
use xtwap::config::Config;
use xtwap::core::TwapScheduler;
use xtwap::exchange;
use xtwap::utils::logging;
use xtwap::validator::validate_twap_args;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let dotenv = dotenvy::dotenv();

    // --help 와 인수 오류는 설정 파일 상태와 무관하게 처리
    let cli = Cli::parse();

    // 설정 로드 후 로깅 초기화
    let mut config = Config::load().context("failed to load configuration")?;
    logging::init(&config.logging).context("failed to initialise logging")?;
    match dotenv {
        Ok(path) => log::info!(".env 로드: {}", path.display()),
        Err(e) => log::debug!(".env 파일 없음: {}", e),
    }

    match cli.command {
        Commands::Twap(args) => run_twap(args, &mut config).await,
    }
}

async fn run_twap(mut args: TwapArgs, config: &mut Config) -> Result<(), anyhow::Error> {
    // 명령줄 인수가 설정 파일보다 우선
    args.api_key = args.api_key.or_else(|| config.exchange.api_key.clone());
    args.api_secret = args.api_secret.or_else(|| config.exchange.api_secret.clone());
    args.base_url = args.base_url.or_else(|| Some(config.exchange.base_url.clone()));

    let request = match validate_twap_args(&args, &config.execution) {
        Ok(request) => request,
        Err(e) => {
            logging::log_error("invalid arguments", &e);
            return Err(e.into());
        }
    };

    config.exchange.api_key = args.api_key.clone();
    config.exchange.api_secret = args.api_secret.clone();
    if let Some(url) = &args.base_url {
        config.exchange.base_url = url.clone();
    }

    let exchange = exchange::connect(&config.exchange, args.dry_run)?;
    let scheduler = TwapScheduler::new(exchange, config.execution.clone());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, cancelling remaining orders");
            on_signal.cancel();
        }
    });

    match scheduler.execute(&request, cancel).await {
        Ok(summary) => {
            log::info!(
                "finished: {}/{} iterations filled",
                summary.successful_count, summary.slice_count
            );
            Ok(())
        }
        Err(e) => {
            logging::log_error("twap execution", &e);
            Err(e.into())
        }
    }
}
