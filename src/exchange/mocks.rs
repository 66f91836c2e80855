use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::TwapError;
use crate::exchange::traits::Exchange;
use crate::models::market::{MarketInfo, TradingPair};
use crate::models::order::{OrderAck, OrderSide};
use crate::utils::math::format_quantity;

/// When the simulated venue rejects an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Every order fills
    Never,
    /// Every order is rejected
    Always,
    /// The first `n` submissions are rejected, later ones fill
    FailFirst(usize),
    /// Orders fill until `n` have filled, then every submission is rejected
    AfterFills(usize),
}

/// One order submission seen by the simulated venue
#[derive(Debug, Clone)]
pub struct SubmittedOrder {
    pub market: TradingPair,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub at: Instant,
    pub accepted: bool,
}

#[derive(Default)]
struct Journal {
    submissions: Vec<SubmittedOrder>,
    fills: usize,
}

/// An in-memory venue for testing and development
pub struct SimulatedExchange {
    authenticated: bool,
    markets: Vec<MarketInfo>,
    balances: HashMap<String, String>,
    failure_policy: FailurePolicy,
    latency: Duration,
    journal: Mutex<Journal>,
}

impl SimulatedExchange {
    pub fn new() -> Self {
        SimulatedExchange {
            authenticated: true,
            markets: Vec::new(),
            balances: HashMap::new(),
            failure_policy: FailurePolicy::Never,
            latency: Duration::ZERO,
            journal: Mutex::new(Journal::default()),
        }
    }

    /// A venue with a few spot markets and funded balances
    pub fn seeded() -> Self {
        Self::new()
            .with_market("AVAX", "USDC", "0.01", "0.01")
            .with_market("BTC", "USDC", "0.00001", "0.01")
            .with_market("ETH", "USDC", "0.0001", "0.01")
            .with_balance("USDC", "100000")
            .with_balance("AVAX", "1000")
            .with_balance("BTC", "2")
            .with_balance("ETH", "50")
    }

    pub fn with_market(
        mut self,
        base: &str,
        quote: &str,
        base_increment: &str,
        quote_increment: &str,
    ) -> Self {
        self.markets.push(MarketInfo {
            pair: TradingPair::new(base, quote),
            base_increment: base_increment.to_string(),
            quote_increment: quote_increment.to_string(),
        });
        self
    }

    pub fn with_balance(mut self, asset: &str, free: &str) -> Self {
        self.balances.insert(asset.to_string(), free.to_string());
        self
    }

    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Simulated round-trip time of an order submission
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn submissions(&self) -> Vec<SubmittedOrder> {
        self.journal.lock().await.submissions.clone()
    }

    pub async fn order_calls(&self) -> usize {
        self.journal.lock().await.submissions.len()
    }

    fn accepts(&self, attempt_no: usize, fills: usize) -> bool {
        match self.failure_policy {
            FailurePolicy::Never => true,
            FailurePolicy::Always => false,
            FailurePolicy::FailFirst(n) => attempt_no >= n,
            FailurePolicy::AfterFills(n) => fills < n,
        }
    }
}

impl Default for SimulatedExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exchange for SimulatedExchange {
    async fn is_authenticated(&self) -> Result<bool, TwapError> {
        Ok(self.authenticated)
    }

    async fn get_markets(&self) -> Result<Vec<MarketInfo>, TwapError> {
        Ok(self.markets.clone())
    }

    async fn get_balance(&self, asset: &str) -> Result<String, TwapError> {
        // Asset not found, zero balance
        Ok(self.balances.get(asset).cloned().unwrap_or_else(|| "0".to_string()))
    }

    async fn submit_market_order(
        &self,
        market: &TradingPair,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderAck, TwapError> {
        let at = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut journal = self.journal.lock().await;
        let attempt_no = journal.submissions.len();
        let accepted = self.accepts(attempt_no, journal.fills);
        journal.submissions.push(SubmittedOrder {
            market: market.clone(),
            side,
            quantity,
            at,
            accepted,
        });

        if !accepted {
            return Err(TwapError::OrderRejected(format!(
                "simulated rejection of {} {} {}",
                side, quantity, market
            )));
        }

        journal.fills += 1;
        Ok(OrderAck::new(format!("sim-{}", journal.fills), format_quantity(quantity)))
    }
}
