use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::TwapError;
use crate::models::market::{MarketInfo, TradingPair};
use crate::models::order::{OrderAck, OrderSide};

/// The `Exchange` trait defines the interface the TWAP engine needs from a venue.
/// It is implemented by the Enclave REST connector, the dry-run wrapper and the
/// in-memory simulated venue.
///
/// Methods take `&self` so one client can be shared by every order worker;
/// credentials are fixed when the connector is constructed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Check that the configured credentials are accepted by the venue
    async fn is_authenticated(&self) -> Result<bool, TwapError>;

    /// List spot markets with their base/quote step sizes as returned by the venue
    async fn get_markets(&self) -> Result<Vec<MarketInfo>, TwapError>;

    /// Free balance of an asset, as the venue's decimal string
    async fn get_balance(&self, asset: &str) -> Result<String, TwapError>;

    /// Place a market order. A venue-side rejection is returned as an error.
    async fn submit_market_order(
        &self,
        market: &TradingPair,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderAck, TwapError>;
}
