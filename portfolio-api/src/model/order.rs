use serde::{Deserialize, Serialize};

use super::risk::TradeAction;

/// An instruction handed to the position store's write path. Applied
/// atomically as a single persistence transaction, and only when the
/// rebalancer runs live (dry-run never reaches the store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
}

impl TradeOrder {
    pub fn new(symbol: impl Into<String>, action: TradeAction, quantity: f64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            quantity,
            price,
        }
    }

    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }
}
