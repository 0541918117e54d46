use serde::{Deserialize, Serialize};

/// A held quantity of a tradable symbol, as read from the position store.
/// External and read-only to the risk core: assessments derive from it but
/// never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    /// Last known market price. When the feed has no quote yet this is None
    /// and valuation falls back to the entry price.
    pub current_price: Option<f64>,
    #[serde(default)]
    pub days_held: u32,
}

impl Position {
    pub fn new(symbol: impl Into<String>, quantity: f64, entry_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            entry_price,
            current_price: None,
            days_held: 0,
        }
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_days_held(mut self, days: u32) -> Self {
        self.days_held = days;
        self
    }

    /// Effective price used for valuation (entry price when no quote exists).
    pub fn price(&self) -> f64 {
        self.current_price.unwrap_or(self.entry_price)
    }

    pub fn market_value(&self) -> f64 {
        self.quantity * self.price()
    }

    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.entry_price
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }

    /// Unrealized P&L as a percentage of cost basis. Defined as 0 for a zero
    /// cost basis, never NaN.
    pub fn unrealized_pnl_pct(&self) -> f64 {
        let basis = self.cost_basis();
        if basis > 0.0 {
            self.unrealized_pnl() / basis * 100.0
        } else {
            0.0
        }
    }
}
