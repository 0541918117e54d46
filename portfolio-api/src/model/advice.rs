use serde::{Deserialize, Serialize};

use super::risk::PositionAction;

/// Stance a risk debater argues from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    /// High risk tolerance, maximize returns.
    Aggressive,
    /// Risk averse, preserve capital.
    Conservative,
    /// Balanced.
    Neutral,
}

/// Position figures handed to an advisor. Already computed — the advisor
/// never re-derives valuation from raw store rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceContext {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
    pub concentration_pct: f64,
    pub days_held: u32,
}

/// Typed decision returned by an advisor. This struct is the whole contract:
/// whatever reasoning process sits behind the `Advisor` trait must produce
/// one of these, and parsing/validation lives behind that boundary alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub action: PositionAction,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub reasoning: String,
    pub key_points: Vec<String>,
}
