use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk classification for a position or a whole portfolio.
/// Ordered: LOW < MODERATE < HIGH < CRITICAL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// Recommended action for a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionAction {
    Hold,
    /// Partial exit.
    Reduce,
    /// Full exit.
    Exit,
    /// Increase position.
    Add,
    /// Move capital to a better opportunity.
    Reallocate,
}

impl PositionAction {
    /// Sort key for suggestion ordering: most urgent first.
    pub fn priority(&self) -> u8 {
        match self {
            PositionAction::Exit => 1,
            PositionAction::Reduce => 2,
            PositionAction::Reallocate => 3,
            PositionAction::Add => 4,
            PositionAction::Hold => 5,
        }
    }
}

impl fmt::Display for PositionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PositionAction::Hold => "hold",
            PositionAction::Reduce => "reduce",
            PositionAction::Exit => "exit",
            PositionAction::Add => "add",
            PositionAction::Reallocate => "reallocate",
        };
        write!(f, "{}", s)
    }
}

/// Concrete action taken against the position store by the rebalancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Buy,
    Sell,
    SellAll,
    NoAction,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::SellAll => "sell_all",
            TradeAction::NoAction => "no_action",
        };
        write!(f, "{}", s)
    }
}
