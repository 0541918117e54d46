use portfolio::{AccountId, PositionAction, RiskLevel};
use serde::{Deserialize, Serialize};

/// Risk assessment for a single position. Constructed fresh on every
/// assessment cycle and never mutated; the next cycle supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRiskAssessment {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
    pub days_held: u32,

    pub risk_level: RiskLevel,
    /// Market value as % of total portfolio value.
    pub concentration: f64,

    pub recommended_action: PositionAction,
    pub action_reason: String,
    /// Suggested % of portfolio for this position.
    pub target_allocation: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    /// Confidence in [0, 1].
    pub confidence_score: f64,
}

/// One entry of the prioritized action list for a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    /// 1 is most urgent.
    pub priority: usize,
    /// None for portfolio-level suggestions (e.g. deploying cash).
    pub symbol: Option<String>,
    pub action: SuggestionKind,
    pub reason: String,
    pub current_value: f64,
    pub pnl_pct: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Hold,
    Reduce,
    Exit,
    Add,
    Reallocate,
    DeployCash,
}

impl From<PositionAction> for SuggestionKind {
    fn from(action: PositionAction) -> Self {
        match action {
            PositionAction::Hold => SuggestionKind::Hold,
            PositionAction::Reduce => SuggestionKind::Reduce,
            PositionAction::Exit => SuggestionKind::Exit,
            PositionAction::Add => SuggestionKind::Add,
            PositionAction::Reallocate => SuggestionKind::Reallocate,
        }
    }
}

/// Portfolio-level risk assessment, one per account per evaluation cycle.
/// Invariant: total_value = cash_available + invested_value, both computed
/// from the same snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRiskAssessment {
    pub account_id: AccountId,
    pub total_value: f64,
    pub cash_available: f64,
    pub invested_value: f64,
    pub total_unrealized_pnl: f64,

    pub overall_risk_level: RiskLevel,
    /// 0-100; higher is more diversified.
    pub diversification_score: f64,
    pub concentration_warning: bool,
    pub max_position_concentration: f64,

    pub positions: Vec<PositionRiskAssessment>,

    /// True iff at least one position's recommended action is not HOLD.
    pub rebalance_needed: bool,
    /// Sum of unrealized losses across losing positions.
    pub capital_at_risk: f64,
    pub suggested_actions: Vec<SuggestedAction>,
}

/// A new-opportunity candidate supplied by the caller of the reallocation
/// query. The core does not rank opportunities itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub symbol: String,
    pub reason: Option<String>,
    pub expected_return: Option<String>,
    pub risk_level: Option<String>,
}

/// Capital reallocation suggestion pairing freed capital against
/// opportunities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReallocationSuggestion {
    pub from_symbol: Option<String>,
    pub to_symbol: Option<String>,
    pub amount: f64,
    pub reason: String,
    /// 1-5, 1 being highest.
    pub priority: usize,
    pub expected_benefit: String,
    pub risk_impact: String,
}
