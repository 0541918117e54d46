//! Advisory oracle boundary.
//!
//! The reasoning layer (multi-agent debate, LLM, anything else) sits behind
//! the `Advisor` trait and must return a typed `Advice` — parsing and
//! validation of whatever it does internally stay on its side of the
//! boundary. The debate itself is a fixed-arity fan-out: three concurrent
//! calls with different stances, joined by a deterministic judge.

use async_trait::async_trait;
use portfolio::{Advice, AdviceContext, PositionAction, Result, RiskLevel, Stance};

use crate::models::PositionRiskAssessment;

pub mod heuristic;

pub use heuristic::HeuristicAdvisor;

#[async_trait]
pub trait Advisor: Send + Sync {
    async fn advise(&self, ctx: &AdviceContext, stance: Stance) -> Result<Advice>;
}

/// One debater's contribution.
#[derive(Debug, Clone)]
pub struct DebateArgument {
    pub stance: Stance,
    pub advice: Advice,
}

/// Joined outcome of a three-way debate.
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    pub symbol: String,
    pub final_action: PositionAction,
    pub final_reasoning: String,
    /// 0-100, higher = riskier to keep holding.
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub arguments: Vec<DebateArgument>,
}

impl From<&PositionRiskAssessment> for AdviceContext {
    fn from(a: &PositionRiskAssessment) -> Self {
        AdviceContext {
            symbol: a.symbol.clone(),
            quantity: a.quantity,
            entry_price: a.entry_price,
            current_price: a.current_price,
            market_value: a.market_value,
            unrealized_pnl: a.unrealized_pnl,
            unrealized_pnl_pct: a.unrealized_pnl_pct,
            concentration_pct: a.concentration,
            days_held: a.days_held,
        }
    }
}

/// Run the three stances concurrently and join them with the judge.
pub async fn debate(advisor: &dyn Advisor, ctx: &AdviceContext) -> Result<DebateOutcome> {
    let (aggressive, conservative, neutral) = tokio::join!(
        advisor.advise(ctx, Stance::Aggressive),
        advisor.advise(ctx, Stance::Conservative),
        advisor.advise(ctx, Stance::Neutral),
    );

    let arguments = vec![
        DebateArgument {
            stance: Stance::Aggressive,
            advice: aggressive?,
        },
        DebateArgument {
            stance: Stance::Conservative,
            advice: conservative?,
        },
        DebateArgument {
            stance: Stance::Neutral,
            advice: neutral?,
        },
    ];

    Ok(judge_debate(ctx, arguments))
}

/// Rank used to break ties toward capital preservation.
fn safety_rank(action: PositionAction) -> u8 {
    match action {
        PositionAction::Exit => 0,
        PositionAction::Reduce => 1,
        PositionAction::Reallocate => 2,
        PositionAction::Hold => 3,
        PositionAction::Add => 4,
    }
}

/// Risk implied by a recommendation, used to aggregate a 0-100 score.
fn implied_risk(action: PositionAction) -> f64 {
    match action {
        PositionAction::Exit => 85.0,
        PositionAction::Reduce => 65.0,
        PositionAction::Reallocate => 55.0,
        PositionAction::Hold => 35.0,
        PositionAction::Add => 20.0,
    }
}

fn risk_score_to_level(score: f64) -> RiskLevel {
    if score >= 75.0 {
        RiskLevel::Critical
    } else if score >= 50.0 {
        RiskLevel::High
    } else if score >= 25.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Deterministic judge: majority action wins; otherwise the highest-
/// confidence argument wins, with remaining ties broken toward the safer
/// action. The final reasoning comes from the strongest argument backing
/// the chosen action.
pub fn judge_debate(ctx: &AdviceContext, arguments: Vec<DebateArgument>) -> DebateOutcome {
    debug_assert!(!arguments.is_empty());

    let mut candidates: Vec<(PositionAction, f64)> = Vec::new();
    for arg in &arguments {
        match candidates
            .iter_mut()
            .find(|(action, _)| *action == arg.advice.action)
        {
            Some((_, votes)) => *votes += 1.0,
            None => candidates.push((arg.advice.action, 1.0)),
        }
    }

    let majority = candidates
        .iter()
        .filter(|(_, votes)| *votes >= 2.0)
        .map(|(action, _)| *action)
        .next();

    let final_action = majority.unwrap_or_else(|| {
        let mut best = arguments[0].advice.action;
        let mut best_key = (f64::MIN, u8::MAX);
        for arg in &arguments {
            let key = (arg.advice.confidence, safety_rank(arg.advice.action));
            // Higher confidence wins; equal confidence prefers safety.
            if key.0 > best_key.0 || (key.0 == best_key.0 && key.1 < best_key.1) {
                best = arg.advice.action;
                best_key = key;
            }
        }
        best
    });

    let total_confidence: f64 = arguments.iter().map(|a| a.advice.confidence).sum();
    let risk_score = if total_confidence > 0.0 {
        arguments
            .iter()
            .map(|a| implied_risk(a.advice.action) * a.advice.confidence)
            .sum::<f64>()
            / total_confidence
    } else {
        50.0
    };

    let final_reasoning = arguments
        .iter()
        .filter(|a| a.advice.action == final_action)
        .max_by(|a, b| {
            a.advice
                .confidence
                .partial_cmp(&b.advice.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|a| a.advice.reasoning.clone())
        .unwrap_or_else(|| format!("No argument backed {:?}", final_action));

    DebateOutcome {
        symbol: ctx.symbol.clone(),
        final_action,
        final_reasoning,
        risk_score,
        risk_level: risk_score_to_level(risk_score),
        arguments,
    }
}
