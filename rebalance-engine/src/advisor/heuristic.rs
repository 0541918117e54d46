use async_trait::async_trait;
use portfolio::{Advice, AdviceContext, PositionAction, Result, Stance};

use super::Advisor;
use crate::models::RiskThresholds;

/// Deterministic stance-parameterized advisor. Each stance evaluates the
/// same position figures against skewed bands: the aggressive debater
/// tolerates deeper losses and rides gains longer, the conservative one
/// cuts both earlier.
pub struct HeuristicAdvisor {
    thresholds: RiskThresholds,
}

impl HeuristicAdvisor {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// (stop-loss multiplier, take-profit multiplier) per stance.
    fn bands(stance: Stance) -> (f64, f64) {
        match stance {
            Stance::Aggressive => (1.5, 1.5),
            Stance::Conservative => (0.6, 0.75),
            Stance::Neutral => (1.0, 1.0),
        }
    }
}

#[async_trait]
impl Advisor for HeuristicAdvisor {
    async fn advise(&self, ctx: &AdviceContext, stance: Stance) -> Result<Advice> {
        let (sl_mult, tp_mult) = Self::bands(stance);
        let stop_loss = self.thresholds.stop_loss_pct() * sl_mult;
        let take_profit = self.thresholds.take_profit_pct() * tp_mult;
        let max_concentration = self.thresholds.max_concentration_pct();

        let pnl = ctx.unrealized_pnl_pct;

        let (action, reasoning, confidence) = if pnl < stop_loss {
            (
                PositionAction::Exit,
                format!(
                    "{:.1}% loss breaches the {:.0}% stop band; cut the position",
                    pnl, stop_loss
                ),
                // Confidence grows with the breach, capped.
                (0.6 + (stop_loss - pnl).abs() / 100.0).min(0.95),
            )
        } else if pnl > take_profit {
            (
                PositionAction::Reduce,
                format!(
                    "{:.1}% gain is past the {:.0}% profit band; bank part of it",
                    pnl, take_profit
                ),
                (0.55 + (pnl - take_profit) / 100.0).min(0.9),
            )
        } else if ctx.concentration_pct > max_concentration {
            (
                PositionAction::Reduce,
                format!(
                    "{:.1}% of the book in one name is above the {:.0}% limit",
                    ctx.concentration_pct, max_concentration
                ),
                0.65,
            )
        } else if stance == Stance::Aggressive && pnl < 0.0 && pnl > stop_loss / 2.0 {
            (
                PositionAction::Add,
                format!("{:.1}% dip within tolerance; average in while it lasts", pnl),
                0.5,
            )
        } else {
            (
                PositionAction::Hold,
                "Position figures sit inside every band".to_string(),
                0.6,
            )
        };

        Ok(Advice {
            action,
            confidence,
            reasoning,
            key_points: vec![
                format!("pnl {:.1}%", pnl),
                format!("concentration {:.1}%", ctx.concentration_pct),
                format!("held {} days", ctx.days_held),
            ],
        })
    }
}
