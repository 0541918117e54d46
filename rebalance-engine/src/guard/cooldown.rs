use chrono::Duration;

use super::{GuardContext, GuardDecision, PendingTrade, ThrottlePolicy};

/// Enforces the per-symbol cooldown between automated trades. The cooldown is
/// blanket: it blocks trades in either direction on the symbol.
pub struct SymbolCooldownPolicy;

impl ThrottlePolicy for SymbolCooldownPolicy {
    fn name(&self) -> &str {
        "SymbolCooldown"
    }

    fn check(&self, trade: &PendingTrade, ctx: &GuardContext) -> GuardDecision {
        if let Some(last) = ctx.throttle.last_trade_for(trade.symbol) {
            let cooldown = Duration::minutes(ctx.config.cooldown_minutes());
            let elapsed = ctx.now - last;
            if elapsed < cooldown {
                let left = cooldown - elapsed;
                return GuardDecision::Rejected(format!(
                    "cooldown active ({} min left)",
                    left.num_minutes().max(1)
                ));
            }
        }
        GuardDecision::Approved
    }
}
