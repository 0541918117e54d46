use super::{GuardContext, GuardDecision, PendingTrade, ThrottlePolicy};

/// Enforces the account-wide daily trade cap. Silent double-spending of the
/// daily quota is a correctness bug, so the count is read under the same
/// lock that guards its mutation.
pub struct DailyTradeCapPolicy;

impl ThrottlePolicy for DailyTradeCapPolicy {
    fn name(&self) -> &str {
        "DailyTradeCap"
    }

    fn check(&self, _trade: &PendingTrade, ctx: &GuardContext) -> GuardDecision {
        if ctx.throttle.trades_today() >= ctx.config.max_daily_trades() {
            return GuardDecision::Rejected(format!(
                "daily trade limit reached ({})",
                ctx.config.max_daily_trades()
            ));
        }
        GuardDecision::Approved
    }
}
