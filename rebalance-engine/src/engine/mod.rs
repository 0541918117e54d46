use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use portfolio::{
    AccountId, Alert, AlertType, PositionStore, TradeAction, TradeOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::events::{EventBus, RebalanceEvent};
use crate::guard::{GuardContext, GuardDecision, PendingTrade, ThrottleGuard, ThrottleState};
use crate::models::{DailyStats, RebalanceConfig, RebalanceResult, TradeExecution};
use crate::monitor::AlertSource;

/// A candidate trade produced by the per-alert-type planners, before
/// throttling and sizing.
struct PlannedTrade {
    symbol: String,
    action: TradeAction,
    /// Percentage of the held quantity to sell (ignored for SELL_ALL).
    reduce_pct: f64,
    reason: String,
    price: f64,
}

/// Alert-driven trade executor for one account.
///
/// Handling of a single alert is a short, non-reentrant critical section:
/// callers serialize access (the system wraps this in a mutex) so the daily
/// counter and cooldown map see a consistent read-modify-write.
pub struct Rebalancer {
    account_id: AccountId,
    config: RebalanceConfig,
    store: Arc<dyn PositionStore>,
    guard: ThrottleGuard,
    throttle: ThrottleState,
    history: Vec<TradeExecution>,
    events: EventBus,
    running: bool,
}

impl Rebalancer {
    pub fn new(
        account_id: AccountId,
        config: RebalanceConfig,
        store: Arc<dyn PositionStore>,
        events: EventBus,
    ) -> Self {
        Self {
            account_id,
            config,
            store,
            guard: ThrottleGuard::with_default_policies(),
            throttle: ThrottleState::new(Utc::now()),
            history: Vec::new(),
            events,
            running: false,
        }
    }

    pub fn config(&self) -> &RebalanceConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            info!(
                "Auto-rebalancer started for account {} (mode: {})",
                self.account_id,
                if self.config.dry_run() {
                    "DRY RUN"
                } else {
                    "LIVE TRADING"
                }
            );
        }
    }

    /// Idempotent. In-flight handling finishes (callers hold the lock while
    /// handling); only new alerts are rejected afterward.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            info!("Auto-rebalancer stopped for account {}", self.account_id);
        }
    }

    /// Process one alert end to end. Always returns normally: every failure
    /// mode is either skipped with a log line or captured in the returned
    /// execution record.
    pub fn handle_alert(&mut self, alert: &Alert) -> Option<TradeExecution> {
        self.handle_alert_at(alert, Utc::now())
    }

    /// Time-injected variant backing `handle_alert`; also the seam tests use
    /// to drive cooldowns and date rollovers deterministically.
    pub fn handle_alert_at(&mut self, alert: &Alert, now: DateTime<Utc>) -> Option<TradeExecution> {
        if !self.running || !self.config.enabled() {
            debug!("rebalancer inactive, ignoring alert: {}", alert.title);
            return None;
        }

        if !self.config.act_on(alert.urgency) {
            debug!(
                "Skipping alert (urgency {:?}): {}",
                alert.urgency, alert.title
            );
            return None;
        }

        let plan = self.plan(alert)?;
        self.execute_at(plan, Some(alert.alert_type), now)
    }

    /// Dispatch by alert type to a candidate trade. IDLE_CAPITAL is advisory
    /// only and never trades.
    fn plan(&self, alert: &Alert) -> Option<PlannedTrade> {
        let symbol = alert.symbol.clone();
        let pnl_pct = alert.data.pnl_pct.unwrap_or(0.0);
        let price = alert.data.current_price.unwrap_or(0.0);

        match alert.alert_type {
            AlertType::StopLossHit => {
                let symbol = symbol?;
                if pnl_pct < self.config.auto_exit_loss_pct() {
                    Some(PlannedTrade {
                        symbol,
                        action: TradeAction::SellAll,
                        reduce_pct: 100.0,
                        reason: format!("Stop-loss triggered at {:.1}% loss", pnl_pct),
                        price,
                    })
                } else {
                    Some(PlannedTrade {
                        symbol,
                        action: TradeAction::Sell,
                        reduce_pct: 50.0,
                        reason: format!("Reducing exposure due to {:.1}% loss", pnl_pct),
                        price,
                    })
                }
            }
            AlertType::TakeProfit => {
                let symbol = symbol?;
                if pnl_pct > self.config.auto_reduce_gain_pct() {
                    let reduce_pct = 50.0_f64.min(self.config.max_single_trade_pct());
                    Some(PlannedTrade {
                        symbol,
                        action: TradeAction::Sell,
                        reduce_pct,
                        reason: format!("Taking profits at {:.1}% gain", pnl_pct),
                        price,
                    })
                } else {
                    None
                }
            }
            AlertType::Concentration => {
                let symbol = symbol?;
                let concentration = alert.data.concentration_pct.unwrap_or(0.0);
                if concentration > self.config.auto_reduce_concentration_pct() {
                    let target = self.config.target_position_pct();
                    // May leave the position above target when the
                    // single-trade cap binds first; that is the intended
                    // limit interaction.
                    let reduce_pct = ((concentration - target) / concentration * 100.0)
                        .min(self.config.max_single_trade_pct());
                    Some(PlannedTrade {
                        symbol,
                        action: TradeAction::Sell,
                        reduce_pct,
                        reason: format!(
                            "Reducing concentration from {:.1}% toward {:.1}%",
                            concentration, target
                        ),
                        price,
                    })
                } else {
                    None
                }
            }
            AlertType::RiskThreshold => {
                let symbol = symbol?;
                Some(PlannedTrade {
                    symbol,
                    action: TradeAction::SellAll,
                    reduce_pct: 100.0,
                    reason: "Critical risk threshold exceeded".into(),
                    price,
                })
            }
            AlertType::IdleCapital => {
                let idle_pct = alert.data.idle_pct.unwrap_or(0.0);
                info!(
                    "Idle capital detected: {:.1}% - consider deploying",
                    idle_pct
                );
                None
            }
        }
    }

    fn execute_at(
        &mut self,
        plan: PlannedTrade,
        alert_type: Option<AlertType>,
        now: DateTime<Utc>,
    ) -> Option<TradeExecution> {
        self.throttle.roll_over(now);

        let pending = PendingTrade {
            symbol: &plan.symbol,
            action: plan.action,
        };
        let ctx = GuardContext {
            config: &self.config,
            throttle: &self.throttle,
            now,
        };
        if let GuardDecision::Rejected(reason) = self.guard.check(&pending, &ctx) {
            warn!("Cannot trade {}: {}", plan.symbol, reason);
            return None;
        }

        let positions = match self.store.positions(&self.account_id) {
            Ok(positions) => positions,
            Err(e) => {
                warn!("Position lookup failed for {}: {}", self.account_id, e);
                return None;
            }
        };
        let position = positions
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(&plan.symbol));

        let Some(position) = position else {
            warn!("No position found for {}", plan.symbol);
            return None;
        };

        let quantity = match plan.action {
            TradeAction::SellAll => position.quantity,
            TradeAction::Sell => {
                let requested = position.quantity * plan.reduce_pct / 100.0;
                let cap = position.quantity * self.config.max_single_trade_pct() / 100.0;
                requested.min(cap)
            }
            TradeAction::Buy | TradeAction::NoAction => {
                debug!("planner produced non-sell action for {}", plan.symbol);
                return None;
            }
        };

        let trade_value = if plan.price > 0.0 {
            quantity * plan.price
        } else {
            0.0
        };
        if trade_value < self.config.min_trade_value() && plan.action != TradeAction::SellAll {
            info!(
                "Trade too small for {}: ${:.2} (min ${:.2})",
                plan.symbol,
                trade_value,
                self.config.min_trade_value()
            );
            return None;
        }

        let mut execution = TradeExecution {
            id: Uuid::new_v4(),
            timestamp: now,
            symbol: position.symbol.clone(),
            action: plan.action,
            quantity,
            price: plan.price,
            total_value: trade_value,
            reason: plan.reason,
            alert_type,
            success: true,
            error: None,
        };

        if self.config.dry_run() {
            info!(
                "[DRY RUN] Would {} {:.2} {} @ ${:.2} = ${:.2} ({})",
                execution.action,
                quantity,
                execution.symbol,
                plan.price,
                trade_value,
                execution.reason
            );
        } else {
            let order = TradeOrder::new(&execution.symbol, plan.action, quantity, plan.price);
            match self.store.apply_trade(&self.account_id, &order) {
                Ok(()) => {
                    info!(
                        "EXECUTED: {} {:.2} {} @ ${:.2} = ${:.2}",
                        execution.action, quantity, execution.symbol, plan.price, trade_value
                    );
                }
                Err(e) => {
                    // Failures are recorded, not hidden: the record stays in
                    // history with the error captured.
                    execution.success = false;
                    execution.error = Some(e.to_string());
                    error!("Trade failed for {}: {}", execution.symbol, e);
                }
            }
        }

        self.throttle.record_trade(&execution.symbol, now);
        self.history.push(execution.clone());
        self.events
            .publish(RebalanceEvent::TradeExecuted(execution.clone()));

        Some(execution)
    }

    /// Re-evaluate every alert in the source's current snapshot through the
    /// same handling path as live delivery, in a batch.
    pub fn manual_rebalance(&mut self, source: &dyn AlertSource) -> RebalanceResult {
        let before = source.current_snapshot();
        let alerts: Vec<Alert> = before
            .as_ref()
            .map(|s| s.alerts.clone())
            .unwrap_or_default();

        let mut executed = Vec::new();
        for alert in &alerts {
            if let Some(trade) = self.handle_alert(alert) {
                executed.push(trade);
            }
        }

        let after = source.current_snapshot();
        RebalanceResult {
            timestamp: Utc::now(),
            trades_executed: executed,
            alerts_processed: alerts.len(),
            portfolio_before: before,
            portfolio_after: after,
            dry_run: self.config.dry_run(),
        }
    }

    pub fn daily_stats(&mut self) -> DailyStats {
        self.daily_stats_at(Utc::now())
    }

    pub fn daily_stats_at(&mut self, now: DateTime<Utc>) -> DailyStats {
        self.throttle.roll_over(now);

        let today = now.date_naive();
        let today_trades: Vec<&TradeExecution> = self
            .history
            .iter()
            .filter(|t| t.timestamp.date_naive() == today)
            .collect();

        DailyStats {
            trades_today: today_trades.len(),
            trades_remaining: self
                .config
                .max_daily_trades()
                .saturating_sub(self.throttle.trades_today()),
            total_volume: today_trades
                .iter()
                .filter(|t| t.success)
                .map(|t| t.total_value)
                .sum(),
            successful: today_trades.iter().filter(|t| t.success).count(),
            failed: today_trades.iter().filter(|t| !t.success).count(),
            dry_run: self.config.dry_run(),
        }
    }

    /// Most recent executions, oldest first.
    pub fn trade_history(&self, limit: usize) -> &[TradeExecution] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }
}
