use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use portfolio::TradeAction;
use std::collections::HashMap;

use crate::models::RebalanceConfig;

pub mod cooldown;
pub mod daily_cap;

pub use cooldown::SymbolCooldownPolicy;
pub use daily_cap::DailyTradeCapPolicy;

#[derive(Debug, PartialEq)]
pub enum GuardDecision {
    Approved,
    Rejected(String),
}

/// A trade the rebalancer intends to make, checked before sizing.
pub struct PendingTrade<'a> {
    pub symbol: &'a str,
    pub action: TradeAction,
}

/// Context passed to policies to make decisions. The throttle state is
/// read-only here; only the rebalancer's execution path mutates it.
pub struct GuardContext<'a> {
    pub config: &'a RebalanceConfig,
    pub throttle: &'a ThrottleState,
    pub now: DateTime<Utc>,
}

pub trait ThrottlePolicy: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, trade: &PendingTrade, ctx: &GuardContext) -> GuardDecision;
}

/// Chain of throttle policies. First rejection wins and terminates handling
/// of the alert; there is no queueing or retry.
pub struct ThrottleGuard {
    policies: Vec<Box<dyn ThrottlePolicy>>,
}

impl Default for ThrottleGuard {
    fn default() -> Self {
        Self::with_default_policies()
    }
}

impl ThrottleGuard {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    pub fn with_default_policies() -> Self {
        let mut guard = Self::new();
        guard.add_policy(Box::new(DailyTradeCapPolicy));
        guard.add_policy(Box::new(SymbolCooldownPolicy));
        guard
    }

    pub fn add_policy(&mut self, policy: Box<dyn ThrottlePolicy>) {
        self.policies.push(policy);
    }

    pub fn check(&self, trade: &PendingTrade, ctx: &GuardContext) -> GuardDecision {
        for policy in &self.policies {
            match policy.check(trade, ctx) {
                GuardDecision::Rejected(reason) => {
                    warn!(
                        "Trade for {} rejected by policy {}: {}",
                        trade.symbol,
                        policy.name(),
                        reason
                    );
                    return GuardDecision::Rejected(format!("{}: {}", policy.name(), reason));
                }
                GuardDecision::Approved => continue,
            }
        }
        GuardDecision::Approved
    }
}

/// Per-account throttle bookkeeping: today's trade count and per-symbol last
/// trade times. Owned exclusively by that account's rebalancer; daily counts
/// reset lazily when the wall-clock date advances.
#[derive(Debug, Clone)]
pub struct ThrottleState {
    trades_today: u32,
    last_trade: HashMap<String, DateTime<Utc>>,
    last_reset: NaiveDate,
}

impl ThrottleState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            trades_today: 0,
            last_trade: HashMap::new(),
            last_reset: now.date_naive(),
        }
    }

    /// Reset the daily counter if the date advanced past the stored reset
    /// date. Called at the start of every throttle check and stats query.
    pub fn roll_over(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today > self.last_reset {
            self.trades_today = 0;
            self.last_reset = today;
        }
    }

    pub fn record_trade(&mut self, symbol: &str, now: DateTime<Utc>) {
        self.trades_today += 1;
        self.last_trade.insert(symbol.to_ascii_uppercase(), now);
    }

    pub fn trades_today(&self) -> u32 {
        self.trades_today
    }

    pub fn last_trade_for(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_trade.get(&symbol.to_ascii_uppercase()).copied()
    }
}
