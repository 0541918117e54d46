use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::alert::Alert;
use super::position::Position;
use super::risk::RiskLevel;

/// Point-in-time view of a monitored portfolio as published by the monitor.
/// This is the monitor's output contract; its internal polling mechanics are
/// the monitor's own business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub account_id: AccountId,
    pub timestamp: DateTime<Utc>,
    pub total_value: f64,
    pub cash_available: f64,
    pub invested_value: f64,
    pub position_count: usize,
    pub risk_level: RiskLevel,
    pub positions: Vec<Position>,
    /// Alerts outstanding at snapshot time. A manual rebalance replays these
    /// through the same handling path as live delivery.
    pub alerts: Vec<Alert>,
}
