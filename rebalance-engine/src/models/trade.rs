use chrono::{DateTime, Utc};
use portfolio::{AlertType, PortfolioSnapshot, TradeAction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of one execution attempt, real or simulated. Created once, never
/// mutated afterward, retained in the rebalancer's in-memory history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExecution {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub total_value: f64,
    pub reason: String,
    pub alert_type: Option<AlertType>,
    pub success: bool,
    pub error: Option<String>,
}

/// Result of one rebalancing cycle (manual or replayed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceResult {
    pub timestamp: DateTime<Utc>,
    pub trades_executed: Vec<TradeExecution>,
    pub alerts_processed: usize,
    pub portfolio_before: Option<PortfolioSnapshot>,
    pub portfolio_after: Option<PortfolioSnapshot>,
    pub dry_run: bool,
}

impl RebalanceResult {
    pub fn summary(&self) -> String {
        let executed: Vec<_> = self.trades_executed.iter().filter(|t| t.success).collect();
        let total_value: f64 = executed.iter().map(|t| t.total_value).sum();
        format!(
            "Rebalance {}at {}: {} trades, ${:.2} total",
            if self.dry_run { "(DRY RUN) " } else { "" },
            self.timestamp.format("%H:%M:%S"),
            executed.len(),
            total_value
        )
    }
}

/// Daily trading statistics exposed through the read-only accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStats {
    pub trades_today: usize,
    pub trades_remaining: u32,
    pub total_volume: f64,
    pub successful: usize,
    pub failed: usize,
    pub dry_run: bool,
}
