use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Condition detected by the portfolio monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    StopLossHit,
    TakeProfit,
    Concentration,
    RiskThreshold,
    IdleCapital,
}

/// Severity tier gating whether automatic action is taken.
/// Ordered: LOW < MEDIUM < HIGH < IMMEDIATE.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Immediate,
}

/// Numeric figures that triggered an alert. Which fields are set depends on
/// the alert type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertData {
    pub pnl_pct: Option<f64>,
    pub current_price: Option<f64>,
    pub concentration_pct: Option<f64>,
    pub idle_pct: Option<f64>,
}

/// A single monitor alert. Produced by the external monitor, consumed exactly
/// once per occurrence by the rebalancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub urgency: Urgency,
    pub symbol: Option<String>,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: AlertData,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        urgency: Urgency,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            alert_type,
            urgency,
            symbol: None,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            data: AlertData::default(),
        }
    }

    pub fn for_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_data(mut self, data: AlertData) -> Self {
        self.data = data;
        self
    }
}
