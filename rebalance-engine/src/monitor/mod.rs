//! Alert-source contract and a simulated monitor.
//!
//! The real monitor is an external collaborator; only its output contract
//! (snapshots and typed alerts) is modeled here. `SimulatedMonitor` backs
//! tests and the demo binary the way a paper feed would.

use chrono::Utc;
use log::warn;
use portfolio::{
    Alert, AlertData, AlertType, PortfolioSnapshot, PositionAction, RiskLevel, Urgency,
};
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::models::{PortfolioRiskAssessment, RebalanceConfig};

/// Read side of the monitor: the latest published snapshot.
pub trait AlertSource: Send + Sync {
    fn current_snapshot(&self) -> Option<PortfolioSnapshot>;
}

/// In-memory alert source. Holds the latest snapshot and pushes alerts into
/// a bounded channel drained by the rebalancing system.
pub struct SimulatedMonitor {
    snapshot: Mutex<Option<PortfolioSnapshot>>,
    tx: mpsc::Sender<Alert>,
}

impl SimulatedMonitor {
    /// Returns the monitor plus the receiver end handed to the system.
    pub fn new() -> (Self, mpsc::Receiver<Alert>) {
        let (tx, rx) = mpsc::channel(256);
        (
            Self {
                snapshot: Mutex::new(None),
                tx,
            },
            rx,
        )
    }

    pub fn set_snapshot(&self, snapshot: PortfolioSnapshot) {
        *self.snapshot.lock().unwrap() = Some(snapshot);
    }

    /// Deliver an alert to the subscribed system. Best-effort: a full queue
    /// drops the alert with a warning rather than blocking the monitor.
    pub fn raise_alert(&self, alert: Alert) {
        if let Err(e) = self.tx.try_send(alert) {
            warn!("alert queue full, dropping alert: {}", e);
        }
    }
}

impl AlertSource for SimulatedMonitor {
    fn current_snapshot(&self) -> Option<PortfolioSnapshot> {
        self.snapshot.lock().unwrap().clone()
    }
}

/// Build a snapshot from a finished assessment, carrying the alerts that the
/// same cycle produced.
pub fn snapshot_from_assessment(
    assessment: &PortfolioRiskAssessment,
    alerts: Vec<Alert>,
) -> PortfolioSnapshot {
    PortfolioSnapshot {
        account_id: assessment.account_id.clone(),
        timestamp: Utc::now(),
        total_value: assessment.total_value,
        cash_available: assessment.cash_available,
        invested_value: assessment.invested_value,
        position_count: assessment.positions.len(),
        risk_level: assessment.overall_risk_level,
        positions: Vec::new(),
        alerts,
    }
}

/// Derive threshold alerts from an assessment. This is the simulated
/// monitor's condition detection; a production monitor publishes the same
/// shapes from its own polling loop.
pub fn derive_alerts(
    assessment: &PortfolioRiskAssessment,
    config: &RebalanceConfig,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for pos in &assessment.positions {
        let data = AlertData {
            pnl_pct: Some(pos.unrealized_pnl_pct),
            current_price: Some(pos.current_price),
            concentration_pct: Some(pos.concentration),
            idle_pct: None,
        };

        if pos.risk_level == RiskLevel::Critical {
            alerts.push(
                Alert::new(
                    AlertType::RiskThreshold,
                    Urgency::Immediate,
                    format!("Critical risk: {}", pos.symbol),
                    pos.action_reason.clone(),
                )
                .for_symbol(&pos.symbol)
                .with_data(data.clone()),
            );
            continue;
        }

        match pos.recommended_action {
            PositionAction::Exit => {
                alerts.push(
                    Alert::new(
                        AlertType::StopLossHit,
                        Urgency::Immediate,
                        format!("Stop loss: {}", pos.symbol),
                        pos.action_reason.clone(),
                    )
                    .for_symbol(&pos.symbol)
                    .with_data(data.clone()),
                );
            }
            PositionAction::Reduce if pos.unrealized_pnl_pct > 0.0 => {
                alerts.push(
                    Alert::new(
                        AlertType::TakeProfit,
                        Urgency::High,
                        format!("Take profit: {}", pos.symbol),
                        pos.action_reason.clone(),
                    )
                    .for_symbol(&pos.symbol)
                    .with_data(data.clone()),
                );
            }
            PositionAction::Reduce => {
                alerts.push(
                    Alert::new(
                        AlertType::Concentration,
                        Urgency::High,
                        format!("Concentration: {}", pos.symbol),
                        pos.action_reason.clone(),
                    )
                    .for_symbol(&pos.symbol)
                    .with_data(data.clone()),
                );
            }
            _ => {}
        }
    }

    let cash_pct = if assessment.total_value > 0.0 {
        assessment.cash_available / assessment.total_value * 100.0
    } else {
        0.0
    };
    if cash_pct > 30.0 && !assessment.positions.is_empty() {
        alerts.push(
            Alert::new(
                AlertType::IdleCapital,
                Urgency::Low,
                "Idle capital",
                format!(
                    "Cash at {:.1}% of portfolio (target position size {:.0}%)",
                    cash_pct,
                    config.target_position_pct()
                ),
            )
            .with_data(AlertData {
                idle_pct: Some(cash_pct),
                ..Default::default()
            }),
        );
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskThresholds;
    use crate::risk::RiskAssessor;
    use portfolio::{AccountId, AccountState, Position};

    fn assess(positions: Vec<Position>, cash: f64) -> PortfolioRiskAssessment {
        RiskAssessor::new(RiskThresholds::default())
            .assess_portfolio(&AccountState::new(AccountId::new("t"), cash), &positions)
            .unwrap()
    }

    #[test]
    fn test_critical_position_raises_risk_threshold_alert() {
        let a = assess(
            vec![Position::new("LOSER", 10.0, 150.0).with_current_price(100.0)],
            9000.0,
        );
        let alerts = derive_alerts(&a, &RebalanceConfig::default());

        let risk = alerts
            .iter()
            .find(|al| al.alert_type == AlertType::RiskThreshold)
            .expect("expected risk threshold alert");
        assert_eq!(risk.urgency, Urgency::Immediate);
        assert_eq!(risk.symbol.as_deref(), Some("LOSER"));
        assert!(risk.data.pnl_pct.unwrap() < -30.0);
    }

    #[test]
    fn test_take_profit_alert_for_winner() {
        let a = assess(
            vec![Position::new("WINNER", 10.0, 100.0).with_current_price(125.0)],
            11000.0,
        );
        let alerts = derive_alerts(&a, &RebalanceConfig::default());

        let tp = alerts
            .iter()
            .find(|al| al.alert_type == AlertType::TakeProfit)
            .expect("expected take profit alert");
        assert_eq!(tp.urgency, Urgency::High);
        assert!(tp.data.current_price.unwrap() > 100.0);
    }

    #[test]
    fn test_idle_cash_alert_is_low_urgency() {
        let a = assess(
            vec![Position::new("AAPL", 10.0, 100.0).with_current_price(100.0)],
            9000.0,
        );
        let alerts = derive_alerts(&a, &RebalanceConfig::default());

        let idle = alerts
            .iter()
            .find(|al| al.alert_type == AlertType::IdleCapital)
            .expect("expected idle capital alert");
        assert_eq!(idle.urgency, Urgency::Low);
        assert!(idle.symbol.is_none());
    }
}
