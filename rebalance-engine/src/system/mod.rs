//! Composition root wiring the alert source, risk assessor, advisor and
//! rebalancer together for one account.

use log::{info, warn};
use portfolio::{
    AccountId, Alert, PortfolioError, PortfolioSnapshot, PositionStore, Result,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::advisor::{debate, Advisor, DebateOutcome};
use crate::engine::Rebalancer;
use crate::events::{EventBus, RebalanceEvent};
use crate::models::{
    DailyStats, Opportunity, PortfolioRiskAssessment, PositionRiskAssessment, RebalanceConfig,
    RebalanceResult, ReallocationSuggestion, RiskThresholds, TradeExecution,
};
use crate::monitor::AlertSource;
use crate::risk::RiskAssessor;

/// Snapshot of the whole system for status queries.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub account_id: AccountId,
    pub running: bool,
    pub dry_run: bool,
    pub portfolio: Option<PortfolioSnapshot>,
    pub daily: DailyStats,
    pub recent_trades: Vec<TradeExecution>,
}

/// One system instance per monitored account. Alert handling for the account
/// is serialized through a mutex around the rebalancer, so the throttle
/// state's read-modify-write is never interleaved; different accounts run
/// independent instances in parallel.
pub struct RebalancingSystem {
    account_id: AccountId,
    store: Arc<dyn PositionStore>,
    source: Arc<dyn AlertSource>,
    assessor: RiskAssessor,
    advisor: Arc<dyn Advisor>,
    rebalancer: Arc<Mutex<Rebalancer>>,
    events: EventBus,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl RebalancingSystem {
    pub fn new(
        account_id: AccountId,
        thresholds: RiskThresholds,
        config: RebalanceConfig,
        store: Arc<dyn PositionStore>,
        source: Arc<dyn AlertSource>,
        advisor: Arc<dyn Advisor>,
    ) -> Self {
        let events = EventBus::new();
        let rebalancer = Rebalancer::new(
            account_id.clone(),
            config,
            store.clone(),
            events.clone(),
        );

        Self {
            account_id,
            store,
            source,
            assessor: RiskAssessor::new(thresholds),
            advisor,
            rebalancer: Arc::new(Mutex::new(rebalancer)),
            events,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Bus handle for subscribing to alert/trade notifications.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// Start draining the alert channel. Idempotent.
    pub async fn start(&mut self, mut alerts: mpsc::Receiver<Alert>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.rebalancer.lock().await.start();

        let running = self.running.clone();
        let rebalancer = self.rebalancer.clone();
        let events = self.events.clone();
        self.worker = Some(tokio::spawn(async move {
            while let Some(alert) = alerts.recv().await {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                events.publish(RebalanceEvent::AlertRaised(alert.clone()));
                rebalancer.lock().await.handle_alert(&alert);
            }
        }));

        info!("Rebalancing system started for account {}", self.account_id);
    }

    /// Idempotent. An alert being handled right now finishes first (its
    /// handling holds the rebalancer lock); afterward no new alerts are
    /// accepted.
    pub async fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.rebalancer.lock().await.stop();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
        info!("Rebalancing system stopped for account {}", self.account_id);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Full portfolio assessment from current store state.
    pub fn assess_portfolio(&self) -> Result<PortfolioRiskAssessment> {
        let account = self.store.account(&self.account_id)?;
        let positions = self.store.positions(&self.account_id)?;
        self.assessor.assess_portfolio(&account, &positions)
    }

    /// Detailed recommendation for one held symbol.
    pub fn position_recommendation(&self, symbol: &str) -> Result<Option<PositionRiskAssessment>> {
        let assessment = self.assess_portfolio()?;
        Ok(assessment
            .positions
            .into_iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol)))
    }

    pub fn reallocation_suggestions(
        &self,
        opportunities: &[Opportunity],
    ) -> Result<Vec<ReallocationSuggestion>> {
        let assessment = self.assess_portfolio()?;
        Ok(self
            .assessor
            .reallocation_suggestions(&assessment, opportunities))
    }

    /// Run the three-stance debate for one held symbol.
    pub async fn advise_position(&self, symbol: &str) -> Result<DebateOutcome> {
        let assessment = self.position_recommendation(symbol)?.ok_or_else(|| {
            PortfolioError::NotFound(format!("no position for {}", symbol))
        })?;
        debate(self.advisor.as_ref(), &(&assessment).into()).await
    }

    /// Replay the current snapshot's alerts through the normal handling path.
    pub async fn trigger_rebalance(&self) -> RebalanceResult {
        let result = self
            .rebalancer
            .lock()
            .await
            .manual_rebalance(self.source.as_ref());
        info!("{}", result.summary());
        result
    }

    pub async fn daily_stats(&self) -> DailyStats {
        self.rebalancer.lock().await.daily_stats()
    }

    pub async fn trade_history(&self, limit: usize) -> Vec<TradeExecution> {
        self.rebalancer.lock().await.trade_history(limit).to_vec()
    }

    pub async fn status(&self) -> SystemStatus {
        let mut rebalancer = self.rebalancer.lock().await;
        let portfolio = self.source.current_snapshot();
        if portfolio.is_none() {
            warn!("no snapshot published yet for {}", self.account_id);
        }
        SystemStatus {
            account_id: self.account_id.clone(),
            running: self.is_running(),
            dry_run: rebalancer.config().dry_run(),
            portfolio,
            daily: rebalancer.daily_stats(),
            recent_trades: rebalancer.trade_history(5).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::HeuristicAdvisor;
    use crate::monitor::SimulatedMonitor;
    use crate::store::MemoryStore;
    use portfolio::{AlertData, AlertType, Position, PositionAction, Urgency};
    use std::time::Duration;

    fn build_system() -> (RebalancingSystem, Arc<SimulatedMonitor>, mpsc::Receiver<Alert>) {
        let account = AccountId::new("test");
        let store = Arc::new(MemoryStore::new());
        store.open_account(&account, 5000.0);
        store.insert_position(
            &account,
            Position::new("AAPL", 10.0, 150.0).with_current_price(100.0),
        );

        let (monitor, rx) = SimulatedMonitor::new();
        let monitor = Arc::new(monitor);
        let system = RebalancingSystem::new(
            account,
            RiskThresholds::default(),
            RebalanceConfig::default(),
            store,
            monitor.clone(),
            Arc::new(HeuristicAdvisor::new(RiskThresholds::default())),
        );
        (system, monitor, rx)
    }

    fn stop_loss_alert() -> Alert {
        Alert::new(AlertType::StopLossHit, Urgency::Immediate, "Stop loss", "")
            .for_symbol("AAPL")
            .with_data(AlertData {
                pnl_pct: Some(-33.3),
                current_price: Some(100.0),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_alert_flows_from_monitor_to_trade() {
        let (mut system, monitor, rx) = build_system();
        system.start(rx).await;

        monitor.raise_alert(stop_loss_alert());

        // Delivery is asynchronous; poll briefly.
        let mut recorded = 0;
        for _ in 0..50 {
            recorded = system.daily_stats().await.trades_today;
            if recorded > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(recorded, 1);

        let history = system.trade_history(10).await;
        assert_eq!(history[0].symbol, "AAPL");
        system.stop().await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_blocks_new_alerts() {
        let (mut system, _monitor, rx) = build_system();
        system.start(rx).await;
        system.stop().await;
        system.stop().await;
        assert!(!system.is_running());

        // With the rebalancer stopped, a manual trigger records nothing.
        let result = system.trigger_rebalance().await;
        assert!(result.trades_executed.is_empty());
    }

    #[tokio::test]
    async fn test_assessment_and_advice_queries() {
        let (system, _monitor, _rx) = build_system();

        let assessment = system.assess_portfolio().unwrap();
        assert_eq!(assessment.positions.len(), 1);
        assert!(assessment.rebalance_needed);

        let rec = system.position_recommendation("aapl").unwrap().unwrap();
        assert_eq!(rec.recommended_action, PositionAction::Exit);

        let outcome = system.advise_position("AAPL").await.unwrap();
        assert_eq!(outcome.final_action, PositionAction::Exit);

        let missing = system.advise_position("GONE").await;
        assert!(matches!(missing, Err(PortfolioError::NotFound(_))));
    }
}
