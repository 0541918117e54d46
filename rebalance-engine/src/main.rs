use anyhow::Result;
use clap::Parser;
use log::{error, info};
use portfolio::{AccountId, Position, PositionStore};
use rebalance_engine::advisor::HeuristicAdvisor;
use rebalance_engine::events::RebalanceEvent;
use rebalance_engine::io::{Args, Settings};
use rebalance_engine::models::RebalanceConfig;
use rebalance_engine::monitor::{derive_alerts, snapshot_from_assessment, SimulatedMonitor};
use rebalance_engine::risk::RiskAssessor;
use rebalance_engine::store::MemoryStore;
use rebalance_engine::system::RebalancingSystem;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = Settings::load(&args.config)?;
    if args.dry_run {
        settings.rebalance = settings.rebalance.clone().with_dry_run(true);
    }

    let account = AccountId::new(&args.account);
    let store = Arc::new(MemoryStore::new());
    seed_demo_book(&store, &account);

    let (monitor, alert_rx) = SimulatedMonitor::new();
    let monitor = Arc::new(monitor);
    let advisor = Arc::new(HeuristicAdvisor::new(settings.thresholds.clone()));

    let mut system = RebalancingSystem::new(
        account.clone(),
        settings.thresholds.clone(),
        settings.rebalance.clone(),
        store.clone(),
        monitor.clone(),
        advisor,
    );

    // Log every alert and trade flowing through the bus.
    let mut events = system.events().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                RebalanceEvent::AlertRaised(alert) => {
                    info!("ALERT [{:?}] {}: {}", alert.urgency, alert.title, alert.message)
                }
                RebalanceEvent::TradeExecuted(trade) => info!(
                    "TRADE {} {} {:.2} {} @ ${:.2} ({})",
                    if trade.success { "ok" } else { "FAILED" },
                    trade.action,
                    trade.quantity,
                    trade.symbol,
                    trade.price,
                    trade.reason
                ),
            }
        }
    });

    system.start(alert_rx).await;

    let assessor = RiskAssessor::new(settings.thresholds.clone());
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    let mut cycle = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cycle += 1;
                if let Err(e) = run_cycle(&assessor, store.as_ref(), monitor.as_ref(), &account, &settings.rebalance) {
                    error!("assessment cycle failed: {:#}", e);
                }

                // Give the alert worker a beat before reporting.
                tokio::time::sleep(Duration::from_millis(100)).await;
                let status = system.status().await;
                info!(
                    "cycle {}: trades today {}, remaining {}, volume ${:.2}",
                    cycle,
                    status.daily.trades_today,
                    status.daily.trades_remaining,
                    status.daily.total_volume
                );

                if cycle == 1 {
                    match system.advise_position("AAPL").await {
                        Ok(outcome) => info!(
                            "debate on AAPL: {} (risk {:.0}/100): {}",
                            outcome.final_action, outcome.risk_score, outcome.final_reasoning
                        ),
                        Err(e) => error!("debate failed: {:#}", e),
                    }
                }

                if args.cycles != 0 && cycle >= args.cycles {
                    info!("status: {}", serde_json::to_string_pretty(&status)?);
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
        }
    }

    system.stop().await;
    Ok(())
}

/// One monitor cycle: reassess the book, publish the snapshot, raise alerts.
fn run_cycle(
    assessor: &RiskAssessor,
    store: &MemoryStore,
    monitor: &SimulatedMonitor,
    account: &AccountId,
    config: &RebalanceConfig,
) -> Result<()> {
    let state = store.account(account)?;
    let positions = store.positions(account)?;
    let assessment = assessor.assess_portfolio(&state, &positions)?;

    info!(
        "portfolio ${:.2} ({} positions), risk {}, {} suggested actions",
        assessment.total_value,
        assessment.positions.len(),
        assessment.overall_risk_level,
        assessment.suggested_actions.len()
    );

    let alerts = derive_alerts(&assessment, config);
    monitor.set_snapshot(snapshot_from_assessment(&assessment, alerts.clone()));
    for alert in alerts {
        monitor.raise_alert(alert);
    }
    Ok(())
}

/// Paper book for the demo: one deep loser, one runner, one quiet name and
/// a pile of idle cash.
fn seed_demo_book(store: &MemoryStore, account: &AccountId) {
    store.open_account(account, 20000.0);
    store.insert_position(
        account,
        Position::new("AAPL", 10.0, 150.0)
            .with_current_price(100.0)
            .with_days_held(45),
    );
    store.insert_position(
        account,
        Position::new("NVDA", 10.0, 100.0)
            .with_current_price(135.0)
            .with_days_held(20),
    );
    store.insert_position(
        account,
        Position::new("MSFT", 5.0, 300.0)
            .with_current_price(310.0)
            .with_days_held(90),
    );
}
