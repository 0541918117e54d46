//! Notification channel for rebalancing activity.
//!
//! Replaces ad-hoc callbacks with a broadcast bus: zero or more listeners
//! (chat bridge, HTTP layer, logs) subscribe, and a slow or dropped listener
//! never interrupts the execution pipeline.

use log::debug;
use portfolio::Alert;
use tokio::sync::broadcast;

use crate::models::TradeExecution;

#[derive(Debug, Clone)]
pub enum RebalanceEvent {
    /// The monitor raised an alert (published before handling).
    AlertRaised(Alert),
    /// An execution attempt was recorded, successful or not.
    TradeExecuted(TradeExecution),
}

/// A wrapper around a tokio broadcast channel, strongly typed to
/// rebalancing events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RebalanceEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        // Lagging subscribers skip old events rather than block delivery.
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Publish fire-and-forget. Having no subscribers is not an error.
    pub fn publish(&self, event: RebalanceEvent) {
        if self.sender.send(event).is_err() {
            debug!("event published with no active subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RebalanceEvent> {
        self.sender.subscribe()
    }
}
