use crate::error::Result;
use crate::model::account::{AccountId, AccountState};
use crate::model::order::TradeOrder;
use crate::model::position::Position;

/// Read access to holdings and cash, plus the write path used by live
/// (non-dry-run) execution.
///
/// This is a synchronous boundary call assumed to complete or fail promptly;
/// the core defines no automatic retry of a failed trade.
pub trait PositionStore: Send + Sync {
    /// Current cash side of the account.
    fn account(&self, id: &AccountId) -> Result<AccountState>;

    /// Current open positions for the account.
    fn positions(&self, id: &AccountId) -> Result<Vec<Position>>;

    /// Apply a trade to stored state as a single atomic transaction.
    fn apply_trade(&self, id: &AccountId, order: &TradeOrder) -> Result<()>;
}
