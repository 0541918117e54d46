use portfolio::{
    AccountId, AccountState, PortfolioError, Position, PositionStore, Result, TradeAction,
    TradeOrder,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Residual quantity below which a position is considered closed.
const QTY_EPSILON: f64 = 1e-9;

#[derive(Debug, Default)]
struct AccountBook {
    cash: f64,
    positions: Vec<Position>,
}

/// In-memory position store used by tests and the demo binary. Each call
/// takes the book lock once, so a trade applies atomically.
pub struct MemoryStore {
    books: Mutex<HashMap<AccountId, AccountBook>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    pub fn open_account(&self, id: &AccountId, cash: f64) {
        let mut books = self.books.lock().unwrap();
        let book = books.entry(id.clone()).or_default();
        book.cash = cash;
    }

    pub fn insert_position(&self, id: &AccountId, position: Position) {
        let mut books = self.books.lock().unwrap();
        let book = books.entry(id.clone()).or_default();
        book.positions.push(position);
    }

    /// Update the market quote for a symbol (demo price feed).
    pub fn set_price(&self, id: &AccountId, symbol: &str, price: f64) {
        let mut books = self.books.lock().unwrap();
        if let Some(book) = books.get_mut(id) {
            for position in &mut book.positions {
                if position.symbol.eq_ignore_ascii_case(symbol) {
                    position.current_price = Some(price);
                }
            }
        }
    }
}

impl PositionStore for MemoryStore {
    fn account(&self, id: &AccountId) -> Result<AccountState> {
        let books = self.books.lock().unwrap();
        let book = books
            .get(id)
            .ok_or_else(|| PortfolioError::NotFound(format!("account {}", id)))?;
        Ok(AccountState::new(id.clone(), book.cash))
    }

    fn positions(&self, id: &AccountId) -> Result<Vec<Position>> {
        let books = self.books.lock().unwrap();
        let book = books
            .get(id)
            .ok_or_else(|| PortfolioError::NotFound(format!("account {}", id)))?;
        Ok(book.positions.clone())
    }

    fn apply_trade(&self, id: &AccountId, order: &TradeOrder) -> Result<()> {
        let mut books = self.books.lock().unwrap();
        let book = books
            .get_mut(id)
            .ok_or_else(|| PortfolioError::NotFound(format!("account {}", id)))?;

        match order.action {
            TradeAction::Sell | TradeAction::SellAll => {
                let idx = book
                    .positions
                    .iter()
                    .position(|p| p.symbol.eq_ignore_ascii_case(&order.symbol))
                    .ok_or_else(|| {
                        PortfolioError::NotFound(format!("position {}", order.symbol))
                    })?;

                let position = &mut book.positions[idx];
                let sell_qty = order.quantity.min(position.quantity);
                position.quantity -= sell_qty;
                book.cash += sell_qty * order.price;

                if book.positions[idx].quantity <= QTY_EPSILON {
                    book.positions.remove(idx);
                }
                Ok(())
            }
            TradeAction::Buy => {
                let cost = order.value();
                if cost > book.cash {
                    return Err(PortfolioError::Execution(format!(
                        "insufficient cash: need ${:.2}, have ${:.2}",
                        cost, book.cash
                    )));
                }
                book.cash -= cost;

                // Weighted-average entry on adds.
                if let Some(position) = book
                    .positions
                    .iter_mut()
                    .find(|p| p.symbol.eq_ignore_ascii_case(&order.symbol))
                {
                    let total_cost =
                        position.entry_price * position.quantity + order.price * order.quantity;
                    position.quantity += order.quantity;
                    position.entry_price = if position.quantity > 0.0 {
                        total_cost / position.quantity
                    } else {
                        0.0
                    };
                    position.current_price = Some(order.price);
                } else {
                    book.positions.push(
                        Position::new(order.symbol.to_ascii_uppercase(), order.quantity, order.price)
                            .with_current_price(order.price),
                    );
                }
                Ok(())
            }
            TradeAction::NoAction => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_position() -> (MemoryStore, AccountId) {
        let store = MemoryStore::new();
        let id = AccountId::new("test");
        store.open_account(&id, 1000.0);
        store.insert_position(&id, Position::new("AAPL", 10.0, 150.0).with_current_price(100.0));
        (store, id)
    }

    #[test]
    fn test_sell_credits_cash_and_reduces_position() {
        let (store, id) = store_with_position();
        store
            .apply_trade(&id, &TradeOrder::new("AAPL", TradeAction::Sell, 4.0, 100.0))
            .unwrap();

        let positions = store.positions(&id).unwrap();
        assert!((positions[0].quantity - 6.0).abs() < 1e-9);
        assert!((store.account(&id).unwrap().cash_balance - 1400.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_all_removes_position() {
        let (store, id) = store_with_position();
        store
            .apply_trade(
                &id,
                &TradeOrder::new("aapl", TradeAction::SellAll, 10.0, 100.0),
            )
            .unwrap();

        assert!(store.positions(&id).unwrap().is_empty());
        assert!((store.account(&id).unwrap().cash_balance - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_unknown_symbol_is_not_found() {
        let (store, id) = store_with_position();
        let err = store
            .apply_trade(&id, &TradeOrder::new("MSFT", TradeAction::Sell, 1.0, 50.0))
            .unwrap_err();
        assert!(matches!(err, PortfolioError::NotFound(_)));
    }

    #[test]
    fn test_buy_averages_entry_price() {
        let (store, id) = store_with_position();
        store
            .apply_trade(&id, &TradeOrder::new("AAPL", TradeAction::Buy, 10.0, 50.0))
            .unwrap();

        let positions = store.positions(&id).unwrap();
        assert!((positions[0].quantity - 20.0).abs() < 1e-9);
        // (150*10 + 50*10) / 20 = 100
        assert!((positions[0].entry_price - 100.0).abs() < 1e-9);
        assert!((store.account(&id).unwrap().cash_balance - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_buy_without_cash_fails() {
        let (store, id) = store_with_position();
        let err = store
            .apply_trade(&id, &TradeOrder::new("NVDA", TradeAction::Buy, 100.0, 500.0))
            .unwrap_err();
        assert!(matches!(err, PortfolioError::Execution(_)));
    }
}
