pub mod error;
pub mod model;

pub use error::{PortfolioError, Result};

pub mod traits;
pub use model::account::{AccountId, AccountState};
pub use model::advice::{Advice, AdviceContext, Stance};
pub use model::alert::{Alert, AlertData, AlertType, Urgency};
pub use model::order::TradeOrder;
pub use model::position::Position;
pub use model::risk::{PositionAction, RiskLevel, TradeAction};
pub use model::snapshot::PortfolioSnapshot;
pub use traits::store::PositionStore;
