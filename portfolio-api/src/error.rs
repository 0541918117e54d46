use thiserror::Error;

/// Global error type for the portfolio core.
///
/// Nothing in this taxonomy is fatal to the process: callers either skip the
/// offending item with a log line or capture the error into an execution
/// record for operator review.
#[derive(Error, Debug, Clone)]
pub enum PortfolioError {
    /// Malformed position or account figures. Rejected before computing,
    /// never silently coerced.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced account, position or symbol does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A safety limit (daily cap, cooldown) blocked the operation.
    #[error("throttled: {0}")]
    Throttled(String),

    /// The trade-persistence boundary failed to apply a mutation.
    #[error("execution failed: {0}")]
    Execution(String),
}

/// A specialized Result type for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;
