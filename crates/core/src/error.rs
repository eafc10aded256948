use thiserror::Error;

/// Errors that can occur in the planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("iteration budget must be positive")]
    ZeroIterations,

    #[error("root state has no legal actions")]
    NoLegalActions,

    #[error("no children to select from")]
    EmptyChildren,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),
}

/// Convenience Result type for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;
