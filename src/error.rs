use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Stake must be positive and no larger than the bankroll")]
    InvalidStake,
    #[error("Hazard count must leave at least one safe cell and one hazard")]
    InvalidHazardCount,
    #[error("Operation is not legal in the current round state")]
    InvalidState,
    #[error("Cell index out of range or cell already revealed")]
    InvalidCell,
    #[error("Persistence collaborator failed")]
    Persistence(#[from] StoreError),
}

pub type Result<T> = core::result::Result<T, GameError>;
