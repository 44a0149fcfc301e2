use thiserror::Error;

use crate::game::Phase;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("action not allowed in {actual:?}, expected {expected:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("bet amount must be positive")]
    InvalidBet,
    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: u64, available: u64 },
    #[error("no bet placed")]
    NoBet,
    #[error("shoe is empty")]
    ShoeEmpty,
    #[error("double down needs exactly two cards")]
    CannotDouble,
    #[error("unknown outfit stage {0}")]
    UnknownStage(usize),
    #[error("outfit stage {0} already unlocked")]
    StageAlreadyUnlocked(usize),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for TableError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}
