use cosmwasm_std::{
    CheckedFromRatioError, Decimal, DecimalRangeExceeded, OverflowError, StdError,
};
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    CheckedFromRatio(#[from] CheckedFromRatioError),

    #[error("{0}")]
    DecimalRange(#[from] DecimalRangeExceeded),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid coins: {0}")]
    InvalidCoins(String),

    #[error("Duplicate denom in vote: {0}")]
    DuplicateDenom(String),

    #[error("Unauthorized voter: {0} may not vote for this validator")]
    NoVotingPermission(String),

    #[error("Validator {0} is not in the active set")]
    NoValidatorFound(String),

    #[error("Unknown denom: {0}")]
    UnknownDenom(String),

    #[error("Denom {0} is not a vote target")]
    NoVoteTarget(String),

    #[error("No aggregate vote stored for validator {0}")]
    NoAggregateVote(String),

    #[error("Validator {validator} already voted at height {height}")]
    AlreadyVoted { validator: String, height: u64 },

    #[error("Invalid TWAP lookback: must be positive and at most {max} seconds, got {lookback}")]
    InvalidTwapLookback { lookback: u64, max: u64 },

    #[error("No data available to compute TWAPs")]
    NoTwapData,

    #[error("Invalid fraction {0}: {1} must be between 0 and 1")]
    InvalidFraction(String, Decimal),

    #[error("Vote threshold must be greater than 1/3 and at most 1, got {0}")]
    InvalidVoteThreshold(Decimal),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Cannot migrate from {0}")]
    MigrationMismatch(String),
}
