use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Decimal;

use crate::params::Params;
use crate::state::{
    AggregateExchangeRateVote, OracleExchangeRate, OracleTwap, PriceSnapshot, VoteOutcome,
    VotePenaltyCounter,
};

#[cw_serde]
#[derive(Default)]
pub struct InstantiateMsg {
    /// Genesis parameters, the defaults are used when omitted
    pub params: Option<Params>,
}

#[cw_serde]
pub enum ExecuteMsg {
    AggregateExchangeRateVote {
        /// Comma separated rates, `uatom:12.5,ueth:3000` or `12.5uatom,3000ueth`
        exchange_rates: String,
        /// Operator address of the validator the vote is cast for
        validator: String,
    },
    DelegateFeedConsent {
        /// Operator address of the validator, must be the sender
        operator: String,
        /// Address allowed to vote for the validator from now on
        delegate: String,
    },
}

/// Privileged calls made by the chain itself (tally, governance).
#[cw_serde]
pub enum SudoMsg {
    UpdateParams {
        params: Params,
    },
    /// Stores the tallied rate of a denom at the current block
    SetExchangeRate {
        denom: String,
        exchange_rate: Decimal,
    },
    DeleteExchangeRate {
        denom: String,
    },
    AddPriceSnapshot {
        snapshot: PriceSnapshot,
    },
    RecordVotePenalty {
        validator: String,
        outcome: VoteOutcome,
    },
    ResetVotePenaltyCounter {
        validator: String,
    },
    DeleteAggregateVote {
        validator: String,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Params)]
    Params {},
    #[returns(OracleExchangeRate)]
    ExchangeRate { denom: String },
    #[returns(Vec<DenomOracleExchangeRate>)]
    ExchangeRates {},
    /// Denoms that currently have a rate
    #[returns(Vec<String>)]
    Actives {},
    #[returns(Vec<String>)]
    VoteTargets {},
    #[returns(Vec<PriceSnapshot>)]
    PriceSnapshotHistory {},
    #[returns(Vec<OracleTwap>)]
    Twaps { lookback_seconds: u64 },
    #[returns(FeederDelegationResponse)]
    FeederDelegation { validator: String },
    #[returns(VotePenaltyCounter)]
    VotePenaltyCounter { validator: String },
    #[returns(Vec<ValidatorVotePenaltyCounter>)]
    VotePenaltyCounters {},
    #[returns(AggregateExchangeRateVote)]
    AggregateVote { validator: String },
    #[returns(Vec<AggregateExchangeRateVote>)]
    AggregateVotes {},
    #[returns(SlashWindowResponse)]
    SlashWindow {},
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct DenomOracleExchangeRate {
    pub denom: String,
    pub oracle_exchange_rate: OracleExchangeRate,
}

#[cw_serde]
pub struct FeederDelegationResponse {
    pub feeder: String,
}

#[cw_serde]
pub struct ValidatorVotePenaltyCounter {
    pub validator: String,
    pub vote_penalty_counter: VotePenaltyCounter,
}

#[cw_serde]
pub struct SlashWindowResponse {
    /// Vote periods elapsed in the current slash window
    pub window_progress: u64,
}
