use cosmwasm_schema::cw_serde;
use cosmwasm_std::Decimal;

/// An asset identifier, as stored in the vote target registry and the whitelist.
#[cw_serde]
pub struct Denom {
    pub name: String,
}

impl Denom {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cw_serde]
pub struct ExchangeRateTuple {
    pub denom: String,
    pub exchange_rate: Decimal,
}

/// The latest set of rates submitted for a validator.
#[cw_serde]
pub struct AggregateExchangeRateVote {
    pub voter: String,
    pub exchange_rate_tuples: Vec<ExchangeRateTuple>,
}

#[cw_serde]
pub struct OracleExchangeRate {
    pub exchange_rate: Decimal,
    pub last_update: u64,
    /// Block time of the update, in milliseconds
    pub last_update_timestamp: u64,
}

#[cw_serde]
pub struct PriceSnapshotItem {
    pub denom: String,
    pub oracle_exchange_rate: OracleExchangeRate,
}

/// Full-market capture of the agreed rates, taken once per tally.
#[cw_serde]
pub struct PriceSnapshot {
    /// Seconds since the unix epoch
    pub snapshot_timestamp: u64,
    pub price_snapshot_items: Vec<PriceSnapshotItem>,
}

#[cw_serde]
#[derive(Default)]
pub struct VotePenaltyCounter {
    pub miss_count: u64,
    pub abstain_count: u64,
    pub success_count: u64,
}

#[cw_serde]
#[derive(Copy)]
pub enum VoteOutcome {
    Miss,
    Abstain,
    Success,
}

impl VoteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOutcome::Miss => "miss",
            VoteOutcome::Abstain => "abstain",
            VoteOutcome::Success => "success",
        }
    }
}

impl VotePenaltyCounter {
    pub fn record(&mut self, outcome: VoteOutcome) {
        match outcome {
            VoteOutcome::Miss => self.miss_count += 1,
            VoteOutcome::Abstain => self.abstain_count += 1,
            VoteOutcome::Success => self.success_count += 1,
        }
    }
}

#[cw_serde]
pub struct OracleTwap {
    pub denom: String,
    pub twap: Decimal,
    /// Seconds of history the average actually covers
    pub lookback_seconds: u64,
}
