use std::collections::BTreeSet;

use cosmwasm_std::{Addr, Decimal, Order, StdError, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use crate::params::Params;
use crate::staking::{same_account, ValidatorSet};
use crate::state::{
    AggregateExchangeRateVote, Denom, OracleExchangeRate, OracleTwap, PriceSnapshot,
    VoteOutcome, VotePenaltyCounter,
};
use crate::twap;
use crate::vote::parse_exchange_rate_tuples;
use crate::ContractError;

/// Handles to every store of the oracle. Cheap to build, holds no data itself.
pub struct OracleKeeper<'a> {
    params: Item<Params>,
    exchange_rates: Map<&'a str, OracleExchangeRate>,
    feeder_delegations: Map<&'a str, Addr>,
    vote_penalty_counters: Map<&'a str, VotePenaltyCounter>,
    aggregate_votes: Map<&'a str, AggregateExchangeRateVote>,
    vote_targets: Map<&'a str, Denom>,
    price_snapshots: Map<u64, PriceSnapshot>,
    spam_prevention: Map<&'a str, u64>,
}

impl Default for OracleKeeper<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> OracleKeeper<'a> {
    pub const fn new() -> Self {
        Self {
            params: Item::new("params"),
            exchange_rates: Map::new("exchange_rates"),
            feeder_delegations: Map::new("feeder_delegations"),
            vote_penalty_counters: Map::new("vote_penalty_counters"),
            aggregate_votes: Map::new("aggregate_votes"),
            vote_targets: Map::new("vote_targets"),
            price_snapshots: Map::new("price_snapshots"),
            spam_prevention: Map::new("spam_prevention"),
        }
    }

    // params

    pub fn params(&self, storage: &dyn Storage) -> StdResult<Params> {
        self.params.load(storage)
    }

    /// Validates and stores `params`, then resets the vote targets to the whitelist.
    pub fn set_params(
        &self,
        storage: &mut dyn Storage,
        params: &Params,
    ) -> Result<(), ContractError> {
        params.validate()?;
        self.params.save(storage, params)?;
        self.replace_vote_targets(storage, &params.whitelist)?;
        Ok(())
    }

    pub fn validate_lookback_seconds(
        &self,
        storage: &dyn Storage,
        lookback_seconds: u64,
    ) -> Result<(), ContractError> {
        let max = self.params(storage)?.lookback_duration;
        if lookback_seconds == 0 || lookback_seconds > max {
            return Err(ContractError::InvalidTwapLookback {
                lookback: lookback_seconds,
                max,
            });
        }
        Ok(())
    }

    /// Number of vote periods already elapsed in the current slash window.
    pub fn slash_window_progress(&self, storage: &dyn Storage, height: u64) -> StdResult<u64> {
        let params = self.params(storage)?;
        Ok((height % params.slash_window) / params.vote_period)
    }

    // exchange rates

    pub fn exchange_rate(
        &self,
        storage: &dyn Storage,
        denom: &str,
    ) -> Result<OracleExchangeRate, ContractError> {
        self.exchange_rates
            .may_load(storage, denom)?
            .ok_or_else(|| ContractError::UnknownDenom(denom.to_string()))
    }

    pub fn set_exchange_rate(
        &self,
        storage: &mut dyn Storage,
        denom: &str,
        exchange_rate: Decimal,
        height: u64,
        timestamp_millis: u64,
    ) -> StdResult<OracleExchangeRate> {
        let rate = OracleExchangeRate {
            exchange_rate,
            last_update: height,
            last_update_timestamp: timestamp_millis,
        };
        self.exchange_rates.save(storage, denom, &rate)?;
        Ok(rate)
    }

    pub fn delete_exchange_rate(&self, storage: &mut dyn Storage, denom: &str) {
        self.exchange_rates.remove(storage, denom);
    }

    /// All live rates, in denom order.
    pub fn exchange_rates(
        &self,
        storage: &dyn Storage,
    ) -> StdResult<Vec<(String, OracleExchangeRate)>> {
        self.exchange_rates
            .range(storage, None, None, Order::Ascending)
            .collect()
    }

    // feeder delegation

    /// The address allowed to vote for `validator`, the validator itself when nothing
    /// was delegated.
    pub fn feeder_delegation(&self, storage: &dyn Storage, validator: &str) -> StdResult<String> {
        Ok(self
            .feeder_delegations
            .may_load(storage, validator)?
            .map_or_else(|| validator.to_string(), String::from))
    }

    pub fn feeder_delegations(&self, storage: &dyn Storage) -> StdResult<Vec<(String, Addr)>> {
        self.feeder_delegations
            .range(storage, None, None, Order::Ascending)
            .collect()
    }

    pub fn delegate(
        &self,
        storage: &mut dyn Storage,
        validators: &dyn ValidatorSet,
        validator: &str,
        delegate: &Addr,
    ) -> Result<(), ContractError> {
        if !validators.is_validator(validator)? {
            return Err(ContractError::NoValidatorFound(validator.to_string()));
        }
        self.feeder_delegations.save(storage, validator, delegate)?;
        Ok(())
    }

    /// Checks that `feeder` may vote for `validator` and that the validator is bonded.
    pub fn validate_feeder(
        &self,
        storage: &dyn Storage,
        validators: &dyn ValidatorSet,
        feeder: &Addr,
        validator: &str,
    ) -> Result<(), ContractError> {
        if !same_account(feeder.as_str(), validator)
            && self.feeder_delegation(storage, validator)? != feeder.as_str()
        {
            return Err(ContractError::NoVotingPermission(feeder.to_string()));
        }

        if !validators.is_bonded(validator)? {
            return Err(ContractError::NoValidatorFound(validator.to_string()));
        }

        Ok(())
    }

    // aggregate votes

    /// Parses and admits a vote, replacing any earlier vote of `validator`.
    pub fn submit_vote(
        &self,
        storage: &mut dyn Storage,
        validators: &dyn ValidatorSet,
        exchange_rates: &str,
        validator: &str,
        feeder: &Addr,
    ) -> Result<AggregateExchangeRateVote, ContractError> {
        let tuples = parse_exchange_rate_tuples(exchange_rates)?;

        self.validate_feeder(storage, validators, feeder, validator)?;

        for tuple in &tuples {
            if !self.is_vote_target(storage, &tuple.denom) {
                return Err(ContractError::UnknownDenom(tuple.denom.clone()));
            }
        }

        let vote = AggregateExchangeRateVote::new(validator, tuples);
        self.aggregate_votes.save(storage, validator, &vote)?;
        Ok(vote)
    }

    pub fn aggregate_vote(
        &self,
        storage: &dyn Storage,
        validator: &str,
    ) -> Result<AggregateExchangeRateVote, ContractError> {
        self.aggregate_votes
            .may_load(storage, validator)?
            .ok_or_else(|| ContractError::NoAggregateVote(validator.to_string()))
    }

    pub fn delete_aggregate_vote(&self, storage: &mut dyn Storage, validator: &str) {
        self.aggregate_votes.remove(storage, validator);
    }

    pub fn aggregate_votes(
        &self,
        storage: &dyn Storage,
    ) -> StdResult<Vec<AggregateExchangeRateVote>> {
        self.aggregate_votes
            .range(storage, None, None, Order::Ascending)
            .map(|item| item.map(|(_, vote)| vote))
            .collect()
    }

    // vote targets

    pub fn is_vote_target(&self, storage: &dyn Storage, denom: &str) -> bool {
        self.vote_targets.has(storage, denom)
    }

    pub fn vote_target(&self, storage: &dyn Storage, denom: &str) -> Result<Denom, ContractError> {
        self.vote_targets
            .may_load(storage, denom)?
            .ok_or_else(|| ContractError::NoVoteTarget(denom.to_string()))
    }

    /// Vote targets in storage order.
    pub fn vote_targets(&self, storage: &dyn Storage) -> StdResult<Vec<String>> {
        self.vote_targets
            .keys(storage, None, None, Order::Ascending)
            .collect()
    }

    pub fn replace_vote_targets(
        &self,
        storage: &mut dyn Storage,
        denoms: &[Denom],
    ) -> StdResult<()> {
        for denom in self.vote_targets(storage)? {
            self.vote_targets.remove(storage, denom.as_str());
        }
        for denom in denoms {
            self.vote_targets.save(storage, denom.name.as_str(), denom)?;
        }
        Ok(())
    }

    // price snapshots

    /// Stores `snapshot` and prunes every snapshot older than the lookback duration
    /// relative to `block_time`. Returns the pruned timestamps.
    ///
    /// Snapshots are keyed by timestamp, a second snapshot within the same second
    /// replaces the first.
    pub fn add_price_snapshot(
        &self,
        storage: &mut dyn Storage,
        snapshot: &PriceSnapshot,
        block_time: u64,
    ) -> StdResult<Vec<u64>> {
        let lookback_duration = self.params(storage)?.lookback_duration;

        self.price_snapshots
            .save(storage, snapshot.snapshot_timestamp, snapshot)?;

        let stale = self
            .price_snapshots
            .keys(storage, None, None, Order::Ascending)
            .filter(|key| {
                key.as_ref().map_or(true, |timestamp| {
                    timestamp.saturating_add(lookback_duration) < block_time
                })
            })
            .collect::<StdResult<Vec<u64>>>()?;

        for timestamp in &stale {
            self.price_snapshots.remove(storage, *timestamp);
        }

        Ok(stale)
    }

    pub fn price_snapshot(
        &self,
        storage: &dyn Storage,
        timestamp: u64,
    ) -> StdResult<Option<PriceSnapshot>> {
        self.price_snapshots.may_load(storage, timestamp)
    }

    /// Every retained snapshot, oldest first.
    pub fn price_snapshots(&self, storage: &dyn Storage) -> StdResult<Vec<PriceSnapshot>> {
        self.price_snapshots
            .range(storage, None, None, Order::Ascending)
            .map(|item| item.map(|(_, snapshot)| snapshot))
            .collect()
    }

    pub fn calculate_twaps(
        &self,
        storage: &dyn Storage,
        current_time: u64,
        lookback_seconds: u64,
    ) -> Result<Vec<OracleTwap>, ContractError> {
        self.validate_lookback_seconds(storage, lookback_seconds)?;

        let targets: BTreeSet<String> = self.vote_targets(storage)?.into_iter().collect();
        let snapshots = self
            .price_snapshots
            .range(storage, None, None, Order::Descending)
            .map(|item| item.map(|(_, snapshot)| snapshot));

        twap::calculate_twaps(snapshots, &targets, current_time, lookback_seconds)
    }

    // vote penalty counters

    pub fn vote_penalty_counter(
        &self,
        storage: &dyn Storage,
        validator: &str,
    ) -> StdResult<VotePenaltyCounter> {
        Ok(self
            .vote_penalty_counters
            .may_load(storage, validator)?
            .unwrap_or_default())
    }

    pub fn vote_penalty_counters(
        &self,
        storage: &dyn Storage,
    ) -> StdResult<Vec<(String, VotePenaltyCounter)>> {
        self.vote_penalty_counters
            .range(storage, None, None, Order::Ascending)
            .collect()
    }

    pub fn record_vote_outcome(
        &self,
        storage: &mut dyn Storage,
        validator: &str,
        outcome: VoteOutcome,
    ) -> StdResult<VotePenaltyCounter> {
        self.vote_penalty_counters
            .update(storage, validator, |counter| -> StdResult<_> {
                let mut counter = counter.unwrap_or_default();
                counter.record(outcome);
                Ok(counter)
            })
    }

    pub fn increment_miss_count(
        &self,
        storage: &mut dyn Storage,
        validator: &str,
    ) -> StdResult<VotePenaltyCounter> {
        self.record_vote_outcome(storage, validator, VoteOutcome::Miss)
    }

    pub fn increment_abstain_count(
        &self,
        storage: &mut dyn Storage,
        validator: &str,
    ) -> StdResult<VotePenaltyCounter> {
        self.record_vote_outcome(storage, validator, VoteOutcome::Abstain)
    }

    pub fn increment_success_count(
        &self,
        storage: &mut dyn Storage,
        validator: &str,
    ) -> StdResult<VotePenaltyCounter> {
        self.record_vote_outcome(storage, validator, VoteOutcome::Success)
    }

    pub fn delete_vote_penalty_counter(&self, storage: &mut dyn Storage, validator: &str) {
        self.vote_penalty_counters.remove(storage, validator);
    }

    // spam prevention

    pub fn mark_voted(
        &self,
        storage: &mut dyn Storage,
        validator: &str,
        height: u64,
    ) -> StdResult<()> {
        self.spam_prevention.save(storage, validator, &height)
    }

    /// Height of the last recorded vote of `validator` if it happened in the block at
    /// `current_height`, `-1` otherwise. Markers from earlier blocks are treated as absent,
    /// a marker beyond the `i64` range is an error.
    pub fn last_voted_height(
        &self,
        storage: &dyn Storage,
        validator: &str,
        current_height: u64,
    ) -> StdResult<i64> {
        Ok(match self.spam_prevention.may_load(storage, validator)? {
            Some(height) if height == current_height => i64::try_from(height).map_err(|_| {
                StdError::generic_err(format!("vote height {height} is out of range"))
            })?,
            _ => -1,
        })
    }
}
