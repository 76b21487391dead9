#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response};
use cw2::{get_contract_version, set_contract_version};
use cw_utils::nonpayable;

use crate::error::ContractError;
use crate::keeper::OracleKeeper;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, SudoMsg};

// version info for migration info
const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const ORACLE: OracleKeeper<'static> = OracleKeeper::new();

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;

    let params = msg.params.unwrap_or_default();
    ORACLE.set_params(deps.storage, &params)?;

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("vote_period", params.vote_period.to_string())
        .add_attribute("vote_targets", params.whitelist.len().to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::AggregateExchangeRateVote {
            exchange_rates,
            validator,
        } => execute::aggregate_exchange_rate_vote(deps, env, info, exchange_rates, validator),
        ExecuteMsg::DelegateFeedConsent { operator, delegate } => {
            execute::delegate_feed_consent(deps, info, operator, delegate)
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(deps: DepsMut, env: Env, msg: SudoMsg) -> Result<Response, ContractError> {
    match msg {
        SudoMsg::UpdateParams { params } => sudo::update_params(deps, params),
        SudoMsg::SetExchangeRate {
            denom,
            exchange_rate,
        } => sudo::set_exchange_rate(deps, env, denom, exchange_rate),
        SudoMsg::DeleteExchangeRate { denom } => sudo::delete_exchange_rate(deps, denom),
        SudoMsg::AddPriceSnapshot { snapshot } => sudo::add_price_snapshot(deps, env, snapshot),
        SudoMsg::RecordVotePenalty { validator, outcome } => {
            sudo::record_vote_penalty(deps, validator, outcome)
        }
        SudoMsg::ResetVotePenaltyCounter { validator } => {
            ORACLE.delete_vote_penalty_counter(deps.storage, &validator);
            Ok(Response::new()
                .add_attribute("method", "reset_vote_penalty_counter")
                .add_attribute("validator", validator))
        }
        SudoMsg::DeleteAggregateVote { validator } => {
            ORACLE.delete_aggregate_vote(deps.storage, &validator);
            Ok(Response::new()
                .add_attribute("method", "delete_aggregate_vote")
                .add_attribute("validator", validator))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let binary = match msg {
        QueryMsg::Params {} => to_json_binary(&ORACLE.params(deps.storage)?)?,
        QueryMsg::ExchangeRate { denom } => {
            to_json_binary(&ORACLE.exchange_rate(deps.storage, &denom)?)?
        }
        QueryMsg::ExchangeRates {} => to_json_binary(&query::exchange_rates(deps)?)?,
        QueryMsg::Actives {} => to_json_binary(&query::actives(deps)?)?,
        QueryMsg::VoteTargets {} => to_json_binary(&ORACLE.vote_targets(deps.storage)?)?,
        QueryMsg::PriceSnapshotHistory {} => {
            to_json_binary(&ORACLE.price_snapshots(deps.storage)?)?
        }
        QueryMsg::Twaps { lookback_seconds } => to_json_binary(&ORACLE.calculate_twaps(
            deps.storage,
            env.block.time.seconds(),
            lookback_seconds,
        )?)?,
        QueryMsg::FeederDelegation { validator } => {
            to_json_binary(&query::feeder_delegation(deps, validator)?)?
        }
        QueryMsg::VotePenaltyCounter { validator } => {
            to_json_binary(&ORACLE.vote_penalty_counter(deps.storage, &validator)?)?
        }
        QueryMsg::VotePenaltyCounters {} => {
            to_json_binary(&query::vote_penalty_counters(deps)?)?
        }
        QueryMsg::AggregateVote { validator } => {
            to_json_binary(&ORACLE.aggregate_vote(deps.storage, &validator)?)?
        }
        QueryMsg::AggregateVotes {} => to_json_binary(&ORACLE.aggregate_votes(deps.storage)?)?,
        QueryMsg::SlashWindow {} => to_json_binary(&query::slash_window(deps, env)?)?,
    };
    Ok(binary)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::MigrationMismatch(stored.contract));
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("method", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}

mod execute {
    use cosmwasm_std::Event;

    use crate::staking::{same_account, ChainValidators};

    use super::*;

    pub fn aggregate_exchange_rate_vote(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        exchange_rates: String,
        validator: String,
    ) -> Result<Response, ContractError> {
        nonpayable(&info)?;

        // one vote per validator and block
        let height = env.block.height;
        if ORACLE.last_voted_height(deps.storage, &validator, height)? >= 0 {
            return Err(ContractError::AlreadyVoted { validator, height });
        }

        let validators = ChainValidators::new(deps.querier);
        let vote = ORACLE.submit_vote(
            deps.storage,
            &validators,
            &exchange_rates,
            &validator,
            &info.sender,
        )?;
        ORACLE.mark_voted(deps.storage, &validator, height)?;

        Ok(Response::new()
            .add_attribute("method", "aggregate_exchange_rate_vote")
            .add_event(
                Event::new("aggregate_vote")
                    .add_attribute("voter", vote.voter)
                    .add_attribute("exchange_rates", exchange_rates)
                    .add_attribute("feeder", info.sender),
            ))
    }

    pub fn delegate_feed_consent(
        deps: DepsMut,
        info: MessageInfo,
        operator: String,
        delegate: String,
    ) -> Result<Response, ContractError> {
        nonpayable(&info)?;

        if !same_account(info.sender.as_str(), &operator) {
            return Err(ContractError::Unauthorized);
        }
        let delegate = deps.api.addr_validate(&delegate)?;

        let validators = ChainValidators::new(deps.querier);
        ORACLE.delegate(deps.storage, &validators, &operator, &delegate)?;

        Ok(Response::new()
            .add_attribute("method", "delegate_feed_consent")
            .add_event(
                Event::new("feed_delegate")
                    .add_attribute("operator", operator)
                    .add_attribute("feeder", delegate),
            ))
    }
}

mod sudo {
    use cosmwasm_std::{Decimal, Event};

    use crate::params::Params;
    use crate::state::{PriceSnapshot, VoteOutcome};

    use super::*;

    pub fn update_params(deps: DepsMut, params: Params) -> Result<Response, ContractError> {
        ORACLE.set_params(deps.storage, &params)?;

        Ok(Response::new().add_event(
            Event::new("params_update")
                .add_attribute("vote_period", params.vote_period.to_string())
                .add_attribute("vote_threshold", params.vote_threshold.to_string())
                .add_attribute("slash_window", params.slash_window.to_string())
                .add_attribute("lookback_duration", params.lookback_duration.to_string())
                .add_attribute("vote_targets", params.whitelist.len().to_string()),
        ))
    }

    pub fn set_exchange_rate(
        deps: DepsMut,
        env: Env,
        denom: String,
        exchange_rate: Decimal,
    ) -> Result<Response, ContractError> {
        let timestamp_millis = env.block.time.nanos() / 1_000_000;
        ORACLE.set_exchange_rate(
            deps.storage,
            &denom,
            exchange_rate,
            env.block.height,
            timestamp_millis,
        )?;

        Ok(Response::new().add_event(
            Event::new("exchange_rate_update")
                .add_attribute("denom", denom)
                .add_attribute("exchange_rate", exchange_rate.to_string())
                .add_attribute("height", env.block.height.to_string()),
        ))
    }

    pub fn delete_exchange_rate(deps: DepsMut, denom: String) -> Result<Response, ContractError> {
        ORACLE.delete_exchange_rate(deps.storage, &denom);

        Ok(Response::new()
            .add_attribute("method", "delete_exchange_rate")
            .add_attribute("denom", denom))
    }

    pub fn add_price_snapshot(
        deps: DepsMut,
        env: Env,
        snapshot: PriceSnapshot,
    ) -> Result<Response, ContractError> {
        let pruned = ORACLE.add_price_snapshot(deps.storage, &snapshot, env.block.time.seconds())?;

        Ok(Response::new().add_event(
            Event::new("price_snapshot")
                .add_attribute("timestamp", snapshot.snapshot_timestamp.to_string())
                .add_attribute("items", snapshot.price_snapshot_items.len().to_string())
                .add_attribute("pruned", pruned.len().to_string()),
        ))
    }

    pub fn record_vote_penalty(
        deps: DepsMut,
        validator: String,
        outcome: VoteOutcome,
    ) -> Result<Response, ContractError> {
        let counter = ORACLE.record_vote_outcome(deps.storage, &validator, outcome)?;

        Ok(Response::new().add_event(
            Event::new("vote_penalty")
                .add_attribute("validator", validator)
                .add_attribute("outcome", outcome.as_str())
                .add_attribute("miss_count", counter.miss_count.to_string())
                .add_attribute("abstain_count", counter.abstain_count.to_string())
                .add_attribute("success_count", counter.success_count.to_string()),
        ))
    }
}

mod query {
    use crate::msg::{
        DenomOracleExchangeRate, FeederDelegationResponse, SlashWindowResponse,
        ValidatorVotePenaltyCounter,
    };

    use super::*;

    pub fn exchange_rates(deps: Deps) -> Result<Vec<DenomOracleExchangeRate>, ContractError> {
        let rates = ORACLE
            .exchange_rates(deps.storage)?
            .into_iter()
            .map(|(denom, oracle_exchange_rate)| DenomOracleExchangeRate {
                denom,
                oracle_exchange_rate,
            })
            .collect();
        Ok(rates)
    }

    pub fn actives(deps: Deps) -> Result<Vec<String>, ContractError> {
        let denoms = ORACLE
            .exchange_rates(deps.storage)?
            .into_iter()
            .map(|(denom, _)| denom)
            .collect();
        Ok(denoms)
    }

    pub fn feeder_delegation(
        deps: Deps,
        validator: String,
    ) -> Result<FeederDelegationResponse, ContractError> {
        let feeder = ORACLE.feeder_delegation(deps.storage, &validator)?;
        Ok(FeederDelegationResponse { feeder })
    }

    pub fn vote_penalty_counters(
        deps: Deps,
    ) -> Result<Vec<ValidatorVotePenaltyCounter>, ContractError> {
        let counters = ORACLE
            .vote_penalty_counters(deps.storage)?
            .into_iter()
            .map(|(validator, vote_penalty_counter)| ValidatorVotePenaltyCounter {
                validator,
                vote_penalty_counter,
            })
            .collect();
        Ok(counters)
    }

    pub fn slash_window(deps: Deps, env: Env) -> Result<SlashWindowResponse, ContractError> {
        let window_progress = ORACLE.slash_window_progress(deps.storage, env.block.height)?;
        Ok(SlashWindowResponse { window_progress })
    }
}
