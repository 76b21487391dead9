use std::str::FromStr;

use cosmwasm_std::testing::{
    message_info, mock_dependencies, mock_env, MockApi, MockQuerier, MockStorage,
};
use cosmwasm_std::{
    from_json, Addr, Decimal, Empty, Env, OwnedDeps, Response, StdResult, Timestamp, Validator,
};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use serde::de::DeserializeOwned;

use crate::contract::{execute, instantiate, migrate, query, sudo};
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg, SudoMsg};
use crate::params::Params;
use crate::state::{OracleExchangeRate, PriceSnapshot, PriceSnapshotItem};
use crate::ContractError;

pub const STAKING_DENOM: &str = "ustake";

/// Operator address of the validator named `name`. Its bytes match those of the account
/// `addr_make(name)` on the default mock prefix.
pub fn operator(name: &str) -> Addr {
    MockApi::default().with_prefix("cosmwasmvaloper").addr_make(name)
}

pub type MockDeps = OwnedDeps<MockStorage, MockApi, MockQuerier, Empty>;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn validator(address: &Addr) -> Validator {
    Validator::create(
        address.to_string(),
        Decimal::percent(5),
        Decimal::percent(20),
        Decimal::percent(1),
    )
}

pub fn env_at(height: u64, seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.height = height;
    env.block.time = Timestamp::from_seconds(seconds);
    env
}

pub fn snapshot(timestamp: u64, rates: &[(&str, &str)]) -> PriceSnapshot {
    PriceSnapshot {
        snapshot_timestamp: timestamp,
        price_snapshot_items: rates
            .iter()
            .map(|(denom, rate)| PriceSnapshotItem {
                denom: denom.to_string(),
                oracle_exchange_rate: OracleExchangeRate {
                    exchange_rate: dec(rate),
                    last_update: 0,
                    last_update_timestamp: timestamp * 1000,
                },
            })
            .collect(),
    }
}

/// Oracle instantiated with `params` on mock dependencies, with `bonded` in the active set.
pub fn setup(params: Option<Params>, bonded: &[&str]) -> (MockDeps, Vec<Addr>) {
    let mut deps = mock_dependencies();
    let validators: Vec<Addr> = bonded.iter().map(|name| operator(name)).collect();
    deps.querier.staking = cosmwasm_std::testing::StakingQuerier::new(
        STAKING_DENOM,
        &validators.iter().map(validator).collect::<Vec<_>>(),
        &[],
    );

    let creator = deps.api.addr_make("creator");
    instantiate(
        deps.as_mut(),
        mock_env(),
        message_info(&creator, &[]),
        InstantiateMsg { params },
    )
    .unwrap();

    (deps, validators)
}

pub fn vote(
    deps: &mut MockDeps,
    env: Env,
    feeder: &Addr,
    validator: &Addr,
    exchange_rates: &str,
) -> Result<Response, ContractError> {
    execute(
        deps.as_mut(),
        env,
        message_info(feeder, &[]),
        ExecuteMsg::AggregateExchangeRateVote {
            exchange_rates: exchange_rates.to_string(),
            validator: validator.to_string(),
        },
    )
}

pub fn run_sudo(deps: &mut MockDeps, env: Env, msg: SudoMsg) -> Result<Response, ContractError> {
    sudo(deps.as_mut(), env, msg)
}

pub fn query_at<T: DeserializeOwned>(
    deps: &MockDeps,
    env: Env,
    msg: QueryMsg,
) -> Result<T, ContractError> {
    let binary = query(deps.as_ref(), env, msg)?;
    Ok(from_json(binary)?)
}

pub fn oracle_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(execute, instantiate, query)
        .with_sudo(sudo)
        .with_migrate(migrate);
    Box::new(contract)
}

/// The oracle deployed on a multi-test chain whose staking module knows `bonded`.
pub struct Suite {
    pub app: App,
    pub oracle: Addr,
    pub validators: Vec<Addr>,
}

impl Suite {
    pub fn new(params: Option<Params>, bonded: &[&str]) -> Self {
        let mut app = App::default();
        let validators: Vec<Addr> = bonded.iter().map(|name| operator(name)).collect();

        let block = app.block_info();
        app.init_modules(|router, api, storage| {
            for addr in &validators {
                router
                    .staking
                    .add_validator(api, storage, &block, validator(addr))
                    .unwrap();
            }
        });

        let code_id = app.store_code(oracle_contract());
        let creator = app.api().addr_make("creator");
        let oracle = app
            .instantiate_contract(
                code_id,
                creator,
                &InstantiateMsg { params },
                &[],
                "price-oracle",
                None,
            )
            .unwrap();

        Self {
            app,
            oracle,
            validators,
        }
    }

    pub fn addr(&self, name: &str) -> Addr {
        self.app.api().addr_make(name)
    }

    pub fn vote(
        &mut self,
        feeder: &Addr,
        validator: &Addr,
        exchange_rates: &str,
    ) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            feeder.clone(),
            self.oracle.clone(),
            &ExecuteMsg::AggregateExchangeRateVote {
                exchange_rates: exchange_rates.to_string(),
                validator: validator.to_string(),
            },
            &[],
        )
    }

    pub fn delegate(&mut self, operator: &Addr, delegate: &Addr) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            operator.clone(),
            self.oracle.clone(),
            &ExecuteMsg::DelegateFeedConsent {
                operator: operator.to_string(),
                delegate: delegate.to_string(),
            },
            &[],
        )
    }

    pub fn sudo(&mut self, msg: SudoMsg) -> anyhow::Result<AppResponse> {
        self.app.wasm_sudo(self.oracle.clone(), &msg)
    }

    pub fn query<T: DeserializeOwned>(&self, msg: &QueryMsg) -> StdResult<T> {
        self.app.wrap().query_wasm_smart(self.oracle.clone(), msg)
    }

    /// Advances one block, five seconds later.
    pub fn next_block(&mut self) {
        self.app.update_block(cw_multi_test::next_block);
    }

    pub fn block_seconds(&self) -> u64 {
        self.app.block_info().time.seconds()
    }
}
