use cosmwasm_std::Event;

use super::common::*;
use crate::msg::{FeederDelegationResponse, QueryMsg, SudoMsg};
use crate::params::Params;
use crate::state::{
    AggregateExchangeRateVote, OracleExchangeRate, OracleTwap, VoteOutcome, VotePenaltyCounter,
};
use crate::ContractError;

#[test]
fn vote_period_happy_path() {
    let mut suite = Suite::new(None, &["val1", "val2", "val3"]);
    let validators = suite.validators.clone();
    let feeder = suite.addr("feeder3");

    // val3 votes through a feeder account
    suite.delegate(&validators[2], &feeder).unwrap();
    let delegation: FeederDelegationResponse = suite
        .query(&QueryMsg::FeederDelegation {
            validator: validators[2].to_string(),
        })
        .unwrap();
    assert_eq!(delegation.feeder, feeder.to_string());

    // validators sign with their account keys
    let (account1, account2) = (suite.addr("val1"), suite.addr("val2"));
    suite.vote(&account1, &validators[0], "ukii:1.0,uatom:10").unwrap();
    suite.vote(&account2, &validators[1], "1.1ukii,10.5uatom").unwrap();
    let res = suite.vote(&feeder, &validators[2], "ukii:0.9").unwrap();
    assert!(res.has_event(
        &Event::new("wasm-aggregate_vote")
            .add_attribute("voter", validators[2].to_string())
            .add_attribute("feeder", feeder.to_string())
    ));

    let votes: Vec<AggregateExchangeRateVote> =
        suite.query(&QueryMsg::AggregateVotes {}).unwrap();
    assert_eq!(votes.len(), 3);

    // the chain tallies at the end of the period
    suite.next_block();
    let height = suite.app.block_info().height;
    let now = suite.block_seconds();
    for (denom, rate) in [("ukii", "1"), ("uatom", "10")] {
        suite
            .sudo(SudoMsg::SetExchangeRate {
                denom: denom.to_string(),
                exchange_rate: dec(rate),
            })
            .unwrap();
    }
    suite
        .sudo(SudoMsg::AddPriceSnapshot {
            snapshot: snapshot(now, &[("ukii", "1"), ("uatom", "10")]),
        })
        .unwrap();
    for (validator, outcome) in [
        (&validators[0], VoteOutcome::Success),
        (&validators[1], VoteOutcome::Success),
        (&validators[2], VoteOutcome::Miss),
    ] {
        suite
            .sudo(SudoMsg::RecordVotePenalty {
                validator: validator.to_string(),
                outcome,
            })
            .unwrap();
        suite
            .sudo(SudoMsg::DeleteAggregateVote {
                validator: validator.to_string(),
            })
            .unwrap();
    }

    let rate: OracleExchangeRate = suite
        .query(&QueryMsg::ExchangeRate {
            denom: "ukii".to_string(),
        })
        .unwrap();
    assert_eq!(rate.exchange_rate, dec("1"));
    assert_eq!(rate.last_update, height);
    assert_eq!(rate.last_update_timestamp / 1000, now);

    let actives: Vec<String> = suite.query(&QueryMsg::Actives {}).unwrap();
    assert_eq!(actives, vec!["uatom", "ukii"]);

    let votes: Vec<AggregateExchangeRateVote> =
        suite.query(&QueryMsg::AggregateVotes {}).unwrap();
    assert!(votes.is_empty());

    let counter: VotePenaltyCounter = suite
        .query(&QueryMsg::VotePenaltyCounter {
            validator: validators[2].to_string(),
        })
        .unwrap();
    assert_eq!(counter.miss_count, 1);
    assert_eq!(counter.success_count, 0);
}

#[test]
fn second_vote_in_block_is_rejected() {
    let mut suite = Suite::new(None, &["val1"]);
    let val1 = suite.validators[0].clone();

    suite.vote(&val1, &val1, "ukii:1").unwrap();
    let err = suite.vote(&val1, &val1, "ukii:2").unwrap_err();
    assert_eq!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::AlreadyVoted {
            validator: val1.to_string(),
            height: suite.app.block_info().height,
        }
    );

    suite.next_block();
    suite.vote(&val1, &val1, "ukii:2").unwrap();
}

#[test]
fn accounts_outside_the_active_set_cannot_vote() {
    let mut suite = Suite::new(None, &["val1"]);
    let val1 = suite.validators[0].clone();
    let outsider = suite.addr("outsider");

    let err = suite.vote(&outsider, &outsider, "ukii:1").unwrap_err();
    assert_eq!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::NoValidatorFound(outsider.to_string())
    );

    let err = suite.vote(&outsider, &val1, "ukii:1").unwrap_err();
    assert_eq!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::NoVotingPermission(outsider.to_string())
    );

    let err = suite.delegate(&outsider, &val1).unwrap_err();
    assert_eq!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::NoValidatorFound(outsider.to_string())
    );
}

#[test]
fn twaps_follow_block_time() {
    let params = Params {
        lookback_duration: 60,
        ..Params::default()
    };
    let mut suite = Suite::new(Some(params), &[]);
    let start = suite.block_seconds();

    suite
        .sudo(SudoMsg::AddPriceSnapshot {
            snapshot: snapshot(start, &[("ukii", "10")]),
        })
        .unwrap();
    suite.next_block();
    suite.next_block();
    suite
        .sudo(SudoMsg::AddPriceSnapshot {
            snapshot: snapshot(start + 10, &[("ukii", "20")]),
        })
        .unwrap();
    suite.next_block();
    suite.next_block();

    // 20 held for 10s, 10 held for 10s
    let twaps: Vec<OracleTwap> = suite
        .query(&QueryMsg::Twaps {
            lookback_seconds: 20,
        })
        .unwrap();
    assert_eq!(
        twaps,
        vec![OracleTwap {
            denom: "ukii".to_string(),
            twap: dec("15"),
            lookback_seconds: 20,
        }]
    );

    let err = suite
        .query::<Vec<OracleTwap>>(&QueryMsg::Twaps {
            lookback_seconds: 61,
        })
        .unwrap_err();
    assert!(err.to_string().contains("Invalid TWAP lookback"));
}

#[test]
fn governance_updates_params() {
    let mut suite = Suite::new(None, &[]);

    let params = Params {
        vote_period: 5,
        slash_window: 50,
        ..Params::default()
    };
    let res = suite
        .sudo(SudoMsg::UpdateParams {
            params: params.clone(),
        })
        .unwrap();
    assert!(res.has_event(&Event::new("wasm-params_update").add_attribute("vote_period", "5")));

    let stored: Params = suite.query(&QueryMsg::Params {}).unwrap();
    assert_eq!(stored, params);

    let err = suite
        .sudo(SudoMsg::UpdateParams {
            params: Params {
                slash_window: 7,
                ..params
            },
        })
        .unwrap_err();
    assert!(matches!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::InvalidParams(_)
    ));
}
