use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use cosmwasm_std::Decimal;

use crate::state::{AggregateExchangeRateVote, ExchangeRateTuple};
use crate::ContractError;

const MIN_DENOM_LEN: usize = 3;
const MAX_DENOM_LEN: usize = 128;

impl ExchangeRateTuple {
    pub fn new(denom: impl Into<String>, exchange_rate: Decimal) -> Self {
        Self {
            denom: denom.into(),
            exchange_rate,
        }
    }
}

impl fmt::Display for ExchangeRateTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.denom, self.exchange_rate)
    }
}

/// Accepts `<denom>:<amount>` (`BTC:1.5`) as well as the dec-coin form
/// `<amount><denom>` (`1.5uatom`).
impl FromStr for ExchangeRateTuple {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segment = s.trim();
        let invalid = || ContractError::InvalidCoins(segment.to_string());

        let (denom, amount) = if segment.starts_with(|c: char| c.is_ascii_digit()) {
            let split = segment
                .find(|c: char| c.is_ascii_alphabetic())
                .ok_or_else(invalid)?;
            let (amount, denom) = segment.split_at(split);
            (denom, amount)
        } else {
            segment.rsplit_once(':').ok_or_else(invalid)?
        };

        let denom = denom.trim();
        if !is_valid_denom(denom) {
            return Err(invalid());
        }
        let exchange_rate = Decimal::from_str(amount.trim()).map_err(|_| invalid())?;

        Ok(ExchangeRateTuple::new(denom, exchange_rate))
    }
}

fn is_valid_denom(denom: &str) -> bool {
    let mut chars = denom.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

    starts_with_letter
        && (MIN_DENOM_LEN..=MAX_DENOM_LEN).contains(&denom.len())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
}

/// Parses a comma separated list of rates, rejecting the whole list on the first
/// bad or repeated entry.
pub fn parse_exchange_rate_tuples(raw: &str) -> Result<Vec<ExchangeRateTuple>, ContractError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(vec![]);
    }

    let mut seen = BTreeSet::new();
    raw.split(',')
        .map(|segment| {
            let tuple: ExchangeRateTuple = segment.parse()?;
            if !seen.insert(tuple.denom.clone()) {
                return Err(ContractError::DuplicateDenom(tuple.denom));
            }
            Ok(tuple)
        })
        .collect()
}

impl AggregateExchangeRateVote {
    pub fn new(voter: impl Into<String>, exchange_rate_tuples: Vec<ExchangeRateTuple>) -> Self {
        Self {
            voter: voter.into(),
            exchange_rate_tuples,
        }
    }
}
