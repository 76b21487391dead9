use cosmwasm_std::{QuerierWrapper, StdResult};

/// Read access to the chain's validator registry.
pub trait ValidatorSet {
    /// Whether `operator` is a registered validator, bonded or not.
    fn is_validator(&self, operator: &str) -> StdResult<bool>;

    /// Whether `operator` is currently in the bonded (active) set.
    fn is_bonded(&self, operator: &str) -> StdResult<bool>;
}

/// Validator registry backed by the chain's staking module.
///
/// The staking query only reports validators of the active set, so a validator
/// that is known but unbonded is indistinguishable from an unknown address here.
pub struct ChainValidators<'a> {
    querier: QuerierWrapper<'a>,
}

impl<'a> ChainValidators<'a> {
    pub fn new(querier: QuerierWrapper<'a>) -> Self {
        Self { querier }
    }
}

/// Whether the account `account` and the validator operator `operator` belong to the
/// same key. Bech32 addresses are compared by their data bytes, so `kii1...` and
/// `kiivaloper1...` derived from one key match. Anything else compares as text.
pub fn same_account(account: &str, operator: &str) -> bool {
    match (bech32::decode(account), bech32::decode(operator)) {
        (Ok((_, account_bytes)), Ok((_, operator_bytes))) => account_bytes == operator_bytes,
        _ => account == operator,
    }
}

impl ValidatorSet for ChainValidators<'_> {
    fn is_validator(&self, operator: &str) -> StdResult<bool> {
        self.is_bonded(operator)
    }

    fn is_bonded(&self, operator: &str) -> StdResult<bool> {
        Ok(self.querier.query_validator(operator)?.is_some())
    }
}
