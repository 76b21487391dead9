use cosmwasm_schema::cw_serde;
use cosmwasm_std::Decimal;

use crate::state::Denom;
use crate::ContractError;

pub const BLOCKS_PER_MINUTE: u64 = 75;
pub const BLOCKS_PER_DAY: u64 = BLOCKS_PER_MINUTE * 24;

pub const DEFAULT_VOTE_PERIOD: u64 = 2;
pub const DEFAULT_SLASH_WINDOW: u64 = BLOCKS_PER_DAY * 2;
pub const DEFAULT_LOOKBACK_DURATION: u64 = 3600;
pub const DEFAULT_WHITELIST: [&str; 4] = ["uatom", "ueth", "ukii", "uusdc"];

#[cw_serde]
pub struct Params {
    /// Number of blocks between two votes
    pub vote_period: u64,
    /// Share of voting power a rate needs to be accepted
    pub vote_threshold: Decimal,
    pub reward_band: Decimal,
    pub whitelist: Vec<Denom>,
    pub slash_fraction: Decimal,
    /// Number of blocks over which compliance is evaluated
    pub slash_window: u64,
    pub min_valid_per_window: Decimal,
    /// How long price snapshots are retained, in seconds
    pub lookback_duration: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            vote_period: DEFAULT_VOTE_PERIOD,
            vote_threshold: Decimal::permille(667),
            reward_band: Decimal::percent(2),
            whitelist: DEFAULT_WHITELIST.into_iter().map(Denom::new).collect(),
            slash_fraction: Decimal::zero(),
            slash_window: DEFAULT_SLASH_WINDOW,
            min_valid_per_window: Decimal::percent(5),
            lookback_duration: DEFAULT_LOOKBACK_DURATION,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.vote_period == 0 {
            return Err(ContractError::InvalidParams(
                "vote_period must be positive".to_string(),
            ));
        }

        // strictly above a third
        if self.vote_threshold <= Decimal::from_ratio(1u64, 3u64)
            || self.vote_threshold > Decimal::one()
        {
            return Err(ContractError::InvalidVoteThreshold(self.vote_threshold));
        }

        let fractions = [
            ("reward_band", &self.reward_band),
            ("slash_fraction", &self.slash_fraction),
            ("min_valid_per_window", &self.min_valid_per_window),
        ];
        for (field_name, value) in fractions.into_iter() {
            if value > &Decimal::one() {
                return Err(ContractError::InvalidFraction(field_name.to_string(), *value));
            }
        }

        if self.slash_window < self.vote_period {
            return Err(ContractError::InvalidParams(
                "slash_window must be greater than or equal to vote_period".to_string(),
            ));
        }
        if self.slash_window % self.vote_period != 0 {
            return Err(ContractError::InvalidParams(
                "slash_window must be divisible by vote_period".to_string(),
            ));
        }

        if self.lookback_duration == 0 {
            return Err(ContractError::InvalidParams(
                "lookback_duration must be positive".to_string(),
            ));
        }

        if self.whitelist.iter().any(|denom| denom.name.is_empty()) {
            return Err(ContractError::InvalidParams(
                "whitelist denoms must have a name".to_string(),
            ));
        }

        Ok(())
    }
}
