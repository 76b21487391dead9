pub mod contract;
mod error;
pub mod keeper;
pub mod msg;
pub mod params;
pub mod staking;
pub mod state;
pub mod twap;
pub mod vote;

#[cfg(test)]
mod tests;

pub use crate::error::ContractError;
