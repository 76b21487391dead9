//! Time-weighted average prices over the retained price snapshots.
//!
//! Every snapshot holds its prices from its own timestamp until the next (newer)
//! snapshot, or until "now" for the most recent one. Walking the history from the
//! newest snapshot backwards, each denom accumulates `rate * seconds held`, and the
//! first snapshot older than the window start is only counted up to that start.

use std::collections::{BTreeMap, BTreeSet};

use cosmwasm_std::{Decimal, Decimal256, StdResult, Uint64};
use itertools::Itertools;

use crate::state::{OracleTwap, PriceSnapshot};
use crate::ContractError;

// `rate * seconds` can exceed the range of `Decimal`, the average cannot
#[derive(Default)]
struct DenomAccumulator {
    weighted_sum: Decimal256,
    duration: Uint64,
}

/// Computes the TWAP of every target denom seen in `snapshots`.
///
/// `snapshots` must yield snapshots newest first. Iteration stops right after the
/// first snapshot that lies before `current_time - lookback_seconds`, so older
/// history is never read. Snapshots stamped after `current_time` are ignored.
///
/// The result is sorted by denom. [`ContractError::NoTwapData`] is returned when no
/// target denom was observed.
pub fn calculate_twaps<I>(
    snapshots: I,
    targets: &BTreeSet<String>,
    current_time: u64,
    lookback_seconds: u64,
) -> Result<Vec<OracleTwap>, ContractError>
where
    I: IntoIterator<Item = StdResult<PriceSnapshot>>,
{
    // None when the window reaches before the epoch, every snapshot is then inside it
    let window_start = current_time.checked_sub(lookback_seconds);
    let in_window = |timestamp: u64| window_start.map_or(true, |start| timestamp >= start);

    let mut accumulators: BTreeMap<String, DenomAccumulator> = BTreeMap::new();

    let relevant = snapshots.into_iter().take_while_inclusive(|snapshot| {
        snapshot
            .as_ref()
            .is_ok_and(|snapshot| in_window(snapshot.snapshot_timestamp))
    });

    for snapshot in relevant {
        let snapshot = snapshot?;
        if snapshot.snapshot_timestamp > current_time {
            continue;
        }

        let time_traversed = if in_window(snapshot.snapshot_timestamp) {
            Uint64::new(current_time - snapshot.snapshot_timestamp)
        } else {
            // clipped to the window start
            Uint64::new(lookback_seconds)
        };

        for item in snapshot.price_snapshot_items {
            if !targets.contains(&item.denom) {
                continue;
            }

            let acc = accumulators.entry(item.denom).or_default();
            let delta = time_traversed.checked_sub(acc.duration)?;
            let weighted = Decimal256::from(item.oracle_exchange_rate.exchange_rate)
                .checked_mul(Decimal256::from_ratio(delta, 1u64))?;
            acc.weighted_sum = acc.weighted_sum.checked_add(weighted)?;
            acc.duration = time_traversed;
        }
    }

    if accumulators.is_empty() {
        return Err(ContractError::NoTwapData);
    }

    accumulators
        .into_iter()
        .map(|(denom, acc)| {
            let twap = if acc.duration.is_zero() {
                Decimal::zero()
            } else {
                let average = acc
                    .weighted_sum
                    .checked_div(Decimal256::from_ratio(acc.duration, 1u64))?;
                Decimal::try_from(average)?
            };
            Ok(OracleTwap {
                denom,
                twap,
                lookback_seconds: acc.duration.u64(),
            })
        })
        .collect()
}
