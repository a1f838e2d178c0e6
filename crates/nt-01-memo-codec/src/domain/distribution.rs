//! # Amount Distribution
//!
//! How a message's token amount is attached to its chunk transactions.

use serde::{Deserialize, Serialize};
use shared_types::TokenAmount;

use super::errors::CodecError;

/// Per-chunk amount policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionPolicy {
    /// Equal share per chunk; the rounding remainder rides on the last chunk.
    #[default]
    EvenSplit,
    /// Memo-only chunks, with the whole amount on the final chunk.
    LastChunkOnly,
    /// Every chunk declares the whole amount. Downstream accounting must
    /// count it once per message, not once per transaction.
    FullAmountEach,
}

/// Amounts for `chunk_count` chunks carrying `total` under `policy`.
///
/// Under [`DistributionPolicy::EvenSplit`] every share but the last is a
/// multiple of `min_unit`; the last takes whatever remains, so it is only a
/// multiple too when `total` is. Zero entries only appear under
/// [`DistributionPolicy::LastChunkOnly`], where they mark memo-only
/// transactions.
///
/// # Errors
///
/// - `InvalidChunkCount` if `chunk_count == 0`
/// - `AmountBelowMinimum` if `total` or an even-split share falls below `min_unit`
pub fn distribute_amount(
    total: TokenAmount,
    chunk_count: usize,
    policy: DistributionPolicy,
    min_unit: TokenAmount,
) -> Result<Vec<TokenAmount>, CodecError> {
    if chunk_count == 0 {
        return Err(CodecError::InvalidChunkCount);
    }
    let below_minimum = || CodecError::AmountBelowMinimum {
        total,
        chunk_count,
        minimum: min_unit,
    };
    if total < min_unit || total.is_zero() {
        return Err(below_minimum());
    }

    match policy {
        DistributionPolicy::EvenSplit => {
            let unit = min_unit.base_units().max(1);
            let count = chunk_count as u64;
            let share = total.base_units() / count / unit * unit;
            if share == 0 {
                return Err(below_minimum());
            }
            let head = share
                .checked_mul(count - 1)
                .ok_or(CodecError::AmountOverflow(total))?;
            let last = TokenAmount::from_base_units(total.base_units() - head);

            let mut amounts = vec![TokenAmount::from_base_units(share); chunk_count - 1];
            amounts.push(last);
            Ok(amounts)
        }
        DistributionPolicy::LastChunkOnly => {
            let mut amounts = vec![TokenAmount::ZERO; chunk_count - 1];
            amounts.push(total);
            Ok(amounts)
        }
        DistributionPolicy::FullAmountEach => Ok(vec![total; chunk_count]),
    }
}
