//! Next-block base fee prediction
//!
//! Replicates the EIP-1559 base fee adjustment so the prediction matches
//! what the network itself will compute for the block after the snapshot.

use crate::chain::BlockFeeSnapshot;

use ethers::types::U256;

/// EIP-1559 base fee max change denominator
const BASE_FEE_CHANGE_DENOMINATOR: u64 = 8;

/// Scale factor applied around the adjustment division so the intermediate
/// quotients keep three extra decimal digits of precision
const PRECISION: u64 = 1000;

/// Predict the base fee of the block following `snapshot`.
///
/// Returns zero when the snapshot carries no base fee (the fee mechanism is
/// not active on this chain or fork) or when the block is structurally
/// unusable; callers must treat zero as "no prediction", never as a fee.
///
/// All arithmetic is integer-only, flooring at each division in a fixed
/// order, so the result is deterministic for a given snapshot.
pub fn predict_next_base_fee(snapshot: &BlockFeeSnapshot) -> U256 {
    let base_fee = match snapshot.base_fee_per_gas {
        Some(base_fee) => base_fee,
        None => return U256::zero(),
    };

    let target = snapshot.gas_limit / 2;
    if target.is_zero() {
        // A zero gas limit cannot occur on a live chain; treat the block as
        // unusable rather than divide by zero.
        return U256::zero();
    }

    let scale = U256::from(PRECISION);
    let denominator = U256::from(BASE_FEE_CHANGE_DENOMINATOR);

    if snapshot.gas_used > target {
        let diff = snapshot.gas_used - target;
        base_fee + base_fee * scale / denominator * diff / target / scale
    } else {
        let diff = target - snapshot.gas_used;
        base_fee - base_fee * scale / denominator * diff / target / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(gas_limit: u64, gas_used: u64, base_fee: Option<u64>) -> BlockFeeSnapshot {
        BlockFeeSnapshot {
            gas_limit: U256::from(gas_limit),
            gas_used: U256::from(gas_used),
            base_fee_per_gas: base_fee.map(U256::from),
        }
    }

    #[test]
    fn prediction_is_deterministic_and_floors_each_step() {
        // target = 15M, diff = 5M:
        // 100 * 1000 / 8 = 12_500; * 5M / 15M = 4_166; / 1000 = 4
        let s = snapshot(30_000_000, 20_000_000, Some(100));
        assert_eq!(predict_next_base_fee(&s), U256::from(104u64));
        assert_eq!(predict_next_base_fee(&s), U256::from(104u64));
    }

    #[test]
    fn full_block_raises_by_an_eighth() {
        let base = 20_000_000_000u64; // 20 gwei
        let s = snapshot(30_000_000, 30_000_000, Some(base));
        assert_eq!(
            predict_next_base_fee(&s),
            U256::from(base + base / 8)
        );
    }

    #[test]
    fn empty_block_lowers_by_an_eighth() {
        let base = 20_000_000_000u64;
        let s = snapshot(30_000_000, 0, Some(base));
        assert_eq!(
            predict_next_base_fee(&s),
            U256::from(base - base / 8)
        );
    }

    #[test]
    fn prediction_at_target_is_unchanged() {
        for (gas_limit, base_fee) in [
            (30_000_000u64, 100u64),
            (15_000_000, 7_432_111_907),
            (8_000_000, 1),
        ] {
            let s = snapshot(gas_limit, gas_limit / 2, Some(base_fee));
            assert_eq!(
                predict_next_base_fee(&s),
                U256::from(base_fee),
                "gas_limit={gas_limit} base_fee={base_fee}"
            );
        }
    }

    #[test]
    fn moderately_over_target_raises_proportionally() {
        // target = 15M, diff = 10M:
        // 20e9 * 1000 / 8 = 2.5e12; * 10M / 15M = 1_666_666_666_666; / 1000
        let s = snapshot(30_000_000, 25_000_000, Some(20_000_000_000));
        assert_eq!(
            predict_next_base_fee(&s),
            U256::from(20_000_000_000u64 + 1_666_666_666)
        );
    }

    #[test]
    fn missing_base_fee_predicts_zero() {
        let s = snapshot(30_000_000, 20_000_000, None);
        assert_eq!(predict_next_base_fee(&s), U256::zero());
    }

    #[test]
    fn zero_gas_limit_predicts_zero() {
        let s = snapshot(0, 0, Some(100));
        assert_eq!(predict_next_base_fee(&s), U256::zero());
    }
}
