//! Conversions between ticks and Q64.96 square-root prices.
//!
//! `sqrt(1.0001^tick) * 2^96`, computed with the same bit-decomposition
//! constants as the pool contract so that results agree to the last bit.

use crate::error::DomainError;
use primitive_types::U256;

/// Lowest tick whose price fits in a Q64.96 sqrt price.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick whose price fits in a Q64.96 sqrt price.
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256([4_295_128_739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 = U256([0x5d951d5263988d26, 0xefd1fc6a50648849, 0xfffd8963, 0]);

/// `2^128 / sqrt(1.0001^(2^i))` for every bit of |tick| above bit 0.
const RATIO_FACTORS: [U256; 19] = [
    U256([0x59a46990580e213a, 0xfff97272373d4132, 0, 0]),
    U256([0xef12357cf3c7fdcc, 0xfff2e50f5f656932, 0, 0]),
    U256([0x1c3624eaa0941cd0, 0xffe5caca7e10e4e6, 0, 0]),
    U256([0xc9db58835c926644, 0xffcb9843d60f6159, 0, 0]),
    U256([0x472e6896dfb254c0, 0xff973b41fa98c081, 0, 0]),
    U256([0x43ec78b326b52861, 0xff2ea16466c96a38, 0, 0]),
    U256([0x11c461f1969c3053, 0xfe5dee046a99a2a8, 0, 0]),
    U256([0xdcffc83b479aa3a4, 0xfcbe86c7900a88ae, 0, 0]),
    U256([0x6f2b074cf7815e54, 0xf987a7253ac41317, 0, 0]),
    U256([0x940c7a398e4b70f3, 0xf3392b0822b70005, 0, 0]),
    U256([0x43b29c7fa6e889d9, 0xe7159475a2c29b74, 0, 0]),
    U256([0x845ad8f792aa5825, 0xd097f3bdfd2022b8, 0, 0]),
    U256([0x8a65dc1f90e061e5, 0xa9f746462d870fdf, 0, 0]),
    U256([0x90bb3df62baf32f7, 0x70d869a156d2a1b8, 0, 0]),
    U256([0x81231505542fcfa6, 0x31be135f97d08fd9, 0, 0]),
    U256([0xc677de54f3e99bc9, 0x09aa508b5b7a84e1, 0, 0]),
    U256([0x6699c329225ee604, 0x005d6af8dedb8119, 0, 0]),
    U256([0x1ea926041bedfe98, 0x00002216e584f5fa, 0, 0]),
    U256([0x91f7dc42444e8fa2, 0x00000000048a1703, 0, 0]),
];

const ODD_TICK_FACTOR: U256 = U256([0xaa2d162d1a594001, 0xfffcb933bd6fad37, 0, 0]);

/// Returns `sqrt(1.0001^tick) * 2^96`.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, DomainError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK as u32 {
        return Err(DomainError::TickOutOfRange(tick));
    }

    let mut ratio = if abs_tick & 0x1 != 0 {
        ODD_TICK_FACTOR
    } else {
        U256::one() << 128
    };
    for (bit, factor) in RATIO_FACTORS.iter().enumerate() {
        if abs_tick & (0x2 << bit) != 0 {
            ratio = ratio.overflowing_mul(*factor).0 >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 to Q64.96, rounding up so the result never understates the tick
    let remainder = ratio & U256::from(u32::MAX);
    let round_up = if remainder.is_zero() {
        U256::zero()
    } else {
        U256::one()
    };
    Ok((ratio >> 32) + round_up)
}

/// Returns the greatest tick whose sqrt ratio is `<= sqrt_price_x96`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, DomainError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(DomainError::SqrtPriceOutOfRange);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

/// Lowest tick usable with the given spacing.
pub fn min_usable_tick(tick_spacing: i32) -> i32 {
    (MIN_TICK / tick_spacing) * tick_spacing
}

/// Highest tick usable with the given spacing.
pub fn max_usable_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

/// Liquidity cap per initialized tick so that the sum over all ticks fits in `u128`.
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = min_usable_tick(tick_spacing);
    let max_tick = max_usable_tick(tick_spacing);
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::q96;

    #[test]
    fn test_bounds() {
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert_eq!(
            MAX_SQRT_RATIO,
            U256::from_dec_str("1461446703485210103287273052203988822378723970342").unwrap()
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(MIN_TICK - 1),
            Err(DomainError::TickOutOfRange(MIN_TICK - 1))
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(DomainError::TickOutOfRange(MAX_TICK + 1))
        );
    }

    #[test]
    fn test_tick_zero_is_price_one() {
        assert_eq!(get_sqrt_ratio_at_tick(0).unwrap(), q96());
        assert_eq!(get_tick_at_sqrt_ratio(q96()).unwrap(), 0);
    }

    #[test]
    fn test_usable_ticks() {
        assert_eq!(min_usable_tick(60), -887_220);
        assert_eq!(max_usable_tick(60), 887_220);
        assert_eq!(min_usable_tick(200), -887_200);
        assert_eq!(
            get_sqrt_ratio_at_tick(-887_220).unwrap(),
            U256::from(4_306_310_044u64)
        );
    }

    #[test]
    fn test_tick_round_trip() {
        for tick in [MIN_TICK + 1, -200_000, -60, -1, 1, 60, 6931, 200_000, MAX_TICK - 1] {
            let ratio = get_sqrt_ratio_at_tick(tick).unwrap();
            assert_eq!(get_tick_at_sqrt_ratio(ratio).unwrap(), tick);
            assert_eq!(get_tick_at_sqrt_ratio(ratio + U256::one()).unwrap(), tick);
            assert_eq!(get_tick_at_sqrt_ratio(ratio - U256::one()).unwrap(), tick - 1);
        }
    }

    #[test]
    fn test_tick_at_ratio_out_of_range() {
        assert_eq!(
            get_tick_at_sqrt_ratio(MIN_SQRT_RATIO - U256::one()),
            Err(DomainError::SqrtPriceOutOfRange)
        );
        assert_eq!(
            get_tick_at_sqrt_ratio(MAX_SQRT_RATIO),
            Err(DomainError::SqrtPriceOutOfRange)
        );
    }
}
