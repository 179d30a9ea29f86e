//! Pool creation helper shared by the position manager and the migrator.

use crate::error::PeripheryError;
use periphery_domain::fees::FeeAmount;
use periphery_domain::pool::PoolKey;
use periphery_domain::token::Address;
use periphery_simulation::world::World;
use primitive_types::U256;
use tracing::info;

/// Creates the pool for `token0`/`token1`/`fee` if it is missing and sets
/// its price if it is uninitialized. An already initialized pool is left as
/// it is. Returns the pool address.
pub fn create_and_initialize_pool_if_necessary(
    world: &mut World,
    token0: Address,
    token1: Address,
    fee: FeeAmount,
    sqrt_price_x96: U256,
) -> Result<Address, PeripheryError> {
    PoolKey::sorted(token0, token1, fee)?;

    let pool = match world.get_pool(token0, token1, fee) {
        Some(pool) => pool,
        None => {
            let pool = world.create_pool(token0, token1, fee)?;
            info!(pool = ?pool, fee = fee.pips(), "Created pool");
            pool
        }
    };
    if !world.pool(pool)?.is_initialized() {
        world.initialize_pool(pool, sqrt_price_x96)?;
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use periphery_domain::error::DomainError;
    use periphery_domain::math::price_tick::encode_price_sqrt;

    fn tokens(world: &mut World) -> (Address, Address) {
        let owner = world.create_account();
        let a = world.deploy_token("A", 18, U256::from(1000), owner).unwrap();
        let b = world.deploy_token("B", 18, U256::from(1000), owner).unwrap();
        if a < b { (a, b) } else { (b, a) }
    }

    #[test]
    fn test_creates_and_initializes() {
        let mut world = World::new();
        let (token0, token1) = tokens(&mut world);
        let price = encode_price_sqrt(1, 1).unwrap();
        let pool =
            create_and_initialize_pool_if_necessary(&mut world, token0, token1, FeeAmount::Medium, price)
                .unwrap();
        assert_eq!(world.pool(pool).unwrap().slot0().sqrt_price_x96, price);

        // second call keeps the first price
        let other = encode_price_sqrt(2, 1).unwrap();
        let again =
            create_and_initialize_pool_if_necessary(&mut world, token0, token1, FeeAmount::Medium, other)
                .unwrap();
        assert_eq!(again, pool);
        assert_eq!(world.pool(pool).unwrap().slot0().sqrt_price_x96, price);
    }

    #[test]
    fn test_initializes_existing_pool() {
        let mut world = World::new();
        let (token0, token1) = tokens(&mut world);
        let pool = world.create_pool(token0, token1, FeeAmount::Low).unwrap();
        let price = encode_price_sqrt(1, 2).unwrap();
        create_and_initialize_pool_if_necessary(&mut world, token0, token1, FeeAmount::Low, price)
            .unwrap();
        assert!(world.pool(pool).unwrap().is_initialized());
    }

    #[test]
    fn test_rejects_unsorted_tokens() {
        let mut world = World::new();
        let (token0, token1) = tokens(&mut world);
        let price = encode_price_sqrt(1, 1).unwrap();
        assert_eq!(
            create_and_initialize_pool_if_necessary(&mut world, token1, token0, FeeAmount::Medium, price),
            Err(PeripheryError::Domain(DomainError::UnsortedTokens))
        );
    }
}
