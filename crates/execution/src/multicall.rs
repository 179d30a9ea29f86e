//! Atomic batching of contract calls.

use periphery_simulation::world::World;
use tracing::warn;

/// Runs `calls` in order against `world` and collects their outputs.
///
/// The first failing call aborts the batch: `world` is restored to its state
/// before the first call and that error is returned unchanged.
pub fn execute_batch<C, T, E>(
    world: &mut World,
    calls: Vec<C>,
    mut execute: impl FnMut(&mut World, C) -> Result<T, E>,
) -> Result<Vec<T>, E> {
    let snapshot = world.snapshot();
    let mut outputs = Vec::with_capacity(calls.len());
    for (index, call) in calls.into_iter().enumerate() {
        match execute(world, call) {
            Ok(output) => outputs.push(output),
            Err(err) => {
                warn!(index, "Batch call failed, reverting batch");
                world.restore(snapshot);
                return Err(err);
            }
        }
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    #[test]
    fn test_batch_returns_outputs_in_order() {
        let mut world = World::new();
        let outputs = execute_batch(&mut world, vec![1u32, 2, 3], |_, n| Ok::<_, ()>(n * 10)).unwrap();
        assert_eq!(outputs, vec![10, 20, 30]);
        let empty: Vec<u32> = execute_batch(&mut world, Vec::new(), |_, n: u32| Ok::<_, ()>(n)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_failed_call_reverts_earlier_calls() {
        let mut world = World::new();
        let account = world.create_account();
        let result = execute_batch(&mut world, vec![5u64, 0, 7], |world, amount| {
            if amount == 0 {
                return Err("zero");
            }
            world.ledger_mut().credit_native(account, U256::from(amount));
            Ok(())
        });
        assert_eq!(result, Err("zero"));
        assert_eq!(world.native_balance(account), U256::zero());
    }
}
