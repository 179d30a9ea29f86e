use periphery_domain::fees::FeeAmount;
use periphery_domain::params::ExactInputSingleParams;
use periphery_execution::prelude::*;
use primitive_types::U256;

#[tokio::test]
async fn test_concurrent_swaps_are_serialized() {
    let mut fixture = CompleteFixture::new().unwrap();
    let [token0, token1, _] = fixture.tokens;
    fixture.create_pool(token0, token1).unwrap();
    let trader = fixture.trader;
    let shared = SharedPeriphery::new(fixture.periphery);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let shared = shared.clone();
        handles.push(tokio::spawn(async move {
            let swap = ExactInputSingleParams::new(
                token0,
                token1,
                FeeAmount::Medium,
                trader,
                U256::from(1_000),
            );
            shared
                .submit(
                    trader,
                    U256::zero(),
                    Call::Router(RouterCall::ExactInputSingle(swap)),
                )
                .await
        }));
    }

    let mut received = U256::zero();
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            CallOutput::Router(RouterOutput::Amount(amount)) => received += amount,
            other => panic!("unexpected output {other:?}"),
        }
    }

    let (balance0, balance1, router_balance) = shared
        .read(|p| {
            let world = p.world();
            (
                world.balance_of(token0, trader),
                world.balance_of(token1, trader),
                world.balance_of(token1, p.router().address()),
            )
        })
        .await;
    assert_eq!(balance0, U256::from(TRADER_BALANCE - 8_000));
    assert_eq!(balance1, U256::from(TRADER_BALANCE) + received);
    assert_eq!(router_balance, U256::zero());

    let receipts = shared.receipts().await;
    assert!(receipts.iter().all(|receipt| receipt.is_success()));
}

#[tokio::test]
async fn test_with_runs_exclusive_sequences() {
    let mut fixture = CompleteFixture::new().unwrap();
    let [token0, token1, _] = fixture.tokens;
    fixture.create_pool(token0, token1).unwrap();
    let trader = fixture.trader;
    let shared = SharedPeriphery::new(fixture.periphery);

    let failed = shared
        .with(|p| {
            p.world_mut().set_block_timestamp(100);
            let swap = ExactInputSingleParams::new(
                token0,
                token1,
                FeeAmount::Medium,
                trader,
                U256::from(3),
            )
            .with_deadline(50);
            p.exact_input_single(trader, U256::zero(), swap)
        })
        .await;
    assert_eq!(failed, Err(PeripheryError::TransactionTooOld));
    let last = shared.read(|p| p.last_receipt().cloned()).await.unwrap();
    assert!(!last.is_success());
}
