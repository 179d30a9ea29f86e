use periphery_domain::error::DomainError;
use periphery_domain::fees::FeeAmount;
use periphery_domain::math::price_tick::encode_price_sqrt;
use periphery_domain::math::tick_math::{max_usable_tick, min_usable_tick};
use periphery_domain::params::{
    CollectParams, DecreaseLiquidityParams, ExactInputSingleParams, IncreaseLiquidityParams,
    MintParams, NO_DEADLINE,
};
use periphery_domain::token::Address;
use periphery_execution::prelude::*;
use periphery_simulation::error::ChainError;
use periphery_simulation::event::EventData;
use primitive_types::U256;

fn full_range_mint(token0: Address, token1: Address, recipient: Address, amount: u64) -> MintParams {
    let spacing = FeeAmount::Medium.tick_spacing();
    MintParams {
        token0,
        token1,
        fee: FeeAmount::Medium,
        tick_lower: min_usable_tick(spacing),
        tick_upper: max_usable_tick(spacing),
        amount0_desired: U256::from(amount),
        amount1_desired: U256::from(amount),
        amount0_min: U256::zero(),
        amount1_min: U256::zero(),
        recipient,
        deadline: NO_DEADLINE,
    }
}

fn setup() -> CompleteFixture {
    let mut fixture = CompleteFixture::new().unwrap();
    let [token0, token1, _] = fixture.tokens;
    fixture.create_pool(token0, token1).unwrap();
    fixture
}

#[test]
fn test_create_pool_mints_first_position() {
    let fixture = setup();
    let manager = fixture.periphery.manager();
    let position = manager.positions(1).unwrap();

    assert_eq!(position.liquidity, u128::from(POOL_LIQUIDITY));
    assert_eq!(position.token0, fixture.tokens[0]);
    assert_eq!(position.token1, fixture.tokens[1]);
    assert_eq!(position.operator, Address::zero());
    assert_eq!(manager.owner_of(1).unwrap(), fixture.wallet);
    assert_eq!(manager.balance_of(fixture.wallet), 1);
    assert_eq!(manager.tokens_of(fixture.wallet), vec![1]);

    let receipt = fixture.periphery.last_receipt().unwrap();
    assert!(receipt.events.iter().any(|event| event.data
        == EventData::PositionTransfer {
            from: Address::zero(),
            to: fixture.wallet,
            token_id: 1,
        }));
}

#[test]
fn test_create_and_initialize_through_manager() {
    let mut fixture = CompleteFixture::new().unwrap();
    let [token0, _, token2] = fixture.tokens;
    let wallet = fixture.wallet;

    let output = fixture
        .periphery
        .submit(
            wallet,
            U256::zero(),
            Call::Manager(ManagerCall::CreateAndInitializePoolIfNecessary {
                token0,
                token1: token2,
                fee: FeeAmount::Low,
                sqrt_price_x96: encode_price_sqrt(1, 1).unwrap(),
            }),
        )
        .unwrap();
    let CallOutput::Manager(ManagerOutput::Pool(pool)) = output else {
        panic!("unexpected output {output:?}");
    };
    assert!(fixture.periphery.world().pool(pool).unwrap().is_initialized());

    assert_eq!(
        fixture.periphery.submit(
            wallet,
            U256::zero(),
            Call::Manager(ManagerCall::CreateAndInitializePoolIfNecessary {
                token0: token2,
                token1: token0,
                fee: FeeAmount::Low,
                sqrt_price_x96: encode_price_sqrt(1, 1).unwrap(),
            }),
        ),
        Err(PeripheryError::Domain(DomainError::UnsortedTokens))
    );
}

#[test]
fn test_mint_requires_initialized_pool() {
    let mut fixture = CompleteFixture::new().unwrap();
    let [token0, token1, _] = fixture.tokens;
    let wallet = fixture.wallet;
    let pool = fixture
        .periphery
        .world_mut()
        .create_pool(token0, token1, FeeAmount::Medium)
        .unwrap();

    assert_eq!(
        fixture
            .periphery
            .mint(wallet, U256::zero(), full_range_mint(token0, token1, wallet, 100)),
        Err(PeripheryError::Chain(ChainError::PoolNotInitialized(pool)))
    );
    assert_eq!(fixture.periphery.manager().total_supply(), 0);
}

#[test]
fn test_mint_price_slippage() {
    let mut fixture = setup();
    let [token0, token1, _] = fixture.tokens;
    let wallet = fixture.wallet;

    let mut params = full_range_mint(token0, token1, wallet, 100);
    params.amount0_min = U256::from(101);
    assert_eq!(
        fixture.periphery.mint(wallet, U256::zero(), params),
        Err(PeripheryError::PriceSlippage)
    );
}

#[test]
fn test_increase_liquidity() {
    let mut fixture = setup();
    let wallet = fixture.wallet;

    let increased = fixture
        .periphery
        .increase_liquidity(
            wallet,
            U256::zero(),
            IncreaseLiquidityParams {
                token_id: 1,
                amount0_desired: U256::from(100),
                amount1_desired: U256::from(100),
                amount0_min: U256::zero(),
                amount1_min: U256::zero(),
                deadline: NO_DEADLINE,
            },
        )
        .unwrap();
    assert_eq!(increased.liquidity, 100);
    assert_eq!(
        fixture.periphery.manager().positions(1).unwrap().liquidity,
        u128::from(POOL_LIQUIDITY) + 100
    );
}

#[test]
fn test_decrease_collect_and_burn() {
    let mut fixture = setup();
    let [token0, token1, _] = fixture.tokens;
    let wallet = fixture.wallet;
    let trader = fixture.trader;
    let liquidity = u128::from(POOL_LIQUIDITY);

    let decrease = DecreaseLiquidityParams {
        token_id: 1,
        liquidity,
        amount0_min: U256::zero(),
        amount1_min: U256::zero(),
        deadline: NO_DEADLINE,
    };
    assert_eq!(
        fixture.periphery.decrease_liquidity(trader, decrease.clone()),
        Err(PeripheryError::NotApproved)
    );

    let (amount0, amount1) = fixture
        .periphery
        .decrease_liquidity(wallet, decrease)
        .unwrap();
    assert!(!amount0.is_zero() && !amount1.is_zero());
    let position = fixture.periphery.manager().positions(1).unwrap().clone();
    assert_eq!(position.liquidity, 0);
    assert_eq!(U256::from(position.tokens_owed0), amount0);
    assert_eq!(U256::from(position.tokens_owed1), amount1);

    assert_eq!(
        fixture
            .periphery
            .submit(wallet, U256::zero(), Call::Manager(ManagerCall::Burn { token_id: 1 })),
        Err(PeripheryError::NotCleared)
    );

    let before0 = fixture.balance_of(token0, wallet);
    let before1 = fixture.balance_of(token1, wallet);
    let (collected0, collected1) = fixture
        .periphery
        .collect(
            wallet,
            CollectParams {
                token_id: 1,
                recipient: wallet,
                amount0_max: u128::MAX,
                amount1_max: u128::MAX,
            },
        )
        .unwrap();
    assert_eq!((collected0, collected1), (amount0, amount1));
    assert_eq!(fixture.balance_of(token0, wallet), before0 + amount0);
    assert_eq!(fixture.balance_of(token1, wallet), before1 + amount1);

    fixture
        .periphery
        .submit(wallet, U256::zero(), Call::Manager(ManagerCall::Burn { token_id: 1 }))
        .unwrap();
    assert_eq!(
        fixture.periphery.manager().positions(1),
        Err(PeripheryError::InvalidTokenId)
    );
    assert_eq!(fixture.periphery.manager().balance_of(wallet), 0);
}

#[test]
fn test_decrease_more_than_position() {
    let mut fixture = setup();
    let wallet = fixture.wallet;
    let decrease = |liquidity| DecreaseLiquidityParams {
        token_id: 1,
        liquidity,
        amount0_min: U256::zero(),
        amount1_min: U256::zero(),
        deadline: NO_DEADLINE,
    };
    assert_eq!(
        fixture
            .periphery
            .decrease_liquidity(wallet, decrease(u128::from(POOL_LIQUIDITY) + 1)),
        Err(PeripheryError::Domain(DomainError::LiquiditySub))
    );
    assert_eq!(
        fixture.periphery.decrease_liquidity(wallet, decrease(0)),
        Err(PeripheryError::Chain(ChainError::ZeroLiquidity))
    );
}

#[test]
fn test_collect_swap_fees() {
    let mut fixture = setup();
    let [token0, token1, _] = fixture.tokens;
    let wallet = fixture.wallet;
    let trader = fixture.trader;

    let swap = ExactInputSingleParams::new(token0, token1, FeeAmount::Medium, trader, U256::from(100_000));
    fixture
        .periphery
        .exact_input_single(trader, U256::zero(), swap)
        .unwrap();

    let collect = CollectParams {
        token_id: 1,
        recipient: wallet,
        amount0_max: u128::MAX,
        amount1_max: u128::MAX,
    };
    assert_eq!(
        fixture.periphery.collect(
            wallet,
            CollectParams {
                amount0_max: 0,
                amount1_max: 0,
                ..collect.clone()
            }
        ),
        Err(PeripheryError::ZeroAmount)
    );

    let (fees0, fees1) = fixture.periphery.collect(wallet, collect.clone()).unwrap();
    // 0.3% of the input, less rounding
    assert!(fees0 > U256::from(290) && fees0 <= U256::from(300));
    assert_eq!(fees1, U256::zero());

    let (again0, again1) = fixture.periphery.collect(wallet, collect).unwrap();
    assert_eq!((again0, again1), (U256::zero(), U256::zero()));
}

#[test]
fn test_approve_and_transfer() {
    let mut fixture = setup();
    let wallet = fixture.wallet;
    let trader = fixture.trader;

    let transfer = Call::Manager(ManagerCall::TransferFrom {
        from: wallet,
        to: trader,
        token_id: 1,
    });
    assert_eq!(
        fixture.periphery.submit(trader, U256::zero(), transfer.clone()),
        Err(PeripheryError::NotApproved)
    );

    fixture
        .periphery
        .submit(
            wallet,
            U256::zero(),
            Call::Manager(ManagerCall::Approve {
                approved: trader,
                token_id: 1,
            }),
        )
        .unwrap();
    assert_eq!(fixture.periphery.manager().get_approved(1).unwrap(), trader);

    fixture
        .periphery
        .submit(trader, U256::zero(), transfer)
        .unwrap();
    let manager = fixture.periphery.manager();
    assert_eq!(manager.owner_of(1).unwrap(), trader);
    assert_eq!(manager.get_approved(1).unwrap(), Address::zero());
    assert_eq!(manager.balance_of(wallet), 0);
}

#[test]
fn test_approve_owner_and_transfer_to_zero_rejected() {
    let mut fixture = setup();
    let wallet = fixture.wallet;

    assert_eq!(
        fixture.periphery.submit(
            wallet,
            U256::zero(),
            Call::Manager(ManagerCall::Approve {
                approved: wallet,
                token_id: 1,
            }),
        ),
        Err(PeripheryError::ApprovalToOwner)
    );
    assert_eq!(
        fixture.periphery.submit(
            wallet,
            U256::zero(),
            Call::Manager(ManagerCall::TransferFrom {
                from: wallet,
                to: Address::zero(),
                token_id: 1,
            }),
        ),
        Err(PeripheryError::TransferToZeroAddress)
    );

    let manager = fixture.periphery.manager();
    assert_eq!(manager.owner_of(1).unwrap(), wallet);
    assert_eq!(manager.get_approved(1).unwrap(), Address::zero());
    assert_eq!(manager.balance_of(wallet), 1);
}

#[test]
fn test_operator_for_all_can_manage() {
    let mut fixture = setup();
    let wallet = fixture.wallet;
    let trader = fixture.trader;

    fixture
        .periphery
        .submit(
            wallet,
            U256::zero(),
            Call::Manager(ManagerCall::SetApprovalForAll {
                operator: trader,
                approved: true,
            }),
        )
        .unwrap();
    assert!(fixture.periphery.manager().is_authorized(trader, 1).unwrap());

    let (amount0, _) = fixture
        .periphery
        .decrease_liquidity(
            trader,
            DecreaseLiquidityParams {
                token_id: 1,
                liquidity: 1000,
                amount0_min: U256::zero(),
                amount1_min: U256::zero(),
                deadline: NO_DEADLINE,
            },
        )
        .unwrap();
    assert!(!amount0.is_zero());
}

#[test]
fn test_manager_multicall_is_atomic() {
    let mut fixture = setup();
    let [token0, token1, _] = fixture.tokens;
    let wallet = fixture.wallet;

    let mut bad = full_range_mint(token0, token1, wallet, 100);
    bad.amount1_min = U256::from(1_000);
    let result = fixture.periphery.submit(
        wallet,
        U256::zero(),
        Call::ManagerMulticall(vec![
            ManagerCall::Mint(full_range_mint(token0, token1, wallet, 100)),
            ManagerCall::Mint(bad),
        ]),
    );
    assert_eq!(result, Err(PeripheryError::PriceSlippage));
    assert_eq!(fixture.periphery.manager().total_supply(), 1);

    // ids are not consumed by reverted mints
    let minted = fixture
        .periphery
        .mint(wallet, U256::zero(), full_range_mint(token0, token1, wallet, 100))
        .unwrap();
    assert_eq!(minted.token_id, 2);
}
