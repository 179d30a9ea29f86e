use periphery_domain::fees::FeeAmount;
use periphery_domain::math::price_tick::encode_price_sqrt;
use periphery_domain::math::tick_math::{max_usable_tick, min_usable_tick};
use periphery_domain::params::{MigrateParams, NO_DEADLINE};
use periphery_domain::token::{Address, sort_tokens};
use periphery_execution::prelude::*;
use periphery_simulation::error::ChainError;
use periphery_simulation::event::{ChainEvent, EventData};
use primitive_types::U256;

const LEGACY_DEPOSIT: u64 = 10_000;
const LEGACY_LIQUIDITY: u64 = 9_000;

struct Setup {
    fixture: CompleteFixture,
    pair: Address,
    token0: Address,
    token1: Address,
}

/// Legacy pair of the first test token and WSEI holding 10000 of each,
/// 9000 LP tokens owned by the wallet and approved to the migrator.
fn setup() -> Setup {
    let mut fixture = CompleteFixture::new().unwrap();
    let token = fixture.tokens[0];
    let wallet = fixture.wallet;
    let wsei = fixture.wsei();
    let migrator = fixture.periphery.migrator().address();

    let world = fixture.periphery.world_mut();
    let pair = world.create_pair(token, wsei).unwrap();
    world.wsei_deposit(wallet, U256::from(LEGACY_DEPOSIT)).unwrap();
    let ledger = world.ledger_mut();
    ledger
        .transfer(token, wallet, pair, U256::from(LEGACY_DEPOSIT))
        .unwrap();
    ledger
        .transfer(wsei, wallet, pair, U256::from(LEGACY_DEPOSIT))
        .unwrap();
    let minted = world.pair_mint(pair, wallet).unwrap();
    assert_eq!(minted, U256::from(LEGACY_LIQUIDITY));

    fixture
        .periphery
        .approve(wallet, pair, migrator, U256::MAX)
        .unwrap();

    let (token0, token1) = sort_tokens(token, wsei).unwrap();
    Setup {
        fixture,
        pair,
        token0,
        token1,
    }
}

fn create_pool(setup: &mut Setup, reserve1: u128, reserve0: u128) -> Address {
    let Setup {
        fixture,
        token0,
        token1,
        ..
    } = setup;
    let wallet = fixture.wallet;
    let output = fixture
        .periphery
        .submit(
            wallet,
            U256::zero(),
            Call::Migrator(MigratorCall::CreateAndInitializePoolIfNecessary {
                token0: *token0,
                token1: *token1,
                fee: FeeAmount::Medium,
                sqrt_price_x96: encode_price_sqrt(reserve1, reserve0).unwrap(),
            }),
        )
        .unwrap();
    match output {
        CallOutput::Migrator(MigratorOutput::Pool(pool)) => pool,
        other => panic!("unexpected output {other:?}"),
    }
}

fn params(setup: &Setup, percentage_to_migrate: u8) -> MigrateParams {
    let spacing = FeeAmount::Medium.tick_spacing();
    MigrateParams {
        pair: setup.pair,
        liquidity_to_migrate: U256::from(LEGACY_LIQUIDITY),
        percentage_to_migrate,
        token0: setup.token0,
        token1: setup.token1,
        fee: FeeAmount::Medium,
        tick_lower: min_usable_tick(spacing),
        tick_upper: max_usable_tick(spacing),
        amount0_min: U256::zero(),
        amount1_min: U256::zero(),
        recipient: setup.fixture.wallet,
        deadline: NO_DEADLINE,
        refund_as_sei: false,
    }
}

fn assert_migrator_empty(setup: &Setup) {
    let world = setup.fixture.periphery.world();
    let migrator = setup.fixture.periphery.migrator().address();
    let manager = setup.fixture.periphery.manager().address();
    for token in [setup.token0, setup.token1, setup.pair] {
        assert_eq!(world.balance_of(token, migrator), U256::zero());
        assert_eq!(world.ledger().allowance(token, migrator, manager), U256::zero());
    }
    assert_eq!(world.native_balance(migrator), U256::zero());
}

#[test]
fn test_migrate_full_liquidity() {
    let mut setup = setup();
    let pool = create_pool(&mut setup, 1, 1);
    let wallet = setup.fixture.wallet;

    let minted = setup
        .fixture
        .periphery
        .migrate(wallet, params(&setup, 100))
        .unwrap();

    assert_eq!(minted.liquidity, u128::from(LEGACY_LIQUIDITY));
    let manager = setup.fixture.periphery.manager();
    assert_eq!(manager.owner_of(minted.token_id).unwrap(), wallet);
    assert_eq!(
        manager.positions(minted.token_id).unwrap().liquidity,
        u128::from(LEGACY_LIQUIDITY)
    );
    assert_eq!(setup.fixture.balance_of(setup.token0, pool), U256::from(LEGACY_LIQUIDITY));
    assert_eq!(setup.fixture.balance_of(setup.token1, pool), U256::from(LEGACY_LIQUIDITY));
    assert_eq!(setup.fixture.balance_of(setup.pair, wallet), U256::zero());
    assert_migrator_empty(&setup);
}

#[test]
fn test_migrate_half_refunds_rest() {
    let mut setup = setup();
    let pool = create_pool(&mut setup, 1, 1);
    let wallet = setup.fixture.wallet;
    let before0 = setup.fixture.balance_of(setup.token0, wallet);
    let before1 = setup.fixture.balance_of(setup.token1, wallet);

    let minted = setup
        .fixture
        .periphery
        .migrate(wallet, params(&setup, 50))
        .unwrap();

    assert_eq!(minted.liquidity, 4_500);
    assert_eq!(setup.fixture.balance_of(setup.token0, pool), U256::from(4_500));
    assert_eq!(setup.fixture.balance_of(setup.token1, pool), U256::from(4_500));
    assert_eq!(
        setup.fixture.balance_of(setup.token0, wallet),
        before0 + U256::from(4_500)
    );
    assert_eq!(
        setup.fixture.balance_of(setup.token1, wallet),
        before1 + U256::from(4_500)
    );
    assert_migrator_empty(&setup);
}

#[test]
fn test_migrate_half_refunds_native() {
    let mut setup = setup();
    create_pool(&mut setup, 1, 1);
    let wallet = setup.fixture.wallet;
    let wsei = setup.fixture.wsei();
    let migrator = setup.fixture.periphery.migrator().address();
    let native_before = setup.fixture.periphery.world().native_balance(wallet);
    let wsei_before = setup.fixture.balance_of(wsei, wallet);

    let mut migrate = params(&setup, 50);
    migrate.refund_as_sei = true;
    setup.fixture.periphery.migrate(wallet, migrate).unwrap();

    assert_eq!(
        setup.fixture.periphery.world().native_balance(wallet),
        native_before + U256::from(4_500)
    );
    assert_eq!(setup.fixture.balance_of(wsei, wallet), wsei_before);
    let receipt = setup.fixture.periphery.last_receipt().unwrap();
    assert!(receipt
        .events
        .contains(&ChainEvent::withdrawal(wsei, migrator, U256::from(4_500))));
    assert_migrator_empty(&setup);
}

#[test]
fn test_migrate_at_price_two() {
    for (reserve1, reserve0) in [(2, 1), (1, 2)] {
        let mut setup = setup();
        let pool = create_pool(&mut setup, reserve1, reserve0);
        let wallet = setup.fixture.wallet;
        let before0 = setup.fixture.balance_of(setup.token0, wallet);
        let before1 = setup.fixture.balance_of(setup.token1, wallet);

        let minted = setup
            .fixture
            .periphery
            .migrate(wallet, params(&setup, 100))
            .unwrap();
        assert_eq!(minted.liquidity, 6_363);

        // the cheaper side is deposited in full, the other leaves dust
        let (deposit0, deposit1) = if reserve1 > reserve0 {
            (4_500u64, 8_999u64)
        } else {
            (8_999, 4_500)
        };
        assert_eq!(setup.fixture.balance_of(setup.token0, pool), U256::from(deposit0));
        assert_eq!(setup.fixture.balance_of(setup.token1, pool), U256::from(deposit1));
        assert_eq!(
            setup.fixture.balance_of(setup.token0, wallet),
            before0 + U256::from(LEGACY_LIQUIDITY - deposit0)
        );
        assert_eq!(
            setup.fixture.balance_of(setup.token1, wallet),
            before1 + U256::from(LEGACY_LIQUIDITY - deposit1)
        );
        assert_migrator_empty(&setup);
    }
}

#[test]
fn test_migrate_at_price_two_refunds_native() {
    for (reserve1, reserve0) in [(2, 1), (1, 2)] {
        let mut setup = setup();
        create_pool(&mut setup, reserve1, reserve0);
        let wallet = setup.fixture.wallet;
        let wsei = setup.fixture.wsei();
        let migrator = setup.fixture.periphery.migrator().address();
        let token = if setup.token0 == wsei {
            setup.token1
        } else {
            setup.token0
        };
        let native_before = setup.fixture.periphery.world().native_balance(wallet);
        let wsei_before = setup.fixture.balance_of(wsei, wallet);
        let token_before = setup.fixture.balance_of(token, wallet);

        let mut migrate = params(&setup, 100);
        migrate.refund_as_sei = true;
        let minted = setup.fixture.periphery.migrate(wallet, migrate).unwrap();
        assert_eq!(minted.liquidity, 6_363);

        let (deposit0, deposit1) = if reserve1 > reserve0 {
            (4_500u64, 8_999u64)
        } else {
            (8_999, 4_500)
        };
        let (wsei_refund, token_refund) = if setup.token0 == wsei {
            (LEGACY_LIQUIDITY - deposit0, LEGACY_LIQUIDITY - deposit1)
        } else {
            (LEGACY_LIQUIDITY - deposit1, LEGACY_LIQUIDITY - deposit0)
        };

        assert_eq!(
            setup.fixture.periphery.world().native_balance(wallet),
            native_before + U256::from(wsei_refund)
        );
        assert_eq!(setup.fixture.balance_of(wsei, wallet), wsei_before);
        assert_eq!(
            setup.fixture.balance_of(token, wallet),
            token_before + U256::from(token_refund)
        );
        let receipt = setup.fixture.periphery.last_receipt().unwrap();
        assert!(receipt
            .events
            .contains(&ChainEvent::withdrawal(wsei, migrator, U256::from(wsei_refund))));
        assert_migrator_empty(&setup);
    }
}

#[test]
fn test_migrate_to_uninitialized_pool_reverts() {
    let mut setup = setup();
    let wallet = setup.fixture.wallet;
    let (token0, token1) = (setup.token0, setup.token1);
    let pool = setup
        .fixture
        .periphery
        .world_mut()
        .create_pool(token0, token1, FeeAmount::Medium)
        .unwrap();
    let reserves_before = setup.fixture.periphery.world().pair(setup.pair).unwrap().clone();

    assert_eq!(
        setup.fixture.periphery.migrate(wallet, params(&setup, 100)),
        Err(PeripheryError::Chain(ChainError::PoolNotInitialized(pool)))
    );
    assert_eq!(
        setup.fixture.balance_of(setup.pair, wallet),
        U256::from(LEGACY_LIQUIDITY)
    );
    assert_eq!(
        setup.fixture.periphery.world().pair(setup.pair).unwrap(),
        &reserves_before
    );
    assert_eq!(setup.fixture.periphery.manager().total_supply(), 0);
}

#[test]
fn test_migrate_to_missing_pool_reverts() {
    let mut setup = setup();
    let wallet = setup.fixture.wallet;
    assert!(matches!(
        setup.fixture.periphery.migrate(wallet, params(&setup, 100)),
        Err(PeripheryError::Chain(ChainError::PoolNotFound(_)))
    ));
    assert_eq!(
        setup.fixture.balance_of(setup.pair, wallet),
        U256::from(LEGACY_LIQUIDITY)
    );
}

#[test]
fn test_percentage_bounds_revert() {
    let mut setup = setup();
    create_pool(&mut setup, 1, 1);
    let wallet = setup.fixture.wallet;
    assert_eq!(
        setup.fixture.periphery.migrate(wallet, params(&setup, 0)),
        Err(PeripheryError::PercentageTooSmall)
    );
    assert_eq!(
        setup.fixture.periphery.migrate(wallet, params(&setup, 101)),
        Err(PeripheryError::PercentageTooLarge)
    );
}

#[test]
fn test_migration_events_include_position_mint() {
    let mut setup = setup();
    create_pool(&mut setup, 1, 1);
    let wallet = setup.fixture.wallet;
    let minted = setup
        .fixture
        .periphery
        .migrate(wallet, params(&setup, 100))
        .unwrap();
    let receipt = setup.fixture.periphery.last_receipt().unwrap();
    assert!(receipt.events.iter().any(|event| event.data
        == EventData::IncreaseLiquidity {
            token_id: minted.token_id,
            liquidity: minted.liquidity,
            amount0: minted.amount0,
            amount1: minted.amount1,
        }));
}
