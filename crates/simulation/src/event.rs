//! Events emitted by ledger contracts.
//!
//! Every state change that a contract would log on chain is appended to the
//! ledger's event list. Events are rolled back together with balances when a
//! transaction reverts.

use periphery_domain::fees::FeeAmount;
use periphery_domain::token::Address;
use periphery_domain::value_objects::TokenDelta;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// A logged event together with the contract that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Contract that emitted the event.
    pub emitter: Address,
    /// Event payload.
    pub data: EventData,
}

/// Event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventData {
    /// ERC20 transfer, including mints (from zero) and burns (to zero).
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    /// ERC20 allowance change.
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },
    /// Native currency wrapped into WSEI.
    Deposit { dst: Address, wad: U256 },
    /// WSEI unwrapped into native currency.
    Withdrawal { src: Address, wad: U256 },
    /// Factory deployed a pool.
    PoolCreated {
        token0: Address,
        token1: Address,
        fee: FeeAmount,
        tick_spacing: i32,
        pool: Address,
    },
    /// Pool price set for the first time.
    Initialize { sqrt_price_x96: U256, tick: i32 },
    /// Liquidity added to a pool position.
    Mint {
        sender: Address,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: U256,
        amount1: U256,
    },
    /// Liquidity removed from a pool position.
    Burn {
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: U256,
        amount1: U256,
    },
    /// Owed tokens withdrawn from a pool position.
    Collect {
        owner: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0: u128,
        amount1: u128,
    },
    /// Pool swap.
    Swap {
        sender: Address,
        recipient: Address,
        amount0: TokenDelta,
        amount1: TokenDelta,
        sqrt_price_x96: U256,
        liquidity: u128,
        tick: i32,
    },
    /// Legacy factory deployed a pair.
    PairCreated {
        token0: Address,
        token1: Address,
        pair: Address,
    },
    /// Legacy pair reserves updated.
    Sync { reserve0: U256, reserve1: U256 },
    /// Position manager added liquidity to a token.
    IncreaseLiquidity {
        token_id: u64,
        liquidity: u128,
        amount0: U256,
        amount1: U256,
    },
    /// Position manager removed liquidity from a token.
    DecreaseLiquidity {
        token_id: u64,
        liquidity: u128,
        amount0: U256,
        amount1: U256,
    },
    /// Position manager paid out owed tokens.
    CollectPosition {
        token_id: u64,
        recipient: Address,
        amount0: u128,
        amount1: u128,
    },
    /// Position token ownership change, including mint and burn.
    PositionTransfer {
        from: Address,
        to: Address,
        token_id: u64,
    },
    /// Position token single-address approval.
    PositionApproval {
        owner: Address,
        approved: Address,
        token_id: u64,
    },
}

impl ChainEvent {
    pub fn new(emitter: Address, data: EventData) -> Self {
        Self { emitter, data }
    }

    /// ERC20 `Transfer` emitted by `token`.
    #[must_use]
    pub fn transfer(token: Address, from: Address, to: Address, value: U256) -> Self {
        Self::new(token, EventData::Transfer { from, to, value })
    }

    /// WSEI `Deposit`.
    #[must_use]
    pub fn deposit(wsei: Address, dst: Address, wad: U256) -> Self {
        Self::new(wsei, EventData::Deposit { dst, wad })
    }

    /// WSEI `Withdrawal`.
    #[must_use]
    pub fn withdrawal(wsei: Address, src: Address, wad: U256) -> Self {
        Self::new(wsei, EventData::Withdrawal { src, wad })
    }
}
