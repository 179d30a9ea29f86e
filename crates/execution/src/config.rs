//! Immutable deployment configuration shared by every periphery contract.

use periphery_domain::token::Address;
use periphery_simulation::world::World;
use serde::{Deserialize, Serialize};

/// Label shown for the native currency when none is configured.
pub const DEFAULT_NATIVE_LABEL: &str = "SEI";

/// Addresses a periphery contract is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheryConfig {
    /// Concentrated-liquidity factory used to derive pool addresses.
    pub factory: Address,
    /// Legacy constant-product factory.
    pub legacy_factory: Address,
    /// Wrapped native token.
    pub wsei: Address,
    /// Symbol rendered for WSEI in position metadata.
    pub native_label: String,
}

impl PeripheryConfig {
    pub fn new(factory: Address, legacy_factory: Address, wsei: Address) -> Self {
        Self {
            factory,
            legacy_factory,
            wsei,
            native_label: DEFAULT_NATIVE_LABEL.to_string(),
        }
    }

    /// Configuration pointing at the core contracts deployed in `world`.
    pub fn from_world(world: &World) -> Self {
        Self::new(world.factory(), world.legacy_factory(), world.wsei())
    }

    #[must_use]
    pub fn with_native_label(mut self, label: impl Into<String>) -> Self {
        self.native_label = label.into();
        self
    }
}
