//! Shared handle that serializes submissions from concurrent tasks.

use crate::error::PeripheryError;
use crate::periphery::{Call, CallOutput, Periphery, Receipt};
use periphery_domain::token::Address;
use primitive_types::U256;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Cloneable handle to one [`Periphery`]. Calls run one at a time, in the
/// order the lock is acquired.
#[derive(Debug, Clone)]
pub struct SharedPeriphery {
    inner: Arc<Mutex<Periphery>>,
}

impl SharedPeriphery {
    pub fn new(periphery: Periphery) -> Self {
        Self {
            inner: Arc::new(Mutex::new(periphery)),
        }
    }

    /// Submits `call` and waits for it to commit or revert.
    pub async fn submit(
        &self,
        sender: Address,
        value: U256,
        call: Call,
    ) -> Result<CallOutput, PeripheryError> {
        let mut periphery = self.inner.lock().await;
        debug!(sender = ?sender, "Submitting call");
        periphery.submit(sender, value, call)
    }

    /// Runs `f` with exclusive access, for setup or multi-step sequences
    /// that must not interleave with other submitters.
    pub async fn with<T>(&self, f: impl FnOnce(&mut Periphery) -> T) -> T {
        let mut periphery = self.inner.lock().await;
        f(&mut periphery)
    }

    /// Reads state without submitting anything.
    pub async fn read<T>(&self, f: impl FnOnce(&Periphery) -> T) -> T {
        let periphery = self.inner.lock().await;
        f(&periphery)
    }

    pub async fn receipts(&self) -> Vec<Receipt> {
        self.inner.lock().await.receipts().to_vec()
    }
}
