/*!
 * Regions
 * Address + length pairs, optionally owning their provider allocation
 */

use crate::core::types::{Address, Size};
use crate::memory::MemoryProvider;
use tracing::warn;
use std::sync::Arc;

/// A byte range in provider memory
///
/// Owned regions release their allocation on drop. Windows only alias memory
/// owned elsewhere.
pub(crate) struct Region {
    address: Address,
    len: Size,
    owned: bool,
    provider: Arc<dyn MemoryProvider>,
}

impl Region {
    pub(crate) fn owned(provider: Arc<dyn MemoryProvider>, address: Address, len: Size) -> Self {
        Self {
            address,
            len,
            owned: true,
            provider,
        }
    }

    pub(crate) fn window(provider: Arc<dyn MemoryProvider>, address: Address, len: Size) -> Self {
        Self {
            address,
            len,
            owned: false,
            provider,
        }
    }

    pub(crate) fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn len(&self) -> Size {
        self.len
    }

    pub(crate) fn is_owned(&self) -> bool {
        self.owned
    }

    pub(crate) fn provider(&self) -> &Arc<dyn MemoryProvider> {
        &self.provider
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if self.owned && !self.provider.is_null(self.address) {
            if let Err(e) = self.provider.release(self.address) {
                warn!(address = self.address, error = %e, "Failed to release region");
            }
        }
    }
}
