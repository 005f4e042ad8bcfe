/*!
 * Simulated Memory Provider
 *
 * In-process address space backing every view the runtime creates.
 *
 * ## Layout
 *
 * - Addresses start at a configurable non-zero base, so address 0 is never mapped
 * - Every block start is aligned to the configured alignment
 * - The gap between a block's end and the next block start is unmapped
 *
 * ## Features
 *
 * - **Capacity accounting**: allocations beyond the pool fail with `OutOfMemory`
 * - **Memory pressure tracking**: warns at 80%, critical at 95%
 * - **Managed objects**: handles embedded in memory resolve through an object table
 * - **Shared clones**: clones see the same address space
 */

mod allocator;
mod objects;
mod storage;
mod tracking;

use super::traits::MemoryProvider;
use super::types::{MemoryBlock, MemoryResult, MemoryStats, ObjectHandle, PrimitiveKind};
use crate::core::config::MemoryConfig;
use crate::core::types::{Address, Size};
use ahash::RandomState;
use dashmap::DashMap;
use log::info;
use objects::ObjectSlot;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tracking::AllocationTracking;

/// Memory manager
#[derive(Debug)]
pub struct MemoryManager {
    pub(super) blocks: Arc<RwLock<BTreeMap<Address, MemoryBlock>>>,
    pub(super) config: MemoryConfig,
    pub(super) tracking: Arc<Mutex<AllocationTracking>>,
    // Managed object table - handle ids stored in memory resolve here
    pub(super) objects: Arc<DashMap<usize, ObjectSlot, RandomState>>,
    pub(super) next_object_id: Arc<AtomicUsize>,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    /// Create memory manager with custom capacity (useful for testing)
    pub fn with_capacity(total: Size) -> Self {
        Self::with_config(MemoryConfig::default().with_capacity(total))
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        let config = config.normalized();
        info!(
            "Simulated memory initialized with {} bytes at base 0x{:x} ({}-byte block alignment)",
            config.capacity, config.base_address, config.alignment
        );
        Self {
            blocks: Arc::new(RwLock::new(BTreeMap::new())),
            config,
            tracking: Arc::new(Mutex::new(AllocationTracking::new(config.base_address))),
            objects: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_object_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Get memory info as (total, used, available)
    pub fn info(&self) -> (Size, Size, Size) {
        let used = self.tracking.lock().used_bytes;
        (
            self.config.capacity,
            used,
            self.config.capacity.saturating_sub(used),
        )
    }

    /// Get overall memory statistics
    pub fn stats(&self) -> MemoryStats {
        let tracking = self.tracking.lock();
        let allocated_blocks = self.blocks.read().len();
        let used = tracking.used_bytes;
        MemoryStats {
            total_memory: self.config.capacity,
            used_memory: used,
            available_memory: self.config.capacity.saturating_sub(used),
            usage_percentage: if self.config.capacity == 0 {
                0.0
            } else {
                (used as f64 / self.config.capacity as f64) * 100.0
            },
            allocated_blocks,
            peak_memory: tracking.peak_bytes,
            allocation_count: tracking.allocation_count,
            release_count: tracking.release_count,
            live_objects: self.live_objects(),
        }
    }

    /// Check if an address is inside a mapped block
    pub fn is_valid(&self, address: Address) -> bool {
        self.blocks
            .read()
            .range(..=address)
            .next_back()
            .map(|(_, block)| block.contains(address))
            .unwrap_or(false)
    }
}

// Implement the provider seam
impl MemoryProvider for MemoryManager {
    fn size_of(&self, kind: PrimitiveKind) -> Size {
        kind.native_size()
    }

    fn align_of(&self, kind: PrimitiveKind) -> Size {
        kind.native_align()
    }

    fn allocate(&self, size: Size) -> MemoryResult<Address> {
        MemoryManager::allocate(self, size)
    }

    fn release(&self, address: Address) -> MemoryResult<()> {
        MemoryManager::release(self, address)
    }

    fn read_bytes(&self, address: Address, len: Size) -> MemoryResult<Vec<u8>> {
        MemoryManager::read_bytes(self, address, len)
    }

    fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        MemoryManager::write_bytes(self, address, data)
    }

    fn read_pointer(&self, address: Address) -> MemoryResult<Address> {
        MemoryManager::read_pointer(self, address)
    }

    fn write_pointer(&self, address: Address, target: Address) -> MemoryResult<()> {
        MemoryManager::write_pointer(self, address, target)
    }

    fn read_object(&self, address: Address) -> MemoryResult<Option<ObjectHandle>> {
        MemoryManager::read_object(self, address)
    }

    fn write_object(
        &self,
        address: Address,
        object: ObjectHandle,
        persistent: bool,
    ) -> MemoryResult<()> {
        MemoryManager::write_object(self, address, object, persistent)
    }

    fn scan_zeros(&self, address: Address, width: Size) -> MemoryResult<Size> {
        MemoryManager::scan_zeros(self, address, width)
    }
}

impl Clone for MemoryManager {
    fn clone(&self) -> Self {
        Self {
            blocks: Arc::clone(&self.blocks),
            config: self.config,
            tracking: Arc::clone(&self.tracking),
            objects: Arc::clone(&self.objects),
            next_object_id: Arc::clone(&self.next_object_id),
        }
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}
