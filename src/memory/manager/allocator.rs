/*!
 * Memory Allocator Implementation
 * Allocation and release logic
 */

use super::super::types::{MemoryBlock, MemoryError, MemoryPressure, MemoryResult};
use super::MemoryManager;
use crate::core::types::{Address, Size};
use log::{debug, error, warn};

impl MemoryManager {
    /// Allocate zero-filled memory with graceful OOM handling
    pub fn allocate(&self, size: Size) -> MemoryResult<Address> {
        let alignment = self.config.alignment;

        let mut tracking = self.tracking.lock();
        let used = tracking.used_bytes;
        let available = self.config.capacity.saturating_sub(used);
        let out_of_memory = MemoryError::OutOfMemory {
            requested: size,
            available,
            used,
            total: self.config.capacity,
        };
        if size > available {
            error!(
                "OOM: requested {} bytes, only {} bytes available ({} used / {} total)",
                size, available, used, self.config.capacity
            );
            return Err(out_of_memory);
        }

        // Zero-sized blocks still reserve one aligned slot so their address is unique
        let reserved = size
            .max(1)
            .div_ceil(alignment)
            .checked_mul(alignment)
            .ok_or(out_of_memory)?;

        let address = tracking.next_address;
        debug_assert_eq!(address % alignment, 0);
        tracking.next_address = address
            .checked_add(reserved)
            .ok_or(MemoryError::InvalidAddress(address))?;
        tracking.add_allocation(size);
        let used_val = tracking.used_bytes;
        drop(tracking);

        self.blocks
            .write()
            .insert(address, MemoryBlock::new(address, size, reserved));

        let ratio = used_val as f64 / self.config.capacity as f64;
        match MemoryPressure::from_ratio(ratio) {
            level @ (MemoryPressure::High | MemoryPressure::Critical) => warn!(
                "Memory pressure {}: Allocated {} bytes at 0x{:x} ({:.1}% used: {} / {})",
                level,
                size,
                address,
                ratio * 100.0,
                used_val,
                self.config.capacity
            ),
            _ => debug!("Allocated {} bytes at 0x{:x}", size, address),
        }

        Ok(address)
    }

    /// Release a block; its address range becomes unmapped
    pub fn release(&self, address: Address) -> MemoryResult<()> {
        let block = match self.blocks.write().remove(&address) {
            Some(block) => block,
            None => {
                warn!(
                    "Attempted to release invalid or already released address: 0x{:x}",
                    address
                );
                return Err(MemoryError::InvalidAddress(address));
            }
        };

        self.tracking.lock().remove_allocation(block.size);
        self.prune_objects();

        debug!("Released {} bytes at 0x{:x}", block.size, address);
        Ok(())
    }
}
