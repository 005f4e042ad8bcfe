/*!
 * Allocation Tracking
 * Address-space cursor and usage counters
 */

use crate::core::types::{Address, Size};

#[derive(Debug, Clone)]
pub struct AllocationTracking {
    /// Next unreserved address
    pub next_address: Address,
    pub used_bytes: Size,
    pub peak_bytes: Size,
    pub allocation_count: usize,
    pub release_count: usize,
}

impl AllocationTracking {
    pub fn new(base_address: Address) -> Self {
        Self {
            next_address: base_address,
            used_bytes: 0,
            peak_bytes: 0,
            allocation_count: 0,
            release_count: 0,
        }
    }

    pub fn add_allocation(&mut self, size: Size) {
        self.used_bytes += size;
        self.allocation_count += 1;
        if self.used_bytes > self.peak_bytes {
            self.peak_bytes = self.used_bytes;
        }
    }

    pub fn remove_allocation(&mut self, size: Size) {
        self.used_bytes = self.used_bytes.saturating_sub(size);
        self.release_count += 1;
    }
}
