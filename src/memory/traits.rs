/*!
 * Memory Traits
 * The provider seam: everything that touches raw bytes goes through here
 */

use super::types::*;
use crate::core::limits::NULL_ADDRESS;
use crate::core::types::{format_hex_address, Address, Size};
use std::fmt::Debug;

/// Low-level memory provider
///
/// The typed layer never computes a real address on its own. It decides which
/// bytes to read or write and how to interpret them; the provider performs
/// the mechanical access.
pub trait MemoryProvider: Send + Sync + Debug {
    /// Size in bytes of a primitive kind
    fn size_of(&self, kind: PrimitiveKind) -> Size;

    /// Alignment in bytes of a primitive kind
    fn align_of(&self, kind: PrimitiveKind) -> Size;

    /// Map `size` zero-filled bytes. Size 0 still yields a unique, non-null address.
    fn allocate(&self, size: Size) -> MemoryResult<Address>;

    /// Unmap a block previously returned by `allocate`
    fn release(&self, address: Address) -> MemoryResult<()>;

    fn read_bytes(&self, address: Address, len: Size) -> MemoryResult<Vec<u8>>;

    fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()>;

    /// Load a native-width pointer stored at `address`
    fn read_pointer(&self, address: Address) -> MemoryResult<Address>;

    /// Store `target` as a native-width pointer at `address`
    fn write_pointer(&self, address: Address, target: Address) -> MemoryResult<()>;

    /// Retrieve the managed object whose handle is stored at `address`
    ///
    /// Returns `None` when the slot holds the null handle.
    fn read_object(&self, address: Address) -> MemoryResult<Option<ObjectHandle>>;

    /// Embed a handle to `object` at `address`
    ///
    /// With `persistent` set the store alone keeps the object alive; otherwise
    /// the caller must keep it reachable for as long as the slot is read.
    fn write_object(
        &self,
        address: Address,
        object: ObjectHandle,
        persistent: bool,
    ) -> MemoryResult<()>;

    /// Length of the data at `address` up to the first run of `width` zero
    /// bytes aligned to `width` from the start
    ///
    /// Unbounded apart from mapped memory: unterminated data is scanned until
    /// the provider runs out of mapped bytes.
    fn scan_zeros(&self, address: Address, width: Size) -> MemoryResult<Size>;

    /// Native pointer width
    fn pointer_size(&self) -> Size {
        self.size_of(PrimitiveKind::Pointer)
    }

    fn null(&self) -> Address {
        NULL_ADDRESS
    }

    fn is_null(&self, address: Address) -> bool {
        address == self.null()
    }

    /// Address formatted for diagnostics
    fn hex_address(&self, address: Address) -> String {
        format_hex_address(address)
    }
}
