/*!
 * Managed Object Table
 * Handles embedded in simulated memory resolve to host objects here
 */

use super::super::types::{MemoryError, MemoryResult, ObjectHandle};
use super::MemoryManager;
use crate::core::types::Address;
use log::trace;
use std::any::Any;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

/// Table entry for an embedded object
#[derive(Debug)]
pub enum ObjectSlot {
    /// The table keeps the object alive
    Persistent(ObjectHandle),
    /// Alive only while someone else holds it
    Borrowed(Weak<dyn Any + Send + Sync>),
}

impl ObjectSlot {
    fn upgrade(&self) -> Option<ObjectHandle> {
        match self {
            ObjectSlot::Persistent(object) => Some(Arc::clone(object)),
            ObjectSlot::Borrowed(weak) => weak.upgrade(),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            ObjectSlot::Persistent(_) => true,
            ObjectSlot::Borrowed(weak) => weak.strong_count() > 0,
        }
    }
}

impl MemoryManager {
    /// Embed `object` at `address` by storing a pointer-width handle id
    ///
    /// Persistent entries are never pruned: overwriting the slot or releasing
    /// its block leaves the object alive in the table, so repeated persistent
    /// writes grow the table for the life of the provider.
    pub fn write_object(
        &self,
        address: Address,
        object: ObjectHandle,
        persistent: bool,
    ) -> MemoryResult<()> {
        let id = self.next_object_id.fetch_add(1, Ordering::SeqCst);
        let slot = if persistent {
            ObjectSlot::Persistent(object)
        } else {
            ObjectSlot::Borrowed(Arc::downgrade(&object))
        };

        // A failed store leaves no orphaned table entry
        self.write_pointer(address, id)?;
        self.objects.insert(id, slot);

        trace!(
            "Embedded object #{} at 0x{:x} (persistent: {})",
            id,
            address,
            persistent
        );
        Ok(())
    }

    /// Resolve the object handle stored at `address`
    pub fn read_object(&self, address: Address) -> MemoryResult<Option<ObjectHandle>> {
        let id = self.read_pointer(address)?;
        if id == 0 {
            return Ok(None);
        }
        self.objects
            .get(&id)
            .and_then(|slot| slot.upgrade())
            .map(Some)
            .ok_or(MemoryError::DanglingObject(address))
    }

    /// Number of table entries whose object is still alive
    pub fn live_objects(&self) -> usize {
        self.objects.iter().filter(|entry| entry.value().is_live()).count()
    }

    /// Drop table entries whose borrowed object is gone; persistent entries stay
    pub(super) fn prune_objects(&self) {
        self.objects.retain(|_, slot| slot.is_live());
    }
}
