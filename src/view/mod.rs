/*!
 * Memory Views
 *
 * A view is a typed, lightweight alias over a byte region. Clones share the
 * region, the type slot and the retention list; two views over overlapping
 * bytes see each other's writes immediately.
 *
 * Views created by allocation own their bytes and release them once the last
 * handle drops. Views produced by pointer reads, `reinterpret` and `slice`
 * only alias memory.
 */

mod access;
mod region;
mod retention;

pub use retention::Retained;

use crate::codec::int64::{self, Signedness};
use crate::codec::Encoding;
use crate::core::errors::{RefError, RefResult};
use crate::core::limits::INT64_WIDTH;
use crate::core::types::{format_hex_address, Address, Endianness, Size};
use crate::memory::{MemoryProvider, ObjectHandle, PrimitiveKind};
use crate::runtime::Runtime;
use crate::types::{Type, Value};
use parking_lot::{Mutex, RwLock};
use region::Region;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Typed alias over a byte region
#[derive(Clone)]
pub struct MemoryView {
    inner: Arc<ViewInner>,
}

struct ViewInner {
    runtime: Runtime,
    region: Region,
    ty: RwLock<Option<Type>>,
    retained: Mutex<Vec<Retained>>,
}

impl MemoryView {
    fn from_region(runtime: Runtime, region: Region, ty: Option<Type>) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                runtime,
                region,
                ty: RwLock::new(ty),
                retained: Mutex::new(Vec::new()),
            }),
        }
    }

    /// View owning a fresh provider allocation
    pub(crate) fn owned(runtime: Runtime, address: Address, len: Size, ty: Option<Type>) -> Self {
        let region = Region::owned(Arc::clone(runtime.provider()), address, len);
        Self::from_region(runtime, region, ty)
    }

    /// View aliasing memory owned elsewhere
    pub(crate) fn window(runtime: Runtime, address: Address, len: Size, ty: Option<Type>) -> Self {
        let region = Region::window(Arc::clone(runtime.provider()), address, len);
        Self::from_region(runtime, region, ty)
    }

    fn sub_window(&self, address: Address, len: Size, ty: Option<Type>) -> Self {
        Self::window(self.inner.runtime.clone(), address, len, ty)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    fn provider(&self) -> &Arc<dyn MemoryProvider> {
        self.inner.region.provider()
    }

    pub fn address(&self) -> Address {
        self.inner.region.address()
    }

    /// Address `offset` bytes from the start of the view
    pub fn address_at(&self, offset: isize) -> Address {
        self.address().wrapping_add_signed(offset)
    }

    pub fn hex_address(&self) -> String {
        self.provider().hex_address(self.address())
    }

    pub fn is_null(&self) -> bool {
        self.provider().is_null(self.address())
    }

    pub fn len(&self) -> Size {
        self.inner.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this view owns its bytes
    pub fn is_owner(&self) -> bool {
        self.inner.region.is_owned()
    }

    /// Whether both handles are clones of one view
    pub fn same_view(&self, other: &MemoryView) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Type currently attached to the view
    pub fn ty(&self) -> Option<Type> {
        self.inner.ty.read().clone()
    }

    /// Attach a type; anything `coerce_type` accepts works
    pub fn set_type(&self, spec: impl Into<crate::types::TypeSpec>) -> RefResult<()> {
        let ty = self.inner.runtime.coerce_type(spec)?;
        *self.inner.ty.write() = Some(ty);
        Ok(())
    }

    /// Builder form of [`MemoryView::set_type`]
    pub fn with_type(self, spec: impl Into<crate::types::TypeSpec>) -> RefResult<Self> {
        self.set_type(spec)?;
        Ok(self)
    }

    pub(crate) fn install_type(&self, ty: Type) {
        *self.inner.ty.write() = Some(ty);
    }

    /// Provider address of `[offset, offset + width)`, or why it is not accessible
    fn check_access(&self, offset: Size, width: Size) -> RefResult<Address> {
        if self.is_null() {
            return Err(RefError::null_dereference(format!(
                "cannot access {} bytes at offset {} of a NULL view",
                width, offset
            )));
        }
        match offset.checked_add(width) {
            Some(end) if end <= self.len() => {
                self.address_of(end)?;
                self.address_of(offset)
            }
            _ => Err(RefError::range(format!(
                "access of {} bytes at offset {} is outside a {}-byte view",
                width,
                offset,
                self.len()
            ))),
        }
    }

    /// Address `offset` bytes past the start, or a range error when that
    /// leaves the address space
    fn address_of(&self, offset: Size) -> RefResult<Address> {
        self.address().checked_add(offset).ok_or_else(|| {
            RefError::range(format!(
                "offset {} from 0x{} is outside the address space",
                offset,
                self.hex_address()
            ))
        })
    }

    pub fn read_bytes(&self, offset: Size, len: Size) -> RefResult<Vec<u8>> {
        let address = self.check_access(offset, len)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        Ok(self.provider().read_bytes(address, len)?)
    }

    pub fn write_bytes(&self, offset: Size, data: &[u8]) -> RefResult<()> {
        let address = self.check_access(offset, data.len())?;
        if data.is_empty() {
            return Ok(());
        }
        Ok(self.provider().write_bytes(address, data)?)
    }

    /// Copy of every byte in the view
    pub fn to_bytes(&self) -> RefResult<Vec<u8>> {
        self.read_bytes(0, self.len())
    }

    /// Overwrite every byte in the view with `byte`
    pub fn fill(&self, byte: u8) -> RefResult<()> {
        self.write_bytes(0, &vec![byte; self.len()])
    }

    /// Read the pointer at `offset` as a window of `len` bytes
    ///
    /// A null pointer yields a zero-length null view. The window does not
    /// retain this view.
    pub fn read_pointer(&self, offset: Size, len: Size) -> RefResult<MemoryView> {
        let address = self.check_access(offset, self.provider().pointer_size())?;
        let target = self.provider().read_pointer(address)?;
        if self.provider().is_null(target) {
            return Ok(self.sub_window(target, 0, None));
        }
        Ok(self.sub_window(target, len, None))
    }

    /// Store the address of `target` at `offset` and retain `target`
    pub fn write_pointer(&self, offset: Size, target: &MemoryView) -> RefResult<()> {
        self.write_pointer_unretained(offset, target)?;
        self.attach(target);
        Ok(())
    }

    /// [`MemoryView::write_pointer`] without retention; the caller keeps
    /// `target` alive
    pub fn write_pointer_unretained(&self, offset: Size, target: &MemoryView) -> RefResult<()> {
        debug!(offset, target = %target.hex_address(), "Writing pointer");
        self.store_address(offset, target.address())
    }

    pub(crate) fn store_address(&self, offset: Size, target: Address) -> RefResult<()> {
        let address = self.check_access(offset, self.provider().pointer_size())?;
        Ok(self.provider().write_pointer(address, target)?)
    }

    /// Managed object whose handle is stored at `offset`, or `Value::Null`
    pub fn read_object(&self, offset: Size) -> RefResult<Value> {
        let width = self.provider().size_of(PrimitiveKind::Object);
        let address = self.check_access(offset, width)?;
        Ok(match self.provider().read_object(address)? {
            Some(object) => Value::Object(object),
            None => Value::Null,
        })
    }

    /// Embed `object` at `offset` and retain it
    ///
    /// A persistent store stays in the provider's object table for the life
    /// of the provider, even after the slot is overwritten or its block is
    /// released.
    pub fn write_object(&self, offset: Size, object: ObjectHandle, persistent: bool) -> RefResult<()> {
        self.write_object_unretained(offset, Arc::clone(&object), persistent)?;
        self.attach(object);
        Ok(())
    }

    /// [`MemoryView::write_object`] without retention
    pub fn write_object_unretained(
        &self,
        offset: Size,
        object: ObjectHandle,
        persistent: bool,
    ) -> RefResult<()> {
        let width = self.provider().size_of(PrimitiveKind::Object);
        let address = self.check_access(offset, width)?;
        debug!(offset, persistent, "Writing object handle");
        Ok(self.provider().write_object(address, object, persistent)?)
    }

    /// New void-typed view of `size` bytes at `offset`, retaining this one
    ///
    /// The window may extend past this view; whether those bytes are mapped
    /// is the provider's concern.
    pub fn reinterpret(&self, size: Size, offset: Size) -> RefResult<MemoryView> {
        let window = self.reinterpret_unretained(size, offset)?;
        window.attach(self);
        Ok(window)
    }

    /// [`MemoryView::reinterpret`] without retention
    pub fn reinterpret_unretained(&self, size: Size, offset: Size) -> RefResult<MemoryView> {
        if self.is_null() {
            return Err(RefError::null_dereference("cannot reinterpret a NULL view"));
        }
        debug!(size, offset, "Reinterpreting view");
        let address = self.address_of(offset)?;
        let void = self.inner.runtime.coerce_type("void")?;
        Ok(self.sub_window(address, size, Some(void)))
    }

    /// Reinterpret up to the first run of `width` zero bytes aligned to
    /// `width` from `offset`
    ///
    /// The scan is bounded only by mapped memory, not by this view's length.
    /// Unterminated data is read past the end of its allocation.
    pub fn reinterpret_until_zeros(&self, width: Size, offset: Size) -> RefResult<MemoryView> {
        let window = self.reinterpret_until_zeros_unretained(width, offset)?;
        window.attach(self);
        Ok(window)
    }

    /// [`MemoryView::reinterpret_until_zeros`] without retention
    pub fn reinterpret_until_zeros_unretained(&self, width: Size, offset: Size) -> RefResult<MemoryView> {
        let len = self.scan_zeros(width, offset)?;
        self.reinterpret_unretained(len, offset)
    }

    fn scan_zeros(&self, width: Size, offset: Size) -> RefResult<Size> {
        if self.is_null() {
            return Err(RefError::null_dereference("cannot scan a NULL view"));
        }
        if width == 0 {
            return Err(RefError::invalid_input("terminator width must be at least 1"));
        }
        if offset > self.len() {
            return Err(RefError::range(format!(
                "offset {} is outside a {}-byte view",
                offset,
                self.len()
            )));
        }
        Ok(self.provider().scan_zeros(self.address_of(offset)?, width)?)
    }

    /// Untyped window over `[start, end)`, retaining this view
    pub fn slice(&self, start: Size, end: Size) -> RefResult<MemoryView> {
        if start > end {
            return Err(RefError::range(format!("slice start {} is past end {}", start, end)));
        }
        let address = self.check_access(start, end - start)?;
        let window = self.sub_window(address, end - start, None);
        window.attach(self);
        Ok(window)
    }

    /// Decode the NUL-terminated string starting at `offset`
    ///
    /// The scan stops at the first zero code unit of `encoding`, so UTF-16LE
    /// text ends at an aligned pair of zero bytes.
    pub fn read_cstring(&self, offset: Size, encoding: Encoding) -> RefResult<String> {
        let len = self.scan_zeros(encoding.unit_width(), offset)?;
        let bytes = if len == 0 {
            Vec::new()
        } else {
            self.provider().read_bytes(self.address_of(offset)?, len)?
        };
        Ok(encoding.decode(&bytes))
    }

    /// Encode `text` at `offset`, truncated to whole characters that leave
    /// room for the terminator, followed by the terminator
    ///
    /// The terminator is one code unit wide: a single NUL for byte encodings,
    /// two zero bytes for UTF-16LE, rather than always a single NUL byte.
    /// Fails with a range error when the terminator itself does not fit.
    pub fn write_cstring(&self, offset: Size, text: &str, encoding: Encoding) -> RefResult<()> {
        if self.is_null() {
            return Err(RefError::null_dereference("cannot write a string to a NULL view"));
        }
        let room = self
            .len()
            .checked_sub(offset)
            .and_then(|room| room.checked_sub(encoding.unit_width()))
            .ok_or_else(|| {
                RefError::range(format!(
                    "no room for a terminator at offset {} of a {}-byte view",
                    offset,
                    self.len()
                ))
            })?;
        let encoded = encoding.encode_within(text, room);
        self.write_bytes(offset, &encoded)?;
        self.write_bytes(offset + encoded.len(), &vec![0u8; encoding.unit_width()])
    }

    pub fn read_int64(&self, offset: Size, order: Endianness) -> RefResult<Value> {
        self.read_64(offset, Signedness::Signed, order)
    }

    pub fn read_uint64(&self, offset: Size, order: Endianness) -> RefResult<Value> {
        self.read_64(offset, Signedness::Unsigned, order)
    }

    /// Store a signed 64-bit integer given as a number or numeric text
    pub fn write_int64(&self, offset: Size, value: impl Into<Value>, order: Endianness) -> RefResult<()> {
        self.write_64(offset, value.into(), Signedness::Signed, order)
    }

    /// Store an unsigned 64-bit integer given as a number or numeric text
    pub fn write_uint64(&self, offset: Size, value: impl Into<Value>, order: Endianness) -> RefResult<()> {
        self.write_64(offset, value.into(), Signedness::Unsigned, order)
    }

    fn read_64(&self, offset: Size, signedness: Signedness, order: Endianness) -> RefResult<Value> {
        let bytes = self.read_bytes(offset, INT64_WIDTH)?;
        int64::decode(&bytes, signedness, order)
    }

    fn write_64(&self, offset: Size, value: Value, signedness: Signedness, order: Endianness) -> RefResult<()> {
        self.check_access(offset, INT64_WIDTH)?;
        let bytes = int64::encode(&value, signedness, order)?;
        self.write_bytes(offset, &bytes)
    }
}

impl fmt::Display for MemoryView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MemoryView@0x{} [{} bytes", format_hex_address(self.address()), self.len())?;
        match self.inner.ty.try_read().as_deref() {
            Some(Some(ty)) => write!(f, ", {}]", ty),
            _ => write!(f, "]"),
        }
    }
}

impl fmt::Debug for MemoryView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MemoryView")
            .field("address", &format!("0x{}", format_hex_address(self.address())))
            .field("len", &self.len())
            .field("owned", &self.is_owner())
            .field("type", &self.inner.ty.try_read().as_deref().cloned().flatten())
            .field("retained", &self.inner.retained.try_lock().map(|r| r.len()))
            .finish()
    }
}
