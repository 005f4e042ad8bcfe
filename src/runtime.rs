/*!
 * Runtime
 *
 * Entry point bundling a memory provider, the type registry built from its
 * size tables, and configuration. Cheap to clone; every view keeps a handle
 * to the runtime that created it.
 */

use crate::codec::{CStringSource, Encoding};
use crate::core::config::RuntimeConfig;
use crate::core::errors::RefResult;
use crate::core::types::{Address, Endianness, Size};
use crate::memory::{MemoryManager, MemoryProvider, PrimitiveKind};
use crate::types::{Type, TypeRegistry, TypeSpec, Value};
use crate::view::MemoryView;
use std::sync::Arc;
use tracing::{debug, info};

/// Provider + registry + config
#[derive(Clone, Debug)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

#[derive(Debug)]
struct RuntimeInner {
    provider: Arc<dyn MemoryProvider>,
    registry: TypeRegistry,
    config: RuntimeConfig,
}

impl Runtime {
    pub fn new(provider: Arc<dyn MemoryProvider>) -> RefResult<Self> {
        Self::with_config(provider, RuntimeConfig::default())
    }

    pub fn with_config(provider: Arc<dyn MemoryProvider>, config: RuntimeConfig) -> RefResult<Self> {
        let registry = TypeRegistry::new(provider.as_ref())?;
        info!(
            types = registry.len(),
            strict_types = config.strict_types,
            "Runtime initialized"
        );
        Ok(Self {
            inner: Arc::new(RuntimeInner {
                provider,
                registry,
                config,
            }),
        })
    }

    /// Runtime over a fresh simulated address space
    pub fn simulated() -> RefResult<Self> {
        Self::simulated_with(RuntimeConfig::default())
    }

    /// Runtime over a simulated address space sized by `config.memory`
    pub fn simulated_with(config: RuntimeConfig) -> RefResult<Self> {
        let provider = MemoryManager::with_config(config.memory);
        Self::with_config(Arc::new(provider), config)
    }

    pub fn provider(&self) -> &Arc<dyn MemoryProvider> {
        &self.inner.provider
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn strict_types(&self) -> bool {
        self.inner.config.strict_types
    }

    /// The primitive table
    pub fn types(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    pub fn coerce_type(&self, spec: impl Into<TypeSpec>) -> RefResult<Type> {
        self.inner.registry.coerce(spec)
    }

    pub fn ref_type(&self, spec: impl Into<TypeSpec>) -> RefResult<Type> {
        self.inner.registry.ref_type(spec)
    }

    pub fn deref_type(&self, spec: impl Into<TypeSpec>) -> RefResult<Type> {
        self.inner.registry.deref_type(spec)
    }

    pub fn size_of(&self, kind: PrimitiveKind) -> Size {
        self.inner.provider.size_of(kind)
    }

    pub fn align_of(&self, kind: PrimitiveKind) -> Size {
        self.inner.provider.align_of(kind)
    }

    pub fn endianness(&self) -> Endianness {
        Endianness::host()
    }

    /// Zero-filled view big enough for one `spec`
    ///
    /// Pointer types (indirection > 1) get one native pointer.
    pub fn alloc(&self, spec: impl Into<TypeSpec>) -> RefResult<MemoryView> {
        let ty = self.coerce_type(spec)?;
        let size = if ty.indirection() == 1 {
            ty.size()
        } else {
            self.inner.provider.pointer_size()
        };
        let address = self.inner.provider.allocate(size)?;
        debug!(ty = %ty, size, address, "Allocated view");
        Ok(MemoryView::owned(self.clone(), address, size, Some(ty)))
    }

    /// [`Runtime::alloc`] followed by `set(0, value)`; `Value::Null` leaves the
    /// bytes zeroed
    pub fn alloc_with(&self, spec: impl Into<TypeSpec>, value: impl Into<Value>) -> RefResult<MemoryView> {
        let ty = self.coerce_type(spec)?;
        let view = self.alloc(ty.clone())?;
        let value = value.into();
        if !value.is_null() {
            view.set_typed(0, value, &ty)?;
        }
        Ok(view)
    }

    /// NUL-terminated copy of a string, typed `char*`
    ///
    /// Null input (or a view at the null address) yields the null view. The
    /// allocation holds the encoded text plus one code unit of terminator.
    pub fn alloc_cstring(&self, source: impl Into<CStringSource>, encoding: Encoding) -> RefResult<MemoryView> {
        let text = match source.into() {
            CStringSource::Null => return Ok(self.null()),
            CStringSource::View(view) if view.is_null() => return Ok(view),
            CStringSource::View(view) => view.read_cstring(0, encoding)?,
            CStringSource::Text(text) => text,
        };

        let size = encoding.encoded_len(&text) + encoding.unit_width();
        let address = self.inner.provider.allocate(size)?;
        let view = MemoryView::owned(self.clone(), address, size, Some(self.coerce_type("char *")?));
        view.write_cstring(0, &text, encoding)?;
        Ok(view)
    }

    /// Owned, untyped copy of `bytes`
    pub fn from_bytes(&self, bytes: &[u8]) -> RefResult<MemoryView> {
        let address = self.inner.provider.allocate(bytes.len())?;
        let view = MemoryView::owned(self.clone(), address, bytes.len(), None);
        view.write_bytes(0, bytes)?;
        Ok(view)
    }

    /// Non-owning view over memory at `address`
    pub fn wrap(&self, address: Address, len: Size, ty: Option<Type>) -> MemoryView {
        MemoryView::window(self.clone(), address, len, ty)
    }

    /// Zero-length void view at the null address
    pub fn null(&self) -> MemoryView {
        let void = self.inner.registry.get(PrimitiveKind::Void.name());
        MemoryView::window(self.clone(), self.inner.provider.null(), 0, void)
    }

    /// Fresh `void*` holding the null address
    pub fn null_pointer(&self) -> RefResult<MemoryView> {
        self.alloc("pointer")
    }
}
