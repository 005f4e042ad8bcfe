/*!
 * Typed Access
 *
 * Dispatch of get/set by indirection: indirection 1 goes to the descriptor's
 * accessor, anything deeper reads or writes a pointer.
 */

use super::MemoryView;
use crate::core::errors::{RefError, RefResult};
use crate::core::types::Size;
use crate::types::{Type, TypeSpec, Value};
use tracing::{debug, warn};

impl MemoryView {
    /// Effective type for an access: the override if given, else the view's
    /// own type, else the opaque default
    ///
    /// The default is installed on the view, so the warning fires once per
    /// view. In strict mode a missing type is an error instead.
    pub fn resolve_type(&self, type_override: Option<TypeSpec>) -> RefResult<Type> {
        if let Some(spec) = type_override {
            return self.runtime().coerce_type(spec);
        }
        if let Some(ty) = self.ty() {
            return Ok(ty);
        }
        if self.runtime().strict_types() {
            return Err(RefError::invalid_state(format!(
                "no \"type\" set on view at 0x{}",
                self.hex_address()
            )));
        }

        warn!(view = %self, "No \"type\" found on view, setting default \"type\"");
        let ty = Type::unset(self.len());
        self.install_type(ty.clone());
        Ok(ty)
    }

    /// Read the value at `offset` using the view's type
    pub fn get(&self, offset: Size) -> RefResult<Value> {
        let ty = self.resolve_type(None)?;
        self.get_typed(offset, &ty)
    }

    /// Read the value at `offset` as `spec`
    pub fn get_as(&self, offset: Size, spec: impl Into<TypeSpec>) -> RefResult<Value> {
        let ty = self.resolve_type(Some(spec.into()))?;
        self.get_typed(offset, &ty)
    }

    /// Write `value` at `offset` using the view's type
    pub fn set(&self, offset: Size, value: impl Into<Value>) -> RefResult<()> {
        let ty = self.resolve_type(None)?;
        self.set_typed(offset, value.into(), &ty)
    }

    /// Write `value` at `offset` as `spec`
    pub fn set_as(&self, offset: Size, value: impl Into<Value>, spec: impl Into<TypeSpec>) -> RefResult<()> {
        let ty = self.resolve_type(Some(spec.into()))?;
        self.set_typed(offset, value.into(), &ty)
    }

    /// Read through an already-resolved type
    ///
    /// Above indirection 1 the result is a new view over the pointee, typed one
    /// level down. At indirection 2 the window spans the pointee's own size,
    /// deeper levels span one pointer.
    pub fn get_typed(&self, offset: Size, ty: &Type) -> RefResult<Value> {
        debug!(offset, ty = %ty, "get()");
        match ty.indirection() {
            0 => Err(RefError::invalid_state("\"indirection\" level must be at least 1")),
            1 => ty.accessor().get(self, offset),
            depth => {
                let len = if depth == 2 {
                    ty.size()
                } else {
                    self.runtime().provider().pointer_size()
                };
                let target = self.read_pointer(offset, len)?;
                target.install_type(ty.dereferenced()?);
                Ok(Value::View(target))
            }
        }
    }

    /// Write through an already-resolved type
    ///
    /// Above indirection 1 `value` must be a view (or null); its address is
    /// stored and the view is retained.
    pub fn set_typed(&self, offset: Size, value: Value, ty: &Type) -> RefResult<()> {
        debug!(offset, ty = %ty, value = ?value, "set()");
        match ty.indirection() {
            0 => Err(RefError::invalid_state("\"indirection\" level must be at least 1")),
            1 => ty.accessor().set(self, offset, value),
            _ => match value {
                Value::View(target) => self.write_pointer(offset, &target),
                Value::Null => self.store_address(offset, self.runtime().provider().null()),
                other => Err(RefError::invalid_input(format!(
                    "expected a view to store as {}, got {}",
                    ty,
                    other.kind_name()
                ))),
            },
        }
    }

    /// Pointer-sized view holding this view's address, retaining this view
    pub fn reference(&self) -> RefResult<MemoryView> {
        debug!(view = %self, "Creating a reference");
        let ty = self.resolve_type(None)?.referenced();
        self.runtime().alloc_with(ty, self.clone())
    }

    /// `get(0)` through the view's own type
    pub fn deref(&self) -> RefResult<Value> {
        debug!(view = %self, "Dereferencing");
        self.get(0)
    }
}
