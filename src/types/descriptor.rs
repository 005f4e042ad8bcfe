/*!
 * Type Descriptors
 *
 * A descriptor says how many bytes a value takes, how it is aligned, how many
 * pointer hops sit above the value (`indirection`), and how to decode/encode
 * it at indirection 1.
 *
 * Pointer descriptors are derived with an explicit parent link: a derived
 * descriptor only states what differs (indirection, name) and delegates
 * size, alignment and accessor to its parent.
 */

use super::value::Value;
use crate::core::errors::{RefError, RefResult};
use crate::core::types::Size;
use crate::memory::PrimitiveKind;
use crate::view::MemoryView;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Decode/encode behaviour of a descriptor at indirection 1
///
/// Never invoked for indirection > 1; the view layer handles pointer hops.
pub trait TypeAccessor: Send + Sync {
    fn get(&self, view: &MemoryView, offset: Size) -> RefResult<Value>;

    fn set(&self, view: &MemoryView, offset: Size, value: Value) -> RefResult<()>;
}

/// Accessor of a descriptor nobody gave behaviour to
pub(crate) struct UnknownAccessor;

impl TypeAccessor for UnknownAccessor {
    fn get(&self, _view: &MemoryView, _offset: Size) -> RefResult<Value> {
        Err(RefError::invalid_state("unknown \"type\"; cannot get()"))
    }

    fn set(&self, _view: &MemoryView, _offset: Size, _value: Value) -> RefResult<()> {
        Err(RefError::invalid_state("unknown \"type\"; cannot set()"))
    }
}

/// An immutable type descriptor
///
/// Cloning is cheap and preserves identity; see [`Type::same`].
#[derive(Clone)]
pub struct Type {
    inner: Arc<TypeInner>,
}

struct TypeInner {
    name: Option<String>,
    size: Option<Size>,
    alignment: Option<Size>,
    indirection: usize,
    accessor: Option<Arc<dyn TypeAccessor>>,
    kind: Option<PrimitiveKind>,
    parent: Option<Type>,
}

impl Type {
    pub(crate) fn primitive(
        kind: PrimitiveKind,
        name: &str,
        size: Size,
        alignment: Size,
        accessor: Arc<dyn TypeAccessor>,
    ) -> Self {
        Self::from_inner(TypeInner {
            name: Some(name.to_string()),
            size: Some(size),
            alignment: Some(alignment),
            indirection: 1,
            accessor: Some(accessor),
            kind: Some(kind),
            parent: None,
        })
    }

    /// Placeholder installed on a view that was never given a type
    pub(crate) fn unset(size: Size) -> Self {
        Self::from_inner(TypeInner {
            name: None,
            size: Some(size),
            alignment: None,
            indirection: 1,
            accessor: Some(Arc::new(UnknownAccessor)),
            kind: None,
            parent: None,
        })
    }

    fn from_inner(inner: TypeInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Copy of this descriptor under another name
    pub(crate) fn renamed(&self, name: &str, kind: PrimitiveKind) -> Self {
        Self::from_inner(TypeInner {
            name: Some(name.to_string()),
            size: Some(self.size()),
            alignment: self.alignment(),
            indirection: self.indirection(),
            accessor: Some(self.accessor()),
            kind: Some(kind),
            parent: None,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.inner
            .name
            .as_deref()
            .or_else(|| self.inner.parent.as_ref().and_then(|p| p.name()))
    }

    pub fn size(&self) -> Size {
        match (self.inner.size, &self.inner.parent) {
            (Some(size), _) => size,
            (None, Some(parent)) => parent.size(),
            (None, None) => 0,
        }
    }

    pub fn alignment(&self) -> Option<Size> {
        match (self.inner.alignment, &self.inner.parent) {
            (Some(alignment), _) => Some(alignment),
            (None, Some(parent)) => parent.alignment(),
            (None, None) => None,
        }
    }

    pub fn indirection(&self) -> usize {
        self.inner.indirection
    }

    pub fn is_pointer(&self) -> bool {
        self.inner.indirection > 1
    }

    /// Primitive kind this descriptor (or the one it derives from) was built for
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self.inner.kind {
            Some(kind) => Some(kind),
            None => self.inner.parent.as_ref().and_then(|p| p.kind()),
        }
    }

    /// Descriptor this one delegates to, if any
    pub fn parent(&self) -> Option<&Type> {
        self.inner.parent.as_ref()
    }

    pub fn accessor(&self) -> Arc<dyn TypeAccessor> {
        match (&self.inner.accessor, &self.inner.parent) {
            (Some(accessor), _) => Arc::clone(accessor),
            (None, Some(parent)) => parent.accessor(),
            (None, None) => Arc::new(UnknownAccessor),
        }
    }

    /// Identity comparison
    pub fn same(a: &Type, b: &Type) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Descriptor one pointer hop above this one
    pub fn referenced(&self) -> Type {
        Self::from_inner(TypeInner {
            name: self.name().map(|name| format!("{}*", name)),
            size: None,
            alignment: None,
            indirection: self.inner.indirection + 1,
            accessor: None,
            kind: None,
            parent: Some(self.clone()),
        })
    }

    /// Descriptor one pointer hop below this one
    ///
    /// Returns the parent when this descriptor was derived from a base exactly
    /// one level down; otherwise builds an equivalent descriptor.
    pub fn dereferenced(&self) -> RefResult<Type> {
        if self.inner.indirection == 1 {
            return Err(RefError::invalid_operation(
                "cannot create deref'd type for type with indirection 1",
            ));
        }

        if let Some(parent) = &self.inner.parent {
            if parent.indirection() == self.inner.indirection - 1 {
                return Ok(parent.clone());
            }
        }

        Ok(Self::from_inner(TypeInner {
            name: self
                .name()
                .map(|name| name.strip_suffix('*').unwrap_or(name).to_string()),
            size: None,
            alignment: None,
            indirection: self.inner.indirection - 1,
            accessor: None,
            kind: None,
            parent: Some(self.clone()),
        }))
    }

    /// Serializable snapshot for diagnostics
    pub fn info(&self) -> TypeInfo {
        TypeInfo {
            name: self.name().map(str::to_string),
            size: self.size(),
            alignment: self.alignment(),
            indirection: self.indirection(),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name())
            .field("size", &self.size())
            .field("alignment", &self.alignment())
            .field("indirection", &self.indirection())
            .finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "<anonymous {}-byte type>", self.size()),
        }
    }
}

/// Descriptor snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: Option<String>,
    pub size: Size,
    pub alignment: Option<Size>,
    pub indirection: usize,
}

/// A caller-assembled descriptor, validated when coerced
///
/// `size` and `indirection` are mandatory; coercion rejects a descriptor
/// missing either.
#[derive(Clone, Default)]
pub struct CustomType {
    pub name: Option<String>,
    pub size: Option<Size>,
    pub alignment: Option<Size>,
    pub indirection: Option<usize>,
    pub accessor: Option<Arc<dyn TypeAccessor>>,
}

impl CustomType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_alignment(mut self, alignment: Size) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_indirection(mut self, indirection: usize) -> Self {
        self.indirection = Some(indirection);
        self
    }

    pub fn with_accessor(mut self, accessor: Arc<dyn TypeAccessor>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Validate into a descriptor
    pub fn build(self) -> RefResult<Type> {
        match (self.size, self.indirection) {
            (Some(size), Some(indirection)) if indirection >= 1 => Ok(Type::from_inner(TypeInner {
                name: self.name,
                size: Some(size),
                alignment: self.alignment,
                indirection,
                accessor: Some(self.accessor.unwrap_or_else(|| Arc::new(UnknownAccessor))),
                kind: None,
                parent: None,
            })),
            _ => Err(RefError::invalid_type(format!("{:?}", self))),
        }
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("alignment", &self.alignment)
            .field("indirection", &self.indirection)
            .field("accessor", &self.accessor.is_some())
            .finish()
    }
}

/// Anything `coerce_type` accepts
#[derive(Debug, Clone)]
pub enum TypeSpec {
    Type(Type),
    Name(String),
    Custom(CustomType),
}

impl From<Type> for TypeSpec {
    fn from(t: Type) -> Self {
        TypeSpec::Type(t)
    }
}

impl From<&Type> for TypeSpec {
    fn from(t: &Type) -> Self {
        TypeSpec::Type(t.clone())
    }
}

impl From<&str> for TypeSpec {
    fn from(s: &str) -> Self {
        TypeSpec::Name(s.to_string())
    }
}

impl From<String> for TypeSpec {
    fn from(s: String) -> Self {
        TypeSpec::Name(s)
    }
}

impl From<&String> for TypeSpec {
    fn from(s: &String) -> Self {
        TypeSpec::Name(s.clone())
    }
}

impl From<CustomType> for TypeSpec {
    fn from(c: CustomType) -> Self {
        TypeSpec::Custom(c)
    }
}

impl From<PrimitiveKind> for TypeSpec {
    fn from(kind: PrimitiveKind) -> Self {
        TypeSpec::Name(kind.name().to_string())
    }
}
