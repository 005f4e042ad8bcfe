/*!
 * Type Registry
 *
 * Read-only table of primitive descriptors built once per runtime, plus the
 * coercion engine that turns specs like `"int32 **"` into descriptor chains.
 * Pointer coercions are memoized per (base name, depth).
 */

use super::descriptor::{Type, TypeSpec};
use super::primitives::Primitive;
use crate::core::errors::{RefError, RefResult};
use crate::memory::{MemoryProvider, PrimitiveKind};
use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const POINTER_ALIAS: &str = "pointer";
const STRING_ALIAS: &str = "string";
const DEPRECATED_UTF8_STRING: &str = "Utf8String";

static UTF8_STRING_WARNED: AtomicBool = AtomicBool::new(false);

/// Named primitive descriptors and the coercion engine
pub struct TypeRegistry {
    types: HashMap<String, Type, RandomState>,
    folded: HashMap<String, String, RandomState>,
    order: Vec<String>,
    derived: DashMap<(String, usize), Type, RandomState>,
}

impl TypeRegistry {
    /// Build the primitive table from the provider's size/alignment tables
    pub fn new(provider: &dyn MemoryProvider) -> RefResult<Self> {
        let mut registry = Self {
            types: HashMap::with_hasher(RandomState::new()),
            folded: HashMap::with_hasher(RandomState::new()),
            order: Vec::with_capacity(PrimitiveKind::BASE.len() + PrimitiveKind::C_ALIASES.len()),
            derived: DashMap::with_hasher(RandomState::new()),
        };

        for kind in PrimitiveKind::BASE {
            let ty = Type::primitive(
                kind,
                kind.name(),
                provider.size_of(kind),
                provider.align_of(kind),
                Arc::new(Primitive::new(kind)),
            );
            registry.insert(ty);
        }

        for alias in PrimitiveKind::C_ALIASES {
            let size = provider.size_of(alias);
            let base = fixed_width_kind(size, alias.is_unsigned_alias()).ok_or_else(|| {
                RefError::invalid_state(format!(
                    "{} has unsupported size {} (expected 1, 2, 4 or 8)",
                    alias, size
                ))
            })?;
            let ty = registry
                .types
                .get(base.name())
                .map(|base_ty| base_ty.renamed(alias.name(), alias))
                .ok_or_else(|| RefError::invalid_state(format!("missing base type {}", base)))?;
            registry.insert(ty);
        }

        debug!(types = registry.order.len(), "Type registry initialized");
        Ok(registry)
    }

    fn insert(&mut self, ty: Type) {
        if let Some(name) = ty.name().map(str::to_string) {
            self.folded.insert(name.to_ascii_lowercase(), name.clone());
            self.order.push(name.clone());
            self.types.insert(name, ty);
        }
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<Type> {
        self.types.get(name).cloned()
    }

    /// Descriptor of a primitive kind (C aliases included)
    pub fn primitive(&self, kind: PrimitiveKind) -> Option<Type> {
        match kind {
            PrimitiveKind::Pointer => self.coerce_name(POINTER_ALIAS).ok(),
            other => self.get(other.name()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Registered descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.order.iter().filter_map(move |name| self.types.get(name))
    }

    /// Number of memoized pointer descriptors
    pub fn derived_count(&self) -> usize {
        self.derived.len()
    }

    /// Resolve anything accepted as a type into a descriptor
    pub fn coerce(&self, spec: impl Into<TypeSpec>) -> RefResult<Type> {
        match spec.into() {
            TypeSpec::Type(ty) => Ok(ty),
            TypeSpec::Custom(custom) => custom.build(),
            TypeSpec::Name(name) => self.coerce_name(&name),
        }
    }

    /// Descriptor one pointer hop above `spec`
    pub fn ref_type(&self, spec: impl Into<TypeSpec>) -> RefResult<Type> {
        Ok(self.coerce(spec)?.referenced())
    }

    /// Descriptor one pointer hop below `spec`
    pub fn deref_type(&self, spec: impl Into<TypeSpec>) -> RefResult<Type> {
        self.coerce(spec)?.dereferenced()
    }

    fn coerce_name(&self, spec: &str) -> RefResult<Type> {
        if let Some(ty) = self.types.get(spec) {
            return Ok(ty.clone());
        }

        let compact: String = spec.chars().filter(|c| !c.is_whitespace()).collect();

        if compact.eq_ignore_ascii_case(POINTER_ALIAS) {
            return self.derive("void", 1, spec);
        }
        if compact.eq_ignore_ascii_case(STRING_ALIAS) {
            return self.lookup_base("CString", spec);
        }

        let base = compact.trim_end_matches('*');
        let depth = compact.len() - base.len();

        if base.is_empty() || base.contains('*') {
            return Err(invalid(spec));
        }

        let base_ty = self.lookup_base(base, spec)?;
        if depth == 0 {
            return Ok(base_ty);
        }

        match base_ty.name() {
            Some(name) => self.derive(name, depth, spec),
            None => Err(invalid(spec)),
        }
    }

    fn lookup_base(&self, base: &str, spec: &str) -> RefResult<Type> {
        if let Some(ty) = self.types.get(base) {
            return Ok(ty.clone());
        }

        if base.eq_ignore_ascii_case(DEPRECATED_UTF8_STRING) {
            if !UTF8_STRING_WARNED.swap(true, Ordering::Relaxed) {
                warn!("\"Utf8String\" type is deprecated, use \"CString\" instead");
            }
            return self.lookup_base("CString", spec);
        }

        self.folded
            .get(&base.to_ascii_lowercase())
            .and_then(|name| self.types.get(name))
            .cloned()
            .ok_or_else(|| invalid(spec))
    }

    fn derive(&self, base: &str, depth: usize, spec: &str) -> RefResult<Type> {
        let key = (base.to_string(), depth);
        if let Some(ty) = self.derived.get(&key) {
            return Ok(ty.clone());
        }

        let mut ty = self.types.get(base).cloned().ok_or_else(|| invalid(spec))?;
        for _ in 0..depth {
            ty = ty.referenced();
        }

        debug!(base, depth, "Memoized pointer type");
        Ok(self.derived.entry(key).or_insert(ty).clone())
    }
}

fn invalid(spec: &str) -> RefError {
    RefError::invalid_type(format!("{:?}", spec))
}

/// Fixed-width kind a C alias of `size` bytes maps to
fn fixed_width_kind(size: usize, unsigned: bool) -> Option<PrimitiveKind> {
    let kind = match (size, unsigned) {
        (1, false) => PrimitiveKind::Int8,
        (1, true) => PrimitiveKind::UInt8,
        (2, false) => PrimitiveKind::Int16,
        (2, true) => PrimitiveKind::UInt16,
        (4, false) => PrimitiveKind::Int32,
        (4, true) => PrimitiveKind::UInt32,
        (8, false) => PrimitiveKind::Int64,
        (8, true) => PrimitiveKind::UInt64,
        _ => return None,
    };
    Some(kind)
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.order)
            .field("derived", &self.derived.len())
            .finish()
    }
}
