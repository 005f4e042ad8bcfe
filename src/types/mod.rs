/*!
 * Type System
 * Descriptors, the primitive table and spec coercion
 */

pub mod descriptor;
mod primitives;
pub mod registry;
pub mod value;

pub use crate::memory::PrimitiveKind;
pub use descriptor::{CustomType, Type, TypeAccessor, TypeInfo, TypeSpec};
pub use registry::TypeRegistry;
pub use value::Value;
