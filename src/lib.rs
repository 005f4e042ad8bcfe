/*!
 * memref
 * Typed views over raw memory: type descriptors, pointer chains of any depth,
 * manual keep-alive tracking, and 64-bit integer / C-string codecs
 */

pub mod codec;
pub mod core;
pub mod memory;
pub mod monitoring;
pub mod runtime;
pub mod types;
pub mod view;

// Re-exports
pub use crate::core::{Endianness, MemoryConfig, RefError, RefResult, RuntimeConfig};
pub use codec::{CStringSource, Encoding, Signedness};
pub use memory::{MemoryError, MemoryManager, MemoryProvider, MemoryStats, ObjectHandle, PrimitiveKind};
pub use monitoring::init_tracing;
pub use runtime::Runtime;
pub use types::{CustomType, Type, TypeAccessor, TypeInfo, TypeRegistry, TypeSpec, Value};
pub use view::{MemoryView, Retained};
