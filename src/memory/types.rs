/*!
 * Memory Types
 * Common types for the memory provider
 */

use crate::core::types::{Address, Size};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// A managed object that can be embedded into raw memory by handle
pub type ObjectHandle = Arc<dyn Any + Send + Sync>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes, available {available} bytes ({used} used / {total} total)")]
    OutOfMemory {
        requested: usize,
        available: usize,
        used: usize,
        total: usize,
    },

    #[error("Invalid memory address: 0x{0:x}")]
    InvalidAddress(usize),

    #[error("Null address access")]
    NullAddress,

    #[error("No run of {width} zero bytes before mapped memory ends (scanned {scanned} bytes from 0x{address:x})")]
    UnterminatedScan {
        address: usize,
        width: usize,
        scanned: usize,
    },

    #[error("No live object behind handle stored at 0x{0:x}")]
    DanglingObject(usize),
}

/// Primitive kinds the provider knows the native size and alignment of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    Pointer,
    Object,
    CString,
    Byte,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    SizeT,
    WcharT,
}

impl PrimitiveKind {
    /// Fixed-width and special kinds, each with its own accessor
    pub const BASE: [PrimitiveKind; 14] = [
        PrimitiveKind::Void,
        PrimitiveKind::Bool,
        PrimitiveKind::Int8,
        PrimitiveKind::UInt8,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Object,
        PrimitiveKind::CString,
    ];

    /// C type aliases, resolved to a fixed-width kind of the same size and sign
    pub const C_ALIASES: [PrimitiveKind; 13] = [
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::UChar,
        PrimitiveKind::Short,
        PrimitiveKind::UShort,
        PrimitiveKind::Int,
        PrimitiveKind::UInt,
        PrimitiveKind::Long,
        PrimitiveKind::ULong,
        PrimitiveKind::LongLong,
        PrimitiveKind::ULongLong,
        PrimitiveKind::SizeT,
        PrimitiveKind::WcharT,
    ];

    /// Registry name of the kind
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::UInt16 => "uint16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::UInt32 => "uint32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::UInt64 => "uint64",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Pointer => "pointer",
            PrimitiveKind::Object => "Object",
            PrimitiveKind::CString => "CString",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::UChar => "uchar",
            PrimitiveKind::Short => "short",
            PrimitiveKind::UShort => "ushort",
            PrimitiveKind::Int => "int",
            PrimitiveKind::UInt => "uint",
            PrimitiveKind::Long => "long",
            PrimitiveKind::ULong => "ulong",
            PrimitiveKind::LongLong => "longlong",
            PrimitiveKind::ULongLong => "ulonglong",
            PrimitiveKind::SizeT => "size_t",
            PrimitiveKind::WcharT => "wchar_t",
        }
    }

    /// Whether a C alias is unsigned: `byte`, `size_t` and every `u*` name
    pub fn is_unsigned_alias(self) -> bool {
        let name = self.name();
        name == "byte" || name == "size_t" || name.starts_with('u')
    }

    /// Size of the kind on the host
    pub fn native_size(self) -> Size {
        use std::ffi::{c_char, c_int, c_long, c_longlong, c_short};
        use std::mem::size_of;
        match self {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Bool => size_of::<bool>(),
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 | PrimitiveKind::Byte => 1,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 => 2,
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 | PrimitiveKind::Float => 4,
            PrimitiveKind::Int64 | PrimitiveKind::UInt64 | PrimitiveKind::Double => 8,
            PrimitiveKind::Pointer | PrimitiveKind::Object | PrimitiveKind::CString => {
                size_of::<usize>()
            }
            PrimitiveKind::Char | PrimitiveKind::UChar => size_of::<c_char>(),
            PrimitiveKind::Short | PrimitiveKind::UShort => size_of::<c_short>(),
            PrimitiveKind::Int | PrimitiveKind::UInt => size_of::<c_int>(),
            PrimitiveKind::Long | PrimitiveKind::ULong => size_of::<c_long>(),
            PrimitiveKind::LongLong | PrimitiveKind::ULongLong => size_of::<c_longlong>(),
            PrimitiveKind::SizeT => size_of::<usize>(),
            PrimitiveKind::WcharT => WCHAR_SIZE,
        }
    }

    /// Alignment of the kind on the host
    pub fn native_align(self) -> Size {
        use std::ffi::{c_char, c_int, c_long, c_longlong, c_short};
        use std::mem::align_of;
        match self {
            PrimitiveKind::Void => 1,
            PrimitiveKind::Bool => align_of::<bool>(),
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 | PrimitiveKind::Byte => 1,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 => align_of::<i16>(),
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 => align_of::<i32>(),
            PrimitiveKind::Int64 | PrimitiveKind::UInt64 => align_of::<i64>(),
            PrimitiveKind::Float => align_of::<f32>(),
            PrimitiveKind::Double => align_of::<f64>(),
            PrimitiveKind::Pointer | PrimitiveKind::Object | PrimitiveKind::CString => {
                align_of::<usize>()
            }
            PrimitiveKind::Char | PrimitiveKind::UChar => align_of::<c_char>(),
            PrimitiveKind::Short | PrimitiveKind::UShort => align_of::<c_short>(),
            PrimitiveKind::Int | PrimitiveKind::UInt => align_of::<c_int>(),
            PrimitiveKind::Long | PrimitiveKind::ULong => align_of::<c_long>(),
            PrimitiveKind::LongLong | PrimitiveKind::ULongLong => align_of::<c_longlong>(),
            PrimitiveKind::SizeT => align_of::<usize>(),
            PrimitiveKind::WcharT => WCHAR_SIZE,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(windows)]
const WCHAR_SIZE: Size = 2;
#[cfg(not(windows))]
const WCHAR_SIZE: Size = 4;

/// A mapped block of simulated memory
#[derive(Debug, Clone)]
pub struct MemoryBlock {
    pub address: Address,
    /// Bytes the caller asked for
    pub size: Size,
    /// Bytes reserved in the address space, including alignment padding
    pub reserved: Size,
    pub data: Vec<u8>,
}

impl MemoryBlock {
    pub fn new(address: Address, size: Size, reserved: Size) -> Self {
        Self {
            address,
            size,
            reserved,
            data: vec![0u8; size],
        }
    }

    /// One past the last mapped byte
    pub fn end(&self) -> Address {
        self.address + self.size
    }

    pub fn contains(&self, address: Address) -> bool {
        address >= self.address && address < self.end()
    }
}

/// Memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memory: usize,
    pub used_memory: usize,
    pub available_memory: usize,
    pub usage_percentage: f64,
    pub allocated_blocks: usize,
    pub peak_memory: usize,
    pub allocation_count: usize,
    pub release_count: usize,
    pub live_objects: usize,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::from_ratio(self.usage_percentage / 100.0)
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn from_ratio(ratio: f64) -> Self {
        use crate::core::limits::{
            PRESSURE_CRITICAL_THRESHOLD, PRESSURE_MEDIUM_THRESHOLD, PRESSURE_WARNING_THRESHOLD,
        };
        if ratio >= PRESSURE_CRITICAL_THRESHOLD {
            MemoryPressure::Critical
        } else if ratio >= PRESSURE_WARNING_THRESHOLD {
            MemoryPressure::High
        } else if ratio >= PRESSURE_MEDIUM_THRESHOLD {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
