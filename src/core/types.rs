/*!
 * Core Types
 * Common types used across the crate
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address type for memory operations
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Byte order of a multi-byte value in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the host this crate was compiled for
    pub const fn host() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub fn is_host(self) -> bool {
        self == Self::host()
    }

    /// Short suffix, "LE" or "BE"
    pub fn suffix(self) -> &'static str {
        match self {
            Endianness::Little => "LE",
            Endianness::Big => "BE",
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Format an address the way diagnostics print it (no `0x` prefix, lowercase)
pub fn format_hex_address(address: Address) -> String {
    format!("{:x}", address)
}
