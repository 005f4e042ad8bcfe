/*!
 * Runtime Configuration
 *
 * Defaults come from `core::limits`; `from_env` lets deployments override them.
 */

use super::limits::{DEFAULT_BASE_ADDRESS, DEFAULT_BLOCK_ALIGNMENT, DEFAULT_MEMORY_POOL};
use super::types::Size;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Simulated memory provider configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Total bytes the provider may hand out
    pub capacity: Size,
    /// First address of the simulated address space (never 0)
    pub base_address: Size,
    /// Alignment of every block start, a power of two
    pub alignment: Size,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_MEMORY_POOL,
            base_address: DEFAULT_BASE_ADDRESS,
            alignment: DEFAULT_BLOCK_ALIGNMENT,
        }
    }
}

impl MemoryConfig {
    /// Small pool for tests and short-lived tools (1MB)
    pub const fn small() -> Self {
        Self {
            capacity: 1024 * 1024,
            base_address: DEFAULT_BASE_ADDRESS,
            alignment: DEFAULT_BLOCK_ALIGNMENT,
        }
    }

    pub fn with_capacity(mut self, capacity: Size) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_base_address(mut self, base_address: Size) -> Self {
        self.base_address = base_address;
        self
    }

    pub fn with_alignment(mut self, alignment: Size) -> Self {
        self.alignment = alignment;
        self
    }

    /// Clamp values the provider cannot work with
    pub fn normalized(mut self) -> Self {
        if self.base_address == 0 {
            self.base_address = DEFAULT_BASE_ADDRESS;
        }
        if self.alignment == 0 || !self.alignment.is_power_of_two() {
            self.alignment = DEFAULT_BLOCK_ALIGNMENT;
        }
        self
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub memory: MemoryConfig,
    /// Fail on access through an untyped view instead of installing the default type
    pub strict_types: bool,
}

impl RuntimeConfig {
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }

    /// Build from defaults overridden by environment variables
    ///
    /// Environment variables:
    /// - MEMREF_MEMORY_POOL: pool capacity in bytes
    /// - MEMREF_BASE_ADDRESS: first simulated address (decimal or 0x-hex)
    /// - MEMREF_STRICT_TYPES: "1"/"true" to reject untyped access
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = env_size("MEMREF_MEMORY_POOL") {
            config.memory.capacity = capacity;
        }
        if let Some(base) = env_size("MEMREF_BASE_ADDRESS") {
            config.memory.base_address = base;
        }
        if let Ok(strict) = std::env::var("MEMREF_STRICT_TYPES") {
            config.strict_types = strict == "1" || strict.eq_ignore_ascii_case("true");
        }

        config.memory = config.memory.normalized();
        config
    }
}

fn env_size(key: &str) -> Option<Size> {
    let raw = std::env::var(key).ok()?;
    match parse_size(&raw) {
        Some(value) => Some(value),
        None => {
            warn!(key, value = %raw, "Ignoring unparsable size in environment");
            None
        }
    }
}

fn parse_size(raw: &str) -> Option<Size> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => Size::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}
