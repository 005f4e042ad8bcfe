/*!
 * Limits and Constants
 *
 * Centralized location for defaults used by the simulated memory provider
 * and the runtime. Grouped by domain.
 */

// =============================================================================
// SIMULATED ADDRESS SPACE
// =============================================================================

/// Total simulated memory pool (64MB)
pub const DEFAULT_MEMORY_POOL: usize = 64 * 1024 * 1024;

/// First address handed out by the simulated provider (1MB)
/// Everything below stays unmapped so that small integers never alias real blocks.
pub const DEFAULT_BASE_ADDRESS: usize = 0x10_0000;

/// Block alignment for simulated allocations
/// Matches the largest primitive alignment on common 64-bit targets.
pub const DEFAULT_BLOCK_ALIGNMENT: usize = 16;

/// The null address
pub const NULL_ADDRESS: usize = 0;

// =============================================================================
// MEMORY PRESSURE
// =============================================================================

/// Usage ratio at which pressure is reported as HIGH
pub const PRESSURE_WARNING_THRESHOLD: f64 = 0.80;

/// Usage ratio at which pressure is reported as CRITICAL
pub const PRESSURE_CRITICAL_THRESHOLD: f64 = 0.95;

/// Usage ratio at which pressure is reported as MEDIUM
pub const PRESSURE_MEDIUM_THRESHOLD: f64 = 0.60;

// =============================================================================
// INTEGER CODEC
// =============================================================================

/// Largest magnitude a double represents exactly (2^53)
/// 64-bit reads at or below this magnitude come back as numbers, larger ones as text.
pub const MAX_SAFE_MAGNITUDE: i128 = 1 << 53;

/// Width of the 64-bit integer codec's scratch buffer
pub const INT64_WIDTH: usize = 8;
