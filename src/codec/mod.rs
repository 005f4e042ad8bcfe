/*!
 * Codecs
 * Byte-level encodings the memory view delegates to
 */

pub mod cstring;
pub mod int64;

pub use cstring::{CStringSource, Encoding};
pub use int64::Signedness;
