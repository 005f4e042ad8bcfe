/*!
 * C-String Codec
 * Text encodings for NUL-terminated strings in raw memory
 */

use crate::core::errors::{RefError, RefResult};
use crate::view::MemoryView;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text encoding of a C string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    Utf8,
    /// UTF-16, little-endian code units
    Utf16Le,
    /// One byte per UTF-16 code unit, high bits dropped
    Latin1,
    Ascii,
}

impl Encoding {
    /// Width in bytes of one code unit, and of the terminator
    pub const fn unit_width(self) -> usize {
        match self {
            Encoding::Utf16Le => 2,
            _ => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Le => "utf16le",
            Encoding::Latin1 => "latin1",
            Encoding::Ascii => "ascii",
        }
    }

    /// Encoded length of `text`
    pub fn encoded_len(self, text: &str) -> usize {
        match self {
            Encoding::Utf8 => text.len(),
            Encoding::Utf16Le => text.encode_utf16().count() * 2,
            Encoding::Latin1 | Encoding::Ascii => text.encode_utf16().count(),
        }
    }

    pub fn encode(self, text: &str) -> Vec<u8> {
        self.encode_within(text, usize::MAX)
    }

    /// Encode whole characters of `text` while they fit in `limit` bytes
    pub fn encode_within(self, text: &str, limit: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len(text).min(limit));
        let mut units = [0u16; 2];
        for c in text.chars() {
            let start = out.len();
            match self {
                Encoding::Utf8 => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                Encoding::Utf16Le => {
                    for unit in c.encode_utf16(&mut units).iter() {
                        out.extend_from_slice(&unit.to_le_bytes());
                    }
                }
                Encoding::Latin1 | Encoding::Ascii => {
                    for unit in c.encode_utf16(&mut units).iter() {
                        out.push((*unit & 0xff) as u8);
                    }
                }
            }
            if out.len() > limit {
                out.truncate(start);
                break;
            }
        }
        out
    }

    /// Decode bytes, replacing invalid sequences
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Encoding::Latin1 => bytes.iter().map(|b| char::from(*b)).collect(),
            Encoding::Ascii => bytes.iter().map(|b| char::from(*b & 0x7f)).collect(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Encoding::Utf16Le),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            "ascii" => Ok(Encoding::Ascii),
            other => Err(RefError::invalid_input(format!("unknown encoding: {}", other))),
        }
    }
}

/// Input to `Runtime::alloc_cstring`
///
/// `Null` and a view at the null address both yield the null view unchanged.
#[derive(Debug, Clone)]
pub enum CStringSource {
    Null,
    Text(String),
    View(MemoryView),
}

impl From<&str> for CStringSource {
    fn from(s: &str) -> Self {
        CStringSource::Text(s.to_string())
    }
}

impl From<String> for CStringSource {
    fn from(s: String) -> Self {
        CStringSource::Text(s)
    }
}

impl From<&String> for CStringSource {
    fn from(s: &String) -> Self {
        CStringSource::Text(s.clone())
    }
}

impl From<MemoryView> for CStringSource {
    fn from(v: MemoryView) -> Self {
        CStringSource::View(v)
    }
}

impl<T: Into<CStringSource>> From<Option<T>> for CStringSource {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(CStringSource::Null)
    }
}
