/*!
 * Primitive Accessors
 * Get/set behaviour of the built-in kinds at indirection 1
 */

use super::descriptor::TypeAccessor;
use super::value::Value;
use crate::codec::int64::{self, Signedness};
use crate::codec::Encoding;
use crate::core::errors::{RefError, RefResult};
use crate::core::limits::NULL_ADDRESS;
use crate::core::types::{Endianness, Size};
use crate::memory::PrimitiveKind;
use crate::view::MemoryView;

/// Accessor shared by every built-in kind
///
/// C aliases reuse the accessor of the fixed-width kind they map to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Primitive {
    kind: PrimitiveKind,
}

impl Primitive {
    pub(crate) fn new(kind: PrimitiveKind) -> Self {
        Self { kind }
    }
}

fn load<const N: usize>(view: &MemoryView, offset: Size) -> RefResult<[u8; N]> {
    let bytes = view.read_bytes(offset, N)?;
    bytes
        .try_into()
        .map_err(|_| RefError::invalid_state("memory provider returned a short read"))
}

impl TypeAccessor for Primitive {
    fn get(&self, view: &MemoryView, offset: Size) -> RefResult<Value> {
        let value = match self.kind {
            PrimitiveKind::Void => Value::Null,
            PrimitiveKind::Bool => Value::Bool(load::<1>(view, offset)?[0] != 0),
            PrimitiveKind::Int8 => Value::from(i8::from_ne_bytes(load(view, offset)?)),
            PrimitiveKind::UInt8 => Value::from(u8::from_ne_bytes(load(view, offset)?)),
            PrimitiveKind::Int16 => Value::from(i16::from_ne_bytes(load(view, offset)?)),
            PrimitiveKind::UInt16 => Value::from(u16::from_ne_bytes(load(view, offset)?)),
            PrimitiveKind::Int32 => Value::from(i32::from_ne_bytes(load(view, offset)?)),
            PrimitiveKind::UInt32 => Value::from(u32::from_ne_bytes(load(view, offset)?)),
            PrimitiveKind::Int64 => view.read_int64(offset, Endianness::host())?,
            PrimitiveKind::UInt64 => view.read_uint64(offset, Endianness::host())?,
            PrimitiveKind::Float => Value::Float(f64::from(f32::from_ne_bytes(load(view, offset)?))),
            PrimitiveKind::Double => Value::Float(f64::from_ne_bytes(load(view, offset)?)),
            PrimitiveKind::Object => view.read_object(offset)?,
            PrimitiveKind::CString => {
                let target = view.read_pointer(offset, 0)?;
                if target.is_null() {
                    Value::Null
                } else {
                    Value::Text(target.read_cstring(0, Encoding::Utf8)?)
                }
            }
            other => {
                return Err(RefError::invalid_state(format!(
                    "no accessor for kind {}",
                    other
                )))
            }
        };
        Ok(value)
    }

    fn set(&self, view: &MemoryView, offset: Size, value: Value) -> RefResult<()> {
        match self.kind {
            PrimitiveKind::Void => Ok(()),
            PrimitiveKind::Bool => {
                let byte = match &value {
                    Value::Null => 0,
                    Value::Bool(b) => u8::from(*b),
                    Value::Text(s) => u8::from(!s.is_empty()),
                    Value::View(_) | Value::Object(_) => 1,
                    Value::Int(_) | Value::Float(_) => {
                        integer_input(&value, self.kind, -128, 255)? as u8
                    }
                };
                view.write_bytes(offset, &[byte])
            }
            PrimitiveKind::Int8 => {
                let v = integer_input(&value, self.kind, i8::MIN.into(), i8::MAX.into())?;
                view.write_bytes(offset, &(v as i8).to_ne_bytes())
            }
            PrimitiveKind::UInt8 => {
                let v = integer_input(&value, self.kind, 0, u8::MAX.into())?;
                view.write_bytes(offset, &(v as u8).to_ne_bytes())
            }
            PrimitiveKind::Int16 => {
                let v = integer_input(&value, self.kind, i16::MIN.into(), i16::MAX.into())?;
                view.write_bytes(offset, &(v as i16).to_ne_bytes())
            }
            PrimitiveKind::UInt16 => {
                let v = integer_input(&value, self.kind, 0, u16::MAX.into())?;
                view.write_bytes(offset, &(v as u16).to_ne_bytes())
            }
            PrimitiveKind::Int32 => {
                let v = integer_input(&value, self.kind, i32::MIN.into(), i32::MAX.into())?;
                view.write_bytes(offset, &(v as i32).to_ne_bytes())
            }
            PrimitiveKind::UInt32 => {
                let v = integer_input(&value, self.kind, 0, u32::MAX.into())?;
                view.write_bytes(offset, &(v as u32).to_ne_bytes())
            }
            PrimitiveKind::Int64 => view.write_int64(offset, value, Endianness::host()),
            PrimitiveKind::UInt64 => view.write_uint64(offset, value, Endianness::host()),
            PrimitiveKind::Float => {
                let v = float_input(&value, self.kind)?;
                view.write_bytes(offset, &(v as f32).to_ne_bytes())
            }
            PrimitiveKind::Double => {
                let v = float_input(&value, self.kind)?;
                view.write_bytes(offset, &v.to_ne_bytes())
            }
            PrimitiveKind::Object => match value {
                Value::Object(object) => view.write_object(offset, object, false),
                Value::Null => view.store_address(offset, NULL_ADDRESS),
                other => Err(unsupported(&other, self.kind)),
            },
            PrimitiveKind::CString => match value {
                Value::Text(text) => {
                    let string = view.runtime().alloc_cstring(text, Encoding::Utf8)?;
                    view.write_pointer(offset, &string)
                }
                Value::View(target) => view.write_pointer(offset, &target),
                Value::Null => view.store_address(offset, NULL_ADDRESS),
                other => Err(unsupported(&other, self.kind)),
            },
            other => Err(RefError::invalid_state(format!(
                "no accessor for kind {}",
                other
            ))),
        }
    }
}

fn unsupported(value: &Value, kind: PrimitiveKind) -> RefError {
    RefError::invalid_input(format!("cannot write a {} as {}", value.kind_name(), kind))
}

/// Integer to store for `value`, checked against `[min, max]`
///
/// Single-byte kinds take the code of a text's first character; wider kinds
/// parse the text as an integer.
fn integer_input(value: &Value, kind: PrimitiveKind, min: i128, max: i128) -> RefResult<i128> {
    let integer = match value {
        Value::Text(s) if matches!(kind, PrimitiveKind::Int8 | PrimitiveKind::UInt8) => s
            .chars()
            .next()
            .map(|c| i128::from(u32::from(c)))
            .ok_or_else(|| RefError::invalid_input(format!("empty text cannot be written as {}", kind)))?,
        Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Text(_) => {
            let signedness = if min < 0 {
                Signedness::Signed
            } else {
                Signedness::Unsigned
            };
            int64::integer_from_value(value, signedness).map_err(|err| match err {
                RefError::RangeError(_) => out_of_range(value, kind),
                other => other,
            })?
        }
        other => return Err(unsupported(other, kind)),
    };

    if !(min..=max).contains(&integer) {
        return Err(out_of_range(value, kind));
    }
    Ok(integer)
}

fn out_of_range(value: &Value, kind: PrimitiveKind) -> RefError {
    RefError::range(format!("value {:?} is out of range for {}", value, kind))
}

fn float_input(value: &Value, kind: PrimitiveKind) -> RefResult<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| RefError::invalid_input(format!("{:?} is not a number", s))),
        other => Err(unsupported(other, kind)),
    }
}
