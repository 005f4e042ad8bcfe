/*!
 * 64-bit Integer Codec Tests
 */

use memref::codec::int64::{decode, encode, Signedness};
use memref::{Endianness, MemoryView, RefError, Runtime, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const JS_MAX_INT: i64 = 9_007_199_254_740_992;
const JS_MIN_INT: i64 = -9_007_199_254_740_992;

fn int64_view(rt: &Runtime) -> MemoryView {
    rt.alloc("int64").unwrap()
}

fn round_trip(value: impl Into<Value>) -> Value {
    let rt = Runtime::simulated().unwrap();
    let buf = int64_view(&rt);
    buf.write_int64(0, value, Endianness::host()).unwrap();
    buf.read_int64(0, Endianness::host()).unwrap()
}

#[test]
fn test_simple_ints() {
    assert_eq!(round_trip(0), Value::Int(0));
    assert_eq!(round_trip(123_456_789), Value::Int(123_456_789));
    assert_eq!(round_trip(-123_456_789), Value::Int(-123_456_789));
}

#[test]
fn test_int64_max_as_text() {
    assert_eq!(
        round_trip("9223372036854775807"),
        Value::Text("9223372036854775807".to_string())
    );
    assert_eq!(
        round_trip("-9223372036854775807"),
        Value::Text("-9223372036854775807".to_string())
    );
}

#[test]
fn test_hex_and_octal_text() {
    assert_eq!(round_trip("-0x1234567890"), Value::Int(-0x12_3456_7890));
    assert_eq!(round_trip("-0777"), Value::Int(-0o777));

    let rt = Runtime::simulated().unwrap();
    let buf = rt.alloc("uint64").unwrap();
    buf.write_uint64(0, "0x1234567890", Endianness::Big).unwrap();
    assert_eq!(
        buf.read_uint64(0, Endianness::Big).unwrap(),
        Value::Int(0x12_3456_7890)
    );
    buf.write_uint64(0, "0777", Endianness::Little).unwrap();
    assert_eq!(
        buf.read_uint64(0, Endianness::Little).unwrap(),
        Value::Int(0o777)
    );
}

#[test]
fn test_safe_integer_boundaries() {
    assert_eq!(round_trip(JS_MIN_INT), Value::Int(JS_MIN_INT));
    assert_eq!(round_trip(JS_MAX_INT), Value::Int(JS_MAX_INT));
    assert_eq!(
        round_trip("9007199254740993"),
        Value::Text("9007199254740993".to_string())
    );
    assert_eq!(
        round_trip("-9007199254740993"),
        Value::Text("-9007199254740993".to_string())
    );
}

#[test]
fn test_zero_text_reads_as_number() {
    assert_eq!(round_trip("0"), Value::Int(0));
}

#[test]
fn test_no_digits() {
    let rt = Runtime::simulated().unwrap();
    let buf = int64_view(&rt);
    let expected = RefError::invalid_input("no digits found in input string");
    assert_eq!(buf.write_int64(0, "foo", Endianness::host()), Err(expected.clone()));
    assert_eq!(buf.write_uint64(0, "foo", Endianness::host()), Err(expected));
}

#[test]
fn test_out_of_range() {
    let rt = Runtime::simulated().unwrap();
    let buf = int64_view(&rt);
    let expected = RefError::range("input string numerical value out of range");
    assert_eq!(
        buf.write_int64(0, "10000000000000000000000000", Endianness::host()),
        Err(expected.clone())
    );
    assert_eq!(
        buf.write_uint64(0, "10000000000000000000000000", Endianness::host()),
        Err(expected)
    );
}

#[test]
fn test_explicit_byte_orders() {
    let rt = Runtime::simulated().unwrap();
    let buf = int64_view(&rt);

    buf.write_int64(0, 1, Endianness::Big).unwrap();
    assert_eq!(buf.to_bytes().unwrap(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
    buf.write_int64(0, 1, Endianness::Little).unwrap();
    assert_eq!(buf.to_bytes().unwrap(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(buf.read_int64(0, Endianness::Big).unwrap(), Value::Text("72057594037927936".to_string()));
}

#[test]
fn test_int64_type_uses_host_order() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.alloc_with("int64", -2).unwrap();
    assert_eq!(buf.to_bytes().unwrap(), (-2i64).to_ne_bytes().to_vec());
    assert_eq!(buf.deref().unwrap(), Value::Int(-2));

    let buf = rt.alloc_with("uint64", u64::MAX).unwrap();
    assert_eq!(buf.deref().unwrap(), Value::Text(u64::MAX.to_string()));
}

#[test]
fn test_int64_outside_view_fails() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.alloc("int32").unwrap();
    assert!(matches!(
        buf.write_int64(0, 1, Endianness::host()),
        Err(RefError::RangeError(_))
    ));
}

proptest! {
    #[test]
    fn prop_signed_round_trip(value in any::<i64>(), big in any::<bool>()) {
        let order = if big { Endianness::Big } else { Endianness::Little };
        let bytes = encode(&Value::Text(value.to_string()), Signedness::Signed, order).unwrap();
        let decoded = decode(&bytes, Signedness::Signed, order).unwrap();
        let expected = if i128::from(value).abs() <= 1 << 53 {
            Value::Int(value)
        } else {
            Value::Text(value.to_string())
        };
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn prop_unsigned_text_round_trip(value in any::<u64>()) {
        let bytes = encode(&Value::Text(value.to_string()), Signedness::Unsigned, Endianness::Big).unwrap();
        prop_assert_eq!(bytes, value.to_be_bytes());
        let decoded = decode(&bytes, Signedness::Unsigned, Endianness::Big).unwrap();
        let text = match decoded {
            Value::Int(i) => i.to_string(),
            Value::Text(s) => s,
            other => panic!("unexpected {:?}", other),
        };
        prop_assert_eq!(text, value.to_string());
    }
}
