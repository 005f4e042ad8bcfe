/*!
 * Address Tests
 */

use memref::Runtime;
use pretty_assertions::assert_eq;

#[test]
fn test_null_address_is_zero() {
    let rt = Runtime::simulated().unwrap();
    let null = rt.null();
    assert_eq!(null.address(), 0);
    assert!(null.is_null());
    assert_eq!(null.len(), 0);
}

#[test]
fn test_positive_address_for_allocations() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.from_bytes(b"hello").unwrap();
    assert!(buf.address() > 0);
    assert!(!buf.is_null());
}

#[test]
fn test_address_with_offset() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.from_bytes(b"hello").unwrap();
    let address = buf.address();
    for offset in 0..=5isize {
        assert_eq!(buf.address_at(offset), address + offset as usize);
        assert_eq!(buf.address_at(-offset), address - offset as usize);
    }
    assert_eq!(buf.address_at(0), buf.address());
}

#[test]
fn test_display_includes_hex_address() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.from_bytes(b"hello").unwrap().with_type("void").unwrap();
    let shown = buf.to_string();
    assert!(shown.contains(&buf.hex_address()));
    assert!(shown.contains("void"));
    assert!(format!("{:?}", buf).contains(&buf.hex_address()));
}

#[test]
fn test_hex_address_format() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.from_bytes(b"x").unwrap();
    assert_eq!(buf.hex_address(), format!("{:x}", buf.address()));
}
