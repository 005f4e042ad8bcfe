/*!
 * ref()/deref() Tests
 */

use memref::{RefError, Runtime, Value};
use pretty_assertions::assert_eq;

#[test]
fn test_one_layer_deep() {
    let rt = Runtime::simulated().unwrap();
    let test = rt.from_bytes(b"one layer deep").unwrap();
    let one = test.reference().unwrap();
    let back = one.deref().unwrap().into_view().unwrap();

    assert_eq!(back.len(), test.len());
    assert_eq!(back.to_bytes().unwrap(), b"one layer deep".to_vec());
}

#[test]
fn test_two_layers_deep() {
    let rt = Runtime::simulated().unwrap();
    let test = rt.from_bytes(b"two layers deep").unwrap();
    let one = test.reference().unwrap();
    let two = one.reference().unwrap();

    let back_one = two.deref().unwrap().into_view().unwrap();
    let back_test = back_one.deref().unwrap().into_view().unwrap();

    assert_eq!(back_one.address(), one.address());
    assert_eq!(back_test.address(), test.address());
    assert_eq!(back_one.len(), one.len());
    assert_eq!(back_test.len(), test.len());
    assert_eq!(back_test.to_bytes().unwrap(), b"two layers deep".to_vec());
}

#[test]
fn test_deref_without_type_fails() {
    let rt = Runtime::simulated().unwrap();
    let test = rt.from_bytes(b"???").unwrap();
    let err = test.deref().unwrap_err();
    assert_eq!(err, RefError::invalid_state("unknown \"type\"; cannot get()"));
}

#[test]
fn test_deref_through_reference_without_type_fails() {
    let rt = Runtime::simulated().unwrap();
    let test = rt.from_bytes(b"???").unwrap();
    let r = test.reference().unwrap();
    let back = r.deref().unwrap().into_view().unwrap();

    assert_eq!(back.address(), test.address());
    assert!(matches!(back.deref(), Err(RefError::InvalidState(_))));
}

#[test]
fn test_strict_types_rejects_untyped_access() {
    let config = memref::RuntimeConfig::default().with_strict_types(true);
    let rt = Runtime::simulated_with(config).unwrap();
    let test = rt.from_bytes(b"???").unwrap();

    assert!(matches!(test.deref(), Err(RefError::InvalidState(_))));
    assert!(test.ty().is_none());
}

#[test]
fn test_default_type_is_installed_once() {
    let rt = Runtime::simulated().unwrap();
    let test = rt.from_bytes(b"abcd").unwrap();
    assert!(test.deref().is_err());

    let ty = test.ty().unwrap();
    assert_eq!(ty.size(), 4);
    assert_eq!(ty.name(), None);
}

#[test]
fn test_deref_char() {
    let rt = Runtime::simulated().unwrap();
    let test = rt.alloc("char").unwrap();
    test.write_bytes(0, &[50]).unwrap();
    assert_eq!(test.deref().unwrap(), Value::Int(50));
    test.write_bytes(0, &[127]).unwrap();
    assert_eq!(test.deref().unwrap(), Value::Int(127));
}

#[test]
fn test_ref_of_typed_view_is_typed_pointer() {
    let rt = Runtime::simulated().unwrap();
    let value = rt.alloc_with("int32", -7).unwrap();
    let ptr = value.reference().unwrap();

    assert_eq!(ptr.ty().unwrap().name(), Some("int32*"));
    let target = ptr.deref().unwrap().into_view().unwrap();
    assert_eq!(target.ty().unwrap().name(), Some("int32"));
    assert_eq!(target.deref().unwrap(), Value::Int(-7));
}

#[test]
fn test_set_through_pointer_chain() {
    let rt = Runtime::simulated().unwrap();
    let value = rt.alloc_with("int16", 1).unwrap();
    let ptr = value.reference().unwrap();

    let target = ptr.deref().unwrap().into_view().unwrap();
    target.set(0, 300).unwrap();
    assert_eq!(value.deref().unwrap(), Value::Int(300));
}

#[test]
fn test_deref_null_view_fails() {
    let rt = Runtime::simulated().unwrap();
    let null = rt.null().with_type("int32").unwrap();
    assert!(matches!(null.deref(), Err(RefError::NullDereference(_))));
}
