/*!
 * Allocation Tests
 */

use memref::{MemoryManager, RefError, Runtime, RuntimeConfig, Type, Value};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_alloc_is_sized_for_the_type() {
    let rt = Runtime::simulated().unwrap();
    let view = rt.alloc("bool").unwrap();
    assert_eq!(view.len(), rt.size_of(memref::PrimitiveKind::Bool));
    assert_eq!(view.to_bytes().unwrap(), vec![0]);
}

#[test]
fn test_alloc_coerces_type_names() {
    let rt = Runtime::simulated().unwrap();
    let view = rt.alloc("bool").unwrap();
    let bool_ty = rt.coerce_type("bool").unwrap();
    assert!(Type::same(&view.ty().unwrap(), &bool_ty));
}

#[test]
fn test_alloc_pointer_type_is_pointer_sized() {
    let rt = Runtime::simulated().unwrap();
    let view = rt.alloc("double **").unwrap();
    assert_eq!(view.len(), rt.provider().pointer_size());
}

#[test]
fn test_alloc_with_initial_value() {
    let rt = Runtime::simulated().unwrap();
    let view = rt.alloc_with("int32", 4).unwrap();
    assert_eq!(view.deref().unwrap(), Value::Int(4));
}

#[test]
fn test_alloc_void_is_empty() {
    let rt = Runtime::simulated().unwrap();
    let view = rt.alloc("void").unwrap();
    assert!(view.is_empty());
    assert!(!view.is_null());
    assert_eq!(view.deref().unwrap(), Value::Null);
}

#[test]
fn test_dropping_last_view_releases_memory() {
    let provider = MemoryManager::new();
    let rt = Runtime::new(Arc::new(provider.clone())).unwrap();

    let view = rt.alloc("int64").unwrap();
    let clone = view.clone();
    assert_eq!(provider.info().1, 8);

    drop(view);
    assert_eq!(provider.info().1, 8);
    drop(clone);
    assert_eq!(provider.info().1, 0);
}

#[test]
fn test_alloc_out_of_memory_surfaces_provider_error() {
    let config = RuntimeConfig::default()
        .with_memory(memref::MemoryConfig::small().with_capacity(16));
    let rt = Runtime::simulated_with(config).unwrap();

    let _first = rt.alloc("int64").unwrap();
    let _second = rt.alloc("int64").unwrap();
    let err = rt.alloc("int64").unwrap_err();
    assert!(err.is_memory());
    assert!(matches!(
        err,
        RefError::Memory(memref::MemoryError::OutOfMemory { requested: 8, .. })
    ));
}

#[test]
fn test_from_bytes_copies() {
    let rt = Runtime::simulated().unwrap();
    let view = rt.from_bytes(b"abc").unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(view.to_bytes().unwrap(), b"abc".to_vec());
    assert!(view.ty().is_none());
}

#[test]
fn test_fill_and_range_checks() {
    let rt = Runtime::simulated().unwrap();
    let view = rt.alloc("uint32").unwrap();
    view.fill(0xff).unwrap();
    assert_eq!(view.get(0).unwrap(), Value::Int(u32::MAX as i64));

    assert!(matches!(view.read_bytes(2, 4), Err(RefError::RangeError(_))));
    assert!(matches!(view.get(1), Err(RefError::RangeError(_))));
}

#[test]
fn test_alloc_of_huge_custom_type_is_out_of_memory() {
    let rt = Runtime::simulated().unwrap();
    let huge = memref::CustomType::new()
        .with_size(usize::MAX)
        .with_indirection(1);
    assert!(matches!(
        rt.alloc(huge),
        Err(RefError::Memory(memref::MemoryError::OutOfMemory { requested, .. })) if requested == usize::MAX
    ));
    // The runtime stays usable
    assert_eq!(rt.alloc("int32").unwrap().len(), 4);
}
