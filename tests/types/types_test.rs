/*!
 * Descriptor Tests
 * refType/derefType derivation, the primitive table and custom accessors
 */

use memref::types::PrimitiveKind;
use memref::{CustomType, MemoryView, RefError, RefResult, Runtime, Type, TypeAccessor, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> Runtime {
    Runtime::simulated().unwrap()
}

#[test]
fn test_ref_type_delegates_to_base() {
    let rt = runtime();
    let base = rt.coerce_type("uint16").unwrap();
    let ptr = rt.ref_type(&base).unwrap();

    assert_eq!(ptr.indirection(), 2);
    assert_eq!(ptr.name(), Some("uint16*"));
    assert_eq!(ptr.size(), base.size());
    assert_eq!(ptr.alignment(), base.alignment());
    assert!(Type::same(ptr.parent().unwrap(), &base));
}

#[test]
fn test_deref_type_of_ref_type_is_base() {
    let rt = runtime();
    let base = rt.coerce_type("double").unwrap();
    let back = rt.deref_type(rt.ref_type(&base).unwrap()).unwrap();
    assert!(Type::same(&back, &base));
}

#[test]
fn test_deref_type_of_direct_type_fails() {
    let rt = runtime();
    assert!(matches!(
        rt.deref_type("int32"),
        Err(RefError::InvalidOperation(_))
    ));
}

#[test]
fn test_deref_type_slow_path() {
    let rt = runtime();
    let custom = CustomType::new()
        .named("opaque**")
        .with_size(16)
        .with_indirection(3);
    let ty = rt.deref_type(custom).unwrap();
    assert_eq!(ty.indirection(), 2);
    assert_eq!(ty.size(), 16);
    assert_eq!(ty.name(), Some("opaque*"));
}

#[test]
fn test_primitive_sizes_match_provider() {
    let rt = runtime();
    for kind in PrimitiveKind::BASE {
        let ty = rt.types().primitive(kind).unwrap();
        assert_eq!(ty.size(), rt.size_of(kind), "size of {}", kind);
    }
    assert_eq!(rt.coerce_type("void").unwrap().size(), 0);
    assert_eq!(rt.coerce_type("int64").unwrap().size(), 8);
}

#[test]
fn test_c_aliases_keep_their_names() {
    let rt = runtime();
    let long = rt.coerce_type("long").unwrap();
    assert_eq!(long.name(), Some("long"));
    assert_eq!(long.size(), std::mem::size_of::<std::ffi::c_long>());

    let size_t = rt.coerce_type("size_t").unwrap();
    assert_eq!(size_t.size(), std::mem::size_of::<usize>());
}

#[test]
fn test_alias_reads_like_its_fixed_width_kind() {
    let rt = runtime();
    let view = rt.alloc_with("uchar", 200).unwrap();
    assert_eq!(view.get(0).unwrap(), Value::Int(200));
    assert_eq!(view.get_as(0, "char").unwrap(), Value::Int(-56));
}

#[test]
fn test_type_info_serializes() {
    let rt = runtime();
    let info = rt.coerce_type("int32 *").unwrap().info();
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["name"], "int32*");
    assert_eq!(json["size"], 4);
    assert_eq!(json["indirection"], 2);
}

#[test]
fn test_registry_iterates_in_registration_order() {
    let rt = runtime();
    let names: Vec<&str> = rt.types().names().take(3).collect();
    assert_eq!(names, vec!["void", "bool", "int8"]);
    assert_eq!(rt.types().iter().count(), rt.types().len());
}

/// Stores a u16 scaled by ten
struct Tenths;

impl TypeAccessor for Tenths {
    fn get(&self, view: &MemoryView, offset: usize) -> RefResult<Value> {
        let raw = view.get_as(offset, "uint16")?;
        Ok(Value::Float(raw.as_f64().unwrap_or_default() / 10.0))
    }

    fn set(&self, view: &MemoryView, offset: usize, value: Value) -> RefResult<()> {
        let scaled = value
            .as_f64()
            .ok_or_else(|| RefError::invalid_input("expected a number"))?;
        view.set_as(offset, (scaled * 10.0).round() as u16, "uint16")
    }
}

#[test]
fn test_custom_accessor() {
    let rt = runtime();
    let tenths = CustomType::new()
        .named("tenths")
        .with_size(2)
        .with_alignment(2)
        .with_indirection(1)
        .with_accessor(Arc::new(Tenths));

    let view = rt.alloc_with(tenths, 12.5).unwrap();
    assert_eq!(view.get_as(0, "uint16").unwrap(), Value::Int(125));
    assert_eq!(view.get(0).unwrap(), Value::Float(12.5));
}

#[test]
fn test_custom_type_without_accessor_fails_on_access() {
    let rt = runtime();
    let blob = CustomType::new().with_size(4).with_indirection(1);
    let view = rt.alloc(blob).unwrap();
    assert!(matches!(view.get(0), Err(RefError::InvalidState(_))));
    assert!(matches!(view.set(0, 1), Err(RefError::InvalidState(_))));
}

proptest! {
    #[test]
    fn prop_deref_of_ref_restores_indirection(index in 0usize..14, depth in 0usize..5) {
        let rt = runtime();
        let mut ty = rt.types().primitive(PrimitiveKind::BASE[index]).unwrap();
        for _ in 0..depth {
            ty = rt.ref_type(&ty).unwrap();
        }
        let round = rt.deref_type(rt.ref_type(&ty).unwrap()).unwrap();
        prop_assert_eq!(round.indirection(), ty.indirection());
        prop_assert_eq!(round.size(), ty.size());
        prop_assert_eq!(round.name(), ty.name());
    }

    #[test]
    fn prop_int32_behaves_the_same_after_round_trip(value in any::<i32>()) {
        let rt = runtime();
        let base = rt.coerce_type("int32").unwrap();
        let round = rt.deref_type(rt.ref_type(&base).unwrap()).unwrap();
        let view = rt.alloc_with(&round, value).unwrap();
        prop_assert_eq!(view.get_as(0, &base).unwrap(), Value::Int(i64::from(value)));
    }
}
