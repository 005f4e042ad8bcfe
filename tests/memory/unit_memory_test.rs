/*!
 * Simulated Memory Provider Tests
 * Allocation, release, OOM handling and the managed-object table
 */

use memref::memory::{MemoryError, MemoryManager, MemoryPressure, MemoryProvider, ObjectHandle};
use memref::MemoryConfig;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_memory_manager_initialization() {
    let mem_mgr = MemoryManager::new();
    let (total, used, available) = mem_mgr.info();

    assert_eq!(total, 64 * 1024 * 1024);
    assert_eq!(used, 0);
    assert_eq!(available, total);
}

#[test]
fn test_multiple_allocations() {
    let mem_mgr = MemoryManager::new();

    let addr1 = mem_mgr.allocate(1024).unwrap();
    let addr2 = mem_mgr.allocate(2048).unwrap();
    let addr3 = mem_mgr.allocate(4096).unwrap();

    assert_ne!(addr1, addr2);
    assert_ne!(addr2, addr3);
    assert_ne!(addr1, addr3);

    let (_, used, _) = mem_mgr.info();
    assert_eq!(used, 1024 + 2048 + 4096);
}

#[test]
fn test_allocation_is_zero_filled() {
    let mem_mgr = MemoryManager::new();
    let addr = mem_mgr.allocate(32).unwrap();
    assert_eq!(mem_mgr.read_bytes(addr, 32).unwrap(), vec![0u8; 32]);
}

#[test]
fn test_zero_sized_allocation_is_unique_and_non_null() {
    let mem_mgr = MemoryManager::new();
    let a = mem_mgr.allocate(0).unwrap();
    let b = mem_mgr.allocate(0).unwrap();
    assert_ne!(a, 0);
    assert_ne!(a, b);
}

#[test]
fn test_allocation_and_release() {
    let mem_mgr = MemoryManager::new();
    let addr = mem_mgr.allocate(4096).unwrap();
    assert!(mem_mgr.is_valid(addr));

    mem_mgr.release(addr).unwrap();
    let (_, used_after, _) = mem_mgr.info();
    assert_eq!(used_after, 0);
    assert!(!mem_mgr.is_valid(addr));
    assert_eq!(
        mem_mgr.read_bytes(addr, 1),
        Err(MemoryError::InvalidAddress(addr))
    );
}

#[test]
fn test_out_of_memory() {
    let mem_mgr = MemoryManager::with_capacity(1024);
    mem_mgr.allocate(1000).unwrap();

    match mem_mgr.allocate(100) {
        Err(MemoryError::OutOfMemory {
            requested,
            available,
            used,
            total,
        }) => {
            assert_eq!(requested, 100);
            assert_eq!(available, 24);
            assert_eq!(used, 1000);
            assert_eq!(total, 1024);
        }
        other => panic!("expected OutOfMemory, got {:?}", other),
    }
}

#[test]
fn test_stats_and_pressure() {
    let mem_mgr = MemoryManager::with_capacity(1000);
    mem_mgr.allocate(900).unwrap();

    let stats = mem_mgr.stats();
    assert_eq!(stats.used_memory, 900);
    assert_eq!(stats.allocated_blocks, 1);
    assert_eq!(stats.allocation_count, 1);
    assert_eq!(stats.memory_pressure(), MemoryPressure::High);
}

#[test]
fn test_clones_share_address_space() {
    let mem_mgr = MemoryManager::new();
    let clone = mem_mgr.clone();

    let addr = mem_mgr.allocate(8).unwrap();
    clone.write_bytes(addr, &[1, 2, 3]).unwrap();
    assert_eq!(mem_mgr.read_bytes(addr, 3).unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_custom_base_address() {
    let config = MemoryConfig::small().with_base_address(0x4000).with_alignment(64);
    let mem_mgr = MemoryManager::with_config(config);

    let a = mem_mgr.allocate(1).unwrap();
    let b = mem_mgr.allocate(1).unwrap();
    assert_eq!(a, 0x4000);
    assert_eq!(b, 0x4040);
}

#[test]
fn test_null_address_rejected() {
    let mem_mgr = MemoryManager::new();
    assert_eq!(mem_mgr.read_bytes(0, 4), Err(MemoryError::NullAddress));
    assert!(mem_mgr.is_null(mem_mgr.null()));
    assert_eq!(mem_mgr.hex_address(0x10_0000), "100000");
}

#[test]
fn test_persistent_object_survives_caller_drop() {
    let mem_mgr = MemoryManager::new();
    let slot = mem_mgr.allocate(mem_mgr.pointer_size()).unwrap();

    let object: ObjectHandle = Arc::new(String::from("kept"));
    mem_mgr.write_object(slot, object, true).unwrap();

    let read = mem_mgr.read_object(slot).unwrap().unwrap();
    assert_eq!(read.downcast_ref::<String>().unwrap(), "kept");
    assert_eq!(mem_mgr.stats().live_objects, 1);
}

#[test]
fn test_unterminated_scan_fails_at_unmapped_memory() {
    let mem_mgr = MemoryManager::new();
    let addr = mem_mgr.allocate(16).unwrap();
    mem_mgr.write_bytes(addr, &[0xAA; 16]).unwrap();
    // Padding block so nothing follows contiguously
    let gap = mem_mgr.allocate(16).unwrap();
    mem_mgr.release(gap).unwrap();

    assert!(matches!(
        mem_mgr.scan_zeros(addr, 1),
        Err(MemoryError::UnterminatedScan { scanned: 16, .. })
    ));
}
