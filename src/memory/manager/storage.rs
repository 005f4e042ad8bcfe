/*!
 * Memory Storage Operations
 * Read/write operations on simulated memory
 */

use super::super::types::{MemoryBlock, MemoryError, MemoryResult};
use super::MemoryManager;
use crate::core::types::{Address, Size};
use log::trace;
use std::collections::BTreeMap;

const POINTER_WIDTH: usize = std::mem::size_of::<usize>();

impl MemoryManager {
    /// Write bytes to a memory address
    ///
    /// Writes may continue into an immediately adjacent block; they fail at
    /// the first unmapped byte before anything is modified.
    pub fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if address == 0 {
            return Err(MemoryError::NullAddress);
        }
        if data.is_empty() {
            return Ok(());
        }

        let mut blocks = self.blocks.write();
        let spans = mapped_spans(&blocks, address, data.len())?;
        let mut written = 0;
        for (base, offset, len) in spans {
            if let Some(block) = blocks.get_mut(&base) {
                block.data[offset..offset + len].copy_from_slice(&data[written..written + len]);
            }
            written += len;
        }

        trace!("Wrote {} bytes to 0x{:x}", data.len(), address);
        Ok(())
    }

    /// Read bytes from a memory address
    pub fn read_bytes(&self, address: Address, size: Size) -> MemoryResult<Vec<u8>> {
        if address == 0 {
            return Err(MemoryError::NullAddress);
        }
        if size == 0 {
            return Ok(Vec::new());
        }

        let blocks = self.blocks.read();
        let mut result = Vec::with_capacity(size);
        for (base, offset, len) in mapped_spans(&blocks, address, size)? {
            if let Some(block) = blocks.get(&base) {
                result.extend_from_slice(&block.data[offset..offset + len]);
            }
        }

        trace!("Read {} bytes from 0x{:x}", size, address);
        Ok(result)
    }

    /// Load a native-width pointer
    pub fn read_pointer(&self, address: Address) -> MemoryResult<Address> {
        let bytes = self.read_bytes(address, POINTER_WIDTH)?;
        let mut raw = [0u8; POINTER_WIDTH];
        raw.copy_from_slice(&bytes);
        Ok(usize::from_ne_bytes(raw))
    }

    /// Store a native-width pointer
    pub fn write_pointer(&self, address: Address, target: Address) -> MemoryResult<()> {
        self.write_bytes(address, &target.to_ne_bytes())
    }

    /// Scan forward from `address` for `width` aligned zero bytes
    ///
    /// The scan follows mapped memory across adjacent blocks and fails once it
    /// reaches an unmapped byte.
    pub fn scan_zeros(&self, address: Address, width: Size) -> MemoryResult<Size> {
        if address == 0 {
            return Err(MemoryError::NullAddress);
        }
        let width = width.max(1);

        let blocks = self.blocks.read();
        let mut cursor = address;
        let mut scanned: Vec<u8> = Vec::new();

        loop {
            let block = match block_at(&blocks, cursor) {
                Some(block) => block,
                None => {
                    return Err(MemoryError::UnterminatedScan {
                        address,
                        width,
                        scanned: scanned.len(),
                    })
                }
            };

            let resume = scanned.len() - scanned.len() % width;
            scanned.extend_from_slice(&block.data[cursor - block.address..]);
            if let Some(pos) = aligned_zero_run(&scanned[resume..], width) {
                return Ok(resume + pos);
            }
            cursor = block.end();
        }
    }
}

/// Position of the first `width`-aligned run of `width` zero bytes
fn aligned_zero_run(haystack: &[u8], width: Size) -> Option<Size> {
    haystack
        .chunks_exact(width)
        .position(|chunk| chunk.iter().all(|&b| b == 0))
        .map(|index| index * width)
}

fn block_at(blocks: &BTreeMap<Address, MemoryBlock>, address: Address) -> Option<&MemoryBlock> {
    blocks
        .range(..=address)
        .next_back()
        .map(|(_, block)| block)
        .filter(|block| block.contains(address))
}

/// Split `[address, address + len)` into (block base, offset in block, length) pieces
fn mapped_spans(
    blocks: &BTreeMap<Address, MemoryBlock>,
    address: Address,
    len: Size,
) -> MemoryResult<Vec<(Address, Size, Size)>> {
    let mut spans = Vec::new();
    let mut cursor = address;
    let mut remaining = len;
    while remaining > 0 {
        let block = block_at(blocks, cursor).ok_or(MemoryError::InvalidAddress(cursor))?;
        let take = remaining.min(block.end() - cursor);
        spans.push((block.address, cursor - block.address, take));
        cursor += take;
        remaining -= take;
    }
    Ok(spans)
}
