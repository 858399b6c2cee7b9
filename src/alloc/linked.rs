//! Linked allocation: scattered blocks chained by per-block next pointers

use crate::alloc::Placement;
use crate::block::{BlockAddr, FileId};
use crate::error::{AllocError, Result};
use crate::store::BlockStore;
use serde::{Deserialize, Serialize};

/// Occupant of one linked-allocated block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedBlock {
    /// File that owns the block
    pub owner: FileId,
    /// Next block in the file's chain, `None` on the terminal block
    pub next: Option<BlockAddr>,
}

/// Linked allocator over its own block store
///
/// Blocks need not be physically contiguous: the lowest N free addresses
/// are claimed and chained in ascending order, so a file's chain head is
/// always its lowest-addressed block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAllocator {
    store: BlockStore<LinkedBlock>,
}

impl LinkedAllocator {
    /// Create an allocator over `total_blocks` free blocks
    pub fn new(total_blocks: usize) -> Self {
        LinkedAllocator {
            store: BlockStore::new(total_blocks),
        }
    }

    /// Occupancy state of the underlying store
    pub fn store(&self) -> &BlockStore<LinkedBlock> {
        &self.store
    }

    /// Claim `blocks` scattered blocks for `file_id`, chained in order
    ///
    /// All-or-nothing: fewer than `blocks` free addresses fails without
    /// mutating the store.
    pub fn allocate(&mut self, file_id: FileId, blocks: usize) -> Result<Placement> {
        if blocks == 0 {
            return Err(AllocError::InvalidBlockCount);
        }

        let chain: Vec<BlockAddr> = self.store.free_addresses().take(blocks).collect();
        if chain.len() < blocks {
            return Err(AllocError::InsufficientSpace {
                requested: blocks,
                available: self.store.free_blocks(),
            });
        }

        for (i, &addr) in chain.iter().enumerate() {
            let next = chain.get(i + 1).copied();
            self.store.mark(addr, LinkedBlock { owner: file_id, next });
        }

        Ok(Placement::Linked { blocks: chain })
    }

    /// Walk `file_id`'s chain from its head, following next pointers
    ///
    /// Empty when the file owns no blocks in this store.
    pub fn chain(&self, file_id: FileId) -> Vec<BlockAddr> {
        let head = (0..self.store.total_blocks() as BlockAddr)
            .find(|&addr| self.store.get(addr).map_or(false, |b| b.owner == file_id));

        let mut chain = Vec::new();
        let mut cursor = head;
        while let Some(addr) = cursor {
            chain.push(addr);
            cursor = self.store.get(addr).and_then(|b| b.next);
        }
        chain
    }
}
