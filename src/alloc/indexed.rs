//! Indexed allocation: one index block lists a file's scattered data blocks

use crate::alloc::Placement;
use crate::block::{BlockAddr, FileId};
use crate::error::{AllocError, Result};
use crate::store::BlockStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Occupant of one block in the indexed store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexedSlot {
    /// Data block owned by a file
    Data(FileId),
    /// Index block holding the file's ordered data-block list
    Index {
        owner: FileId,
        data_blocks: Vec<BlockAddr>,
    },
}

/// Indexed allocator over its own block store
///
/// The index block is consumed from the free pool like any data block, so a
/// file of N blocks costs N+1 free blocks. The index table maps each file to
/// its index block; entries are created on success and never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedAllocator {
    store: BlockStore<IndexedSlot>,
    index_table: HashMap<FileId, BlockAddr>,
}

impl IndexedAllocator {
    /// Create an allocator over `total_blocks` free blocks
    pub fn new(total_blocks: usize) -> Self {
        IndexedAllocator {
            store: BlockStore::new(total_blocks),
            index_table: HashMap::new(),
        }
    }

    /// Occupancy state of the underlying store
    pub fn store(&self) -> &BlockStore<IndexedSlot> {
        &self.store
    }

    /// File-to-index-block mapping
    pub fn index_table(&self) -> &HashMap<FileId, BlockAddr> {
        &self.index_table
    }

    /// Claim an index block plus `blocks` data blocks for `file_id`
    ///
    /// The lowest free address becomes the index block; the next `blocks`
    /// free addresses become its data blocks. All-or-nothing: fewer than
    /// `blocks + 1` free addresses fails without mutating the store.
    pub fn allocate(&mut self, file_id: FileId, blocks: usize) -> Result<Placement> {
        if blocks == 0 {
            return Err(AllocError::InvalidBlockCount);
        }

        // One extra block carries the index itself.
        let needed = blocks + 1;
        let free: Vec<BlockAddr> = self.store.free_addresses().take(needed).collect();
        if free.len() < needed {
            return Err(AllocError::InsufficientSpace {
                requested: needed,
                available: self.store.free_blocks(),
            });
        }

        let index_block = free[0];
        let data_blocks = free[1..].to_vec();

        self.store.mark(
            index_block,
            IndexedSlot::Index {
                owner: file_id,
                data_blocks: data_blocks.clone(),
            },
        );
        for &addr in &data_blocks {
            self.store.mark(addr, IndexedSlot::Data(file_id));
        }
        self.index_table.insert(file_id, index_block);

        Ok(Placement::Indexed {
            index_block,
            data_blocks,
        })
    }

    /// Address of `file_id`'s index block, if it has an allocation
    pub fn index_block(&self, file_id: FileId) -> Option<BlockAddr> {
        self.index_table.get(&file_id).copied()
    }

    /// Data-block list read back from `file_id`'s index block
    pub fn data_blocks(&self, file_id: FileId) -> Option<Vec<BlockAddr>> {
        let addr = self.index_block(file_id)?;
        match self.store.get(addr)? {
            IndexedSlot::Index { data_blocks, .. } => Some(data_blocks.clone()),
            IndexedSlot::Data(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_block_is_lowest_free_address() {
        let mut alloc = IndexedAllocator::new(10);

        let placement = alloc.allocate(FileId(1), 3).unwrap();
        assert_eq!(
            placement,
            Placement::Indexed {
                index_block: 0,
                data_blocks: vec![1, 2, 3],
            }
        );
        assert_eq!(alloc.index_block(FileId(1)), Some(0));
        assert_eq!(alloc.store().free_blocks(), 6);
    }

    #[test]
    fn test_index_block_content_matches_data_blocks() {
        let mut alloc = IndexedAllocator::new(20);
        alloc.allocate(FileId(1), 4).unwrap();

        let placement = alloc.allocate(FileId(2), 5).unwrap();
        let data_blocks = match &placement {
            Placement::Indexed { data_blocks, .. } => data_blocks.clone(),
            other => panic!("unexpected placement {other:?}"),
        };

        assert_eq!(alloc.data_blocks(FileId(2)), Some(data_blocks.clone()));
        for addr in data_blocks {
            assert_eq!(alloc.store().get(addr), Some(&IndexedSlot::Data(FileId(2))));
        }
    }

    #[test]
    fn test_requires_one_extra_block_for_index() {
        // Exactly N free blocks is not enough for an N-block file.
        let mut alloc = IndexedAllocator::new(5);
        let before = alloc.store.clone();

        let result = alloc.allocate(FileId(1), 5);
        assert!(matches!(
            result,
            Err(AllocError::InsufficientSpace {
                requested: 6,
                available: 5
            })
        ));
        assert_eq!(alloc.store, before);
        assert!(alloc.index_table().is_empty());

        // N+1 free blocks fits.
        assert!(alloc.allocate(FileId(1), 4).is_ok());
        assert_eq!(alloc.store().free_blocks(), 0);
    }

    #[test]
    fn test_index_table_entries_never_removed() {
        let mut alloc = IndexedAllocator::new(30);
        alloc.allocate(FileId(1), 2).unwrap();
        alloc.allocate(FileId(2), 3).unwrap();

        assert_eq!(alloc.index_table().len(), 2);
        assert_eq!(alloc.index_block(FileId(1)), Some(0));
        // Second file's index lands on the next free address after file 1.
        assert_eq!(alloc.index_block(FileId(2)), Some(3));
    }

    #[test]
    fn test_zero_blocks_rejected() {
        let mut alloc = IndexedAllocator::new(4);
        assert!(matches!(
            alloc.allocate(FileId(1), 0),
            Err(AllocError::InvalidBlockCount)
        ));
    }
}
