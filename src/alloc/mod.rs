//! Block allocation strategies
//!
//! Three allocator families, each over its own [`BlockStore`](crate::store::BlockStore):
//! - Contiguous: first-fit, best-fit, worst-fit window search
//! - Linked: scattered blocks chained by per-block next pointers
//! - Indexed: scattered data blocks listed in one dedicated index block

pub mod contiguous;
pub mod indexed;
pub mod linked;

use crate::block::BlockAddr;
use serde::{Deserialize, Serialize};

/// Blocks claimed by one successful allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Inclusive contiguous range `[start, end]`
    Contiguous { start: BlockAddr, end: BlockAddr },

    /// Scattered blocks in chain order
    Linked { blocks: Vec<BlockAddr> },

    /// One index block plus the ordered data blocks it references
    Indexed {
        index_block: BlockAddr,
        data_blocks: Vec<BlockAddr>,
    },
}

impl Placement {
    /// Number of data blocks the file occupies (index block excluded)
    pub fn block_count(&self) -> usize {
        match self {
            Placement::Contiguous { start, end } => (end - start + 1) as usize,
            Placement::Linked { blocks } => blocks.len(),
            Placement::Indexed { data_blocks, .. } => data_blocks.len(),
        }
    }

    /// Every block consumed from the free pool, index block included
    pub fn claimed_blocks(&self) -> Vec<BlockAddr> {
        match self {
            Placement::Contiguous { start, end } => (*start..=*end).collect(),
            Placement::Linked { blocks } => blocks.clone(),
            Placement::Indexed {
                index_block,
                data_blocks,
            } => {
                let mut claimed = Vec::with_capacity(data_blocks.len() + 1);
                claimed.push(*index_block);
                claimed.extend_from_slice(data_blocks);
                claimed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_count_excludes_index_block() {
        let contiguous = Placement::Contiguous { start: 2, end: 6 };
        assert_eq!(contiguous.block_count(), 5);

        let indexed = Placement::Indexed {
            index_block: 0,
            data_blocks: vec![1, 2, 3],
        };
        assert_eq!(indexed.block_count(), 3);
        assert_eq!(indexed.claimed_blocks(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_claimed_blocks_contiguous_range() {
        let placement = Placement::Contiguous { start: 4, end: 7 };
        assert_eq!(placement.claimed_blocks(), vec![4, 5, 6, 7]);
    }
}
