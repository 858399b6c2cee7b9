//! Contiguous allocation: first-fit, best-fit, worst-fit window search
//!
//! Every placement claims N consecutive blocks. The three strategies differ
//! only in which fully-free N-block window they choose.

use crate::alloc::Placement;
use crate::block::{BlockAddr, FileId};
use crate::error::{AllocError, Result};
use crate::store::BlockStore;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// Window-selection policy for contiguous allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitStrategy {
    /// First qualifying window by ascending start address
    FirstFit,
    /// Qualifying window with the fewest free blocks from its start to the
    /// end of the store (tightest remaining space)
    BestFit,
    /// Qualifying window with the most free blocks from its start to the
    /// end of the store
    WorstFit,
}

impl fmt::Display for FitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FitStrategy::FirstFit => "FirstFit",
            FitStrategy::BestFit => "BestFit",
            FitStrategy::WorstFit => "WorstFit",
        };
        f.write_str(name)
    }
}

/// Contiguous allocator over its own block store
///
/// Best-fit and worst-fit score a candidate start by the total number of
/// free blocks from that start through the end of the store, holes
/// included, not by the size of the containing free region. Every candidate
/// start is itself free, so scores are distinct and strictly decrease with
/// address: best-fit resolves to the highest-addressed qualifying window
/// and worst-fit to the lowest, and the two always diverge when more than
/// one window qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContiguousAllocator {
    store: BlockStore<FileId>,
}

impl ContiguousAllocator {
    /// Create an allocator over `total_blocks` free blocks
    pub fn new(total_blocks: usize) -> Self {
        ContiguousAllocator {
            store: BlockStore::new(total_blocks),
        }
    }

    /// Occupancy state of the underlying store
    pub fn store(&self) -> &BlockStore<FileId> {
        &self.store
    }

    /// Claim `blocks` consecutive blocks for `file_id` using `strategy`
    ///
    /// All-or-nothing: when no fully-free window of the requested size
    /// exists, the store is left untouched.
    pub fn allocate(
        &mut self,
        file_id: FileId,
        blocks: usize,
        strategy: FitStrategy,
    ) -> Result<Placement> {
        if blocks == 0 {
            return Err(AllocError::InvalidBlockCount);
        }

        let start = self
            .find_start(blocks, strategy)
            .ok_or(AllocError::InsufficientSpace {
                requested: blocks,
                available: self.store.free_blocks(),
            })?;

        let end = start + blocks as BlockAddr - 1;
        for addr in start..=end {
            self.store.mark(addr, file_id);
        }

        Ok(Placement::Contiguous { start, end })
    }

    /// Start address of the window `strategy` selects, if any window fits
    fn find_start(&self, blocks: usize, strategy: FitStrategy) -> Option<BlockAddr> {
        if blocks > self.store.total_blocks() {
            return None;
        }

        // runs[i] >= blocks exactly when the window at i is fully free;
        // totals[i] is the score best/worst-fit rank candidates by.
        let runs = self.store.free_run_lengths();
        let totals = self.store.free_suffix_counts();
        let last_start = self.store.total_blocks() - blocks;
        let mut candidates = (0..=last_start).filter(|&i| runs[i] >= blocks);

        let chosen = match strategy {
            FitStrategy::FirstFit => candidates.next(),
            // Candidate scores are distinct (strictly decreasing with
            // address), so no tie-break is needed; Reverse(i) pins worst-fit
            // to the lowest address all the same.
            FitStrategy::BestFit => candidates.min_by_key(|&i| totals[i]),
            FitStrategy::WorstFit => candidates.max_by_key(|&i| (totals[i], Reverse(i))),
        };

        chosen.map(|i| i as BlockAddr)
    }
}
