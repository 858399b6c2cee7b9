//! Size-tier policy dispatch
//!
//! Maps a requested block count to exactly one allocation method, runs it
//! against that method's store, and appends one history record per attempt.

use crate::alloc::contiguous::{ContiguousAllocator, FitStrategy};
use crate::alloc::indexed::IndexedAllocator;
use crate::alloc::linked::LinkedAllocator;
use crate::alloc::Placement;
use crate::block::{blocks_for_size, FileId, STORAGE_SIZE};
use crate::error::AllocError;
use crate::history::{AllocationLog, AllocationRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Allocation method selected by the size-tier table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Contiguous(FitStrategy),
    Linked,
    Indexed,
}

impl Method {
    /// Tier table mapping a block count to the method that serves it
    ///
    /// | blocks | method               |
    /// |--------|----------------------|
    /// | ..=5   | contiguous first-fit |
    /// | 6..=15 | contiguous best-fit  |
    /// | 16..=25| contiguous worst-fit |
    /// | 26..=40| linked               |
    /// | 41..   | indexed              |
    pub fn for_block_count(blocks: usize) -> Self {
        match blocks {
            0..=5 => Method::Contiguous(FitStrategy::FirstFit),
            6..=15 => Method::Contiguous(FitStrategy::BestFit),
            16..=25 => Method::Contiguous(FitStrategy::WorstFit),
            26..=40 => Method::Linked,
            _ => Method::Indexed,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Contiguous(fit) => write!(f, "Contiguous ({fit})"),
            Method::Linked => f.write_str("Linked"),
            Method::Indexed => f.write_str("Indexed"),
        }
    }
}

/// Outcome of one allocation attempt routed through the dispatcher
///
/// Success and failure are both first-class values rather than thrown
/// faults; `Display` renders the human-readable description callers show
/// and the history log stores verbatim.
#[derive(Debug)]
pub enum AllocationOutcome {
    /// Blocks were claimed
    Allocated { method: Method, placement: Placement },
    /// The selected method found no room; its store was left untouched
    Failed { method: Method, error: AllocError },
    /// The request was invalid and never reached a method
    Rejected { error: AllocError },
}

impl AllocationOutcome {
    pub fn is_allocated(&self) -> bool {
        matches!(self, AllocationOutcome::Allocated { .. })
    }

    /// Claimed blocks, when the attempt succeeded
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            AllocationOutcome::Allocated { placement, .. } => Some(placement),
            _ => None,
        }
    }

    /// Method the tier table selected; `None` for rejected requests
    pub fn method(&self) -> Option<Method> {
        match self {
            AllocationOutcome::Allocated { method, .. }
            | AllocationOutcome::Failed { method, .. } => Some(*method),
            AllocationOutcome::Rejected { .. } => None,
        }
    }
}

impl fmt::Display for AllocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationOutcome::Allocated { method, placement } => match (method, placement) {
                (Method::Contiguous(fit), Placement::Contiguous { start, end }) => write!(
                    f,
                    "Contiguous ({fit}) allocation from block {start} to block {end}"
                ),
                (_, Placement::Linked { blocks }) => {
                    write!(f, "Linked allocation using blocks {blocks:?}")
                }
                (_, Placement::Indexed { index_block, data_blocks }) => write!(
                    f,
                    "Indexed allocation with index block {index_block} and data blocks {data_blocks:?}"
                ),
                // A contiguous placement always comes from a contiguous method.
                (_, Placement::Contiguous { start, end }) => write!(
                    f,
                    "Contiguous allocation from block {start} to block {end}"
                ),
            },
            AllocationOutcome::Failed { method, .. } => match method {
                Method::Contiguous(fit) => {
                    write!(f, "Failed to allocate contiguously ({fit})")
                }
                Method::Linked => f.write_str("Failed to allocate using linked allocation"),
                Method::Indexed => f.write_str("Failed to allocate using indexed allocation"),
            },
            AllocationOutcome::Rejected { error } => write!(f, "Failed to allocate: {error}"),
        }
    }
}

/// Routes each request to exactly one allocation method and records the outcome
///
/// The three stores (contiguous, linked, indexed) are independent: a method
/// only ever touches its own store. Every attempt, successful or not,
/// appends exactly one history record.
#[derive(Debug)]
pub struct PolicyDispatcher {
    contiguous: ContiguousAllocator,
    linked: LinkedAllocator,
    indexed: IndexedAllocator,
    log: AllocationLog,
    seen: HashSet<FileId>,
}

impl PolicyDispatcher {
    /// Dispatcher over three full-size stores
    pub fn new() -> Self {
        Self::with_capacity(STORAGE_SIZE)
    }

    /// Dispatcher whose three stores each hold `total_blocks` blocks
    pub fn with_capacity(total_blocks: usize) -> Self {
        PolicyDispatcher {
            contiguous: ContiguousAllocator::new(total_blocks),
            linked: LinkedAllocator::new(total_blocks),
            indexed: IndexedAllocator::new(total_blocks),
            log: AllocationLog::new(),
            seen: HashSet::new(),
        }
    }

    /// Allocate storage for a file of `byte_size` bytes
    ///
    /// Converts the size to a block count, dispatches to the tiered method,
    /// and appends one history record with the rendered description.
    pub fn allocate(&mut self, file_id: FileId, byte_size: u64) -> AllocationOutcome {
        let outcome = self.try_allocate(file_id, byte_size);
        self.log.record(file_id, &outcome);
        outcome
    }

    fn try_allocate(&mut self, file_id: FileId, byte_size: u64) -> AllocationOutcome {
        let blocks = blocks_for_size(byte_size);
        if blocks == 0 {
            warn!(%file_id, byte_size, "rejecting zero-block allocation request");
            return AllocationOutcome::Rejected {
                error: AllocError::InvalidBlockCount,
            };
        }
        if !self.seen.insert(file_id) {
            warn!(%file_id, "rejecting reused file identifier");
            return AllocationOutcome::Rejected {
                error: AllocError::DuplicateFile(file_id),
            };
        }

        let method = Method::for_block_count(blocks);
        debug!(%file_id, byte_size, blocks, %method, "dispatching allocation");

        let result = match method {
            Method::Contiguous(fit) => self.contiguous.allocate(file_id, blocks, fit),
            Method::Linked => self.linked.allocate(file_id, blocks),
            Method::Indexed => self.indexed.allocate(file_id, blocks),
        };

        match result {
            Ok(placement) => AllocationOutcome::Allocated { method, placement },
            Err(error) => {
                warn!(%file_id, blocks, %error, "allocation failed");
                AllocationOutcome::Failed { method, error }
            }
        }
    }

    /// Every allocation attempt recorded so far, oldest first
    pub fn history(&self) -> &[AllocationRecord] {
        self.log.records()
    }

    /// History records for one file
    pub fn history_for(&self, file_id: FileId) -> impl Iterator<Item = &AllocationRecord> {
        self.log.for_file(file_id)
    }

    /// Append-only allocation log
    pub fn log(&self) -> &AllocationLog {
        &self.log
    }

    /// Contiguous-family allocator
    pub fn contiguous(&self) -> &ContiguousAllocator {
        &self.contiguous
    }

    /// Linked-family allocator
    pub fn linked(&self) -> &LinkedAllocator {
        &self.linked
    }

    /// Indexed-family allocator
    pub fn indexed(&self) -> &IndexedAllocator {
        &self.indexed
    }

    /// Free-space and fragmentation report across the three stores
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            total_blocks: self.contiguous.store().total_blocks(),
            contiguous_free: self.contiguous.store().free_blocks(),
            linked_free: self.linked.store().free_blocks(),
            indexed_free: self.indexed.store().free_blocks(),
            contiguous_fragmentation: self.contiguous.store().fragmentation_score(),
            linked_fragmentation: self.linked.store().fragmentation_score(),
            indexed_fragmentation: self.indexed.store().fragmentation_score(),
        }
    }
}

impl Default for PolicyDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-store free-space and fragmentation snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_blocks: usize,
    pub contiguous_free: usize,
    pub linked_free: usize,
    pub indexed_free: usize,
    pub contiguous_fragmentation: f64,
    pub linked_fragmentation: f64,
    pub indexed_fragmentation: f64,
}
