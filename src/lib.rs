//! # Blocksim - Storage Allocation Strategy Simulator
//!
//! `blocksim` simulates classic storage-allocation strategies at block
//! granularity over a fixed-size block device:
//!
//! - **Contiguous** allocation with first-fit, best-fit, and worst-fit
//!   window search
//! - **Linked** allocation with per-block next pointers
//! - **Indexed** allocation with a dedicated index block per file
//!
//! A size-tier dispatcher selects exactly one strategy per request and keeps
//! an append-only history of every allocation decision. Each strategy family
//! owns an independent 25,600-block store (100 MiB in 4KB blocks).
//!
//! ## Quick Start
//!
//! ```rust
//! use blocksim::{FileId, StorageSimulator};
//!
//! let sim = StorageSimulator::new();
//!
//! // A 1-byte file occupies one 4KB block and lands in the first-fit tier.
//! let outcome = sim.allocate(FileId(1), 1);
//! assert_eq!(
//!     outcome.to_string(),
//!     "Contiguous (FirstFit) allocation from block 0 to block 0"
//! );
//!
//! // Every attempt leaves exactly one history record behind.
//! let history = sim.history();
//! assert_eq!(history.len(), 1);
//! assert_eq!(history[0].description, outcome.to_string());
//! ```

pub mod alloc;
pub mod block;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod store;

pub use crate::alloc::contiguous::{ContiguousAllocator, FitStrategy};
pub use crate::alloc::indexed::{IndexedAllocator, IndexedSlot};
pub use crate::alloc::linked::{LinkedAllocator, LinkedBlock};
pub use crate::alloc::Placement;
pub use crate::block::{blocks_for_size, BlockAddr, FileId, BLOCK_SIZE, STORAGE_SIZE};
pub use crate::dispatch::{AllocationOutcome, Method, PolicyDispatcher, StorageStats};
pub use crate::error::{AllocError, Result};
pub use crate::history::{AllocationLog, AllocationRecord};
pub use crate::store::BlockStore;

use parking_lot::Mutex;
use tracing::{debug, info};

/// Thread-safe boundary over the policy dispatcher
///
/// Serializes every allocation behind one mutex, so each strategy's
/// scan-then-mutate sequence runs to completion before the next attempt
/// begins — at most one in-flight allocation across the three stores, even
/// when callers share the simulator between threads.
pub struct StorageSimulator {
    inner: Mutex<PolicyDispatcher>,
}

impl StorageSimulator {
    /// Simulator over three full-size (25,600-block) stores
    pub fn new() -> Self {
        info!(blocks = STORAGE_SIZE, "creating storage simulator");
        StorageSimulator {
            inner: Mutex::new(PolicyDispatcher::new()),
        }
    }

    /// Simulator whose three stores each hold `total_blocks` blocks
    pub fn with_capacity(total_blocks: usize) -> Self {
        info!(blocks = total_blocks, "creating storage simulator");
        StorageSimulator {
            inner: Mutex::new(PolicyDispatcher::with_capacity(total_blocks)),
        }
    }

    /// Allocate storage for a file of `byte_size` bytes
    ///
    /// The returned outcome renders to the description text callers display
    /// and persist; the same text is appended to the history log.
    pub fn allocate(&self, file_id: FileId, byte_size: u64) -> AllocationOutcome {
        debug!(%file_id, byte_size, "allocation request");
        self.inner.lock().allocate(file_id, byte_size)
    }

    /// Snapshot of every allocation attempt recorded so far, oldest first
    pub fn history(&self) -> Vec<AllocationRecord> {
        self.inner.lock().history().to_vec()
    }

    /// History records for one file, oldest first
    pub fn history_for(&self, file_id: FileId) -> Vec<AllocationRecord> {
        self.inner.lock().history_for(file_id).cloned().collect()
    }

    /// Full history as pretty-printed JSON
    pub fn history_json(&self) -> Result<String> {
        self.inner.lock().log().to_json()
    }

    /// Free-space and fragmentation report across the three stores
    pub fn stats(&self) -> StorageStats {
        self.inner.lock().stats()
    }
}

impl Default for StorageSimulator {
    fn default() -> Self {
        Self::new()
    }
}
