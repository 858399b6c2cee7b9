//! Block occupancy state for one allocation family

use crate::block::BlockAddr;
use serde::{Deserialize, Serialize};

/// Occupancy array for a fixed-size run of blocks
///
/// Each slot is either free (`None`) or carries whatever occupant the owning
/// allocator records: a bare owner for contiguous and indexed data blocks, an
/// owner plus next pointer for linked blocks. The store answers the
/// range-occupancy queries the placement searches are built on; it performs
/// no locking itself and never frees a slot once marked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStore<S> {
    slots: Vec<Option<S>>,
    free_blocks: usize,
}

impl<S> BlockStore<S> {
    /// Create a store of `total_blocks` free blocks
    pub fn new(total_blocks: usize) -> Self {
        BlockStore {
            slots: (0..total_blocks).map(|_| None).collect(),
            free_blocks: total_blocks,
        }
    }

    /// Total number of blocks tracked
    pub fn total_blocks(&self) -> usize {
        self.slots.len()
    }

    /// Number of free blocks available
    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    /// Whether `addr` is free; out-of-range addresses report as occupied
    pub fn is_free(&self, addr: BlockAddr) -> bool {
        self.slots
            .get(addr as usize)
            .map_or(false, |slot| slot.is_none())
    }

    /// Record `occupant` at `addr`
    ///
    /// Subsequent `is_free(addr)` reflects the change. Allocation is
    /// monotonic: callers only mark blocks they verified free.
    pub fn mark(&mut self, addr: BlockAddr, occupant: S) {
        let slot = &mut self.slots[addr as usize];
        if slot.is_none() {
            self.free_blocks -= 1;
        }
        *slot = Some(occupant);
    }

    /// Occupant stored at `addr`, if any
    pub fn get(&self, addr: BlockAddr) -> Option<&S> {
        self.slots.get(addr as usize).and_then(|slot| slot.as_ref())
    }

    /// Length of the contiguous free run starting at `addr`
    ///
    /// Returns 0 when `addr` itself is occupied or out of range. A window of
    /// `n` blocks at `addr` is fully free exactly when this is at least `n`.
    pub fn count_free_from(&self, addr: BlockAddr) -> usize {
        match self.slots.get(addr as usize..) {
            Some(tail) => tail.iter().take_while(|slot| slot.is_none()).count(),
            None => 0,
        }
    }

    /// Free-run length at every address, computed in one backward pass
    ///
    /// `runs[i]` equals `count_free_from(i)`, so `runs[i] >= n` exactly when
    /// the n-block window at `i` is fully free. Lets a contiguous scan rank
    /// all candidate starts without rescanning the store per start.
    pub fn free_run_lengths(&self) -> Vec<usize> {
        let mut runs = vec![0usize; self.slots.len()];
        let mut run = 0usize;
        for (i, slot) in self.slots.iter().enumerate().rev() {
            run = if slot.is_none() { run + 1 } else { 0 };
            runs[i] = run;
        }
        runs
    }

    /// Total free blocks from every address through the end of the store
    ///
    /// `counts[i]` is the number of free blocks in `i..total_blocks`, holes
    /// included. This is the score best-fit and worst-fit rank candidate
    /// starts by; because a free block at `i` adds one over `counts[i + 1]`,
    /// the score strictly decreases across free addresses.
    pub fn free_suffix_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.slots.len()];
        let mut count = 0usize;
        for (i, slot) in self.slots.iter().enumerate().rev() {
            if slot.is_none() {
                count += 1;
            }
            counts[i] = count;
        }
        counts
    }

    /// Addresses of every free block, ascending
    pub fn free_addresses(&self) -> impl Iterator<Item = BlockAddr> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i as BlockAddr)
    }

    /// Fragmentation as free/occupied transition count normalized by total blocks
    ///
    /// 0.0 = one uniform region; higher = more scattered occupancy.
    pub fn fragmentation_score(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }

        let mut transitions = 0usize;
        let mut prev_occupied = false;
        for slot in &self.slots {
            let occupied = slot.is_some();
            if occupied != prev_occupied {
                transitions += 1;
            }
            prev_occupied = occupied;
        }

        transitions as f64 / self.slots.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::FileId;

    #[test]
    fn test_new_store_all_free() {
        let store: BlockStore<FileId> = BlockStore::new(100);
        assert_eq!(store.total_blocks(), 100);
        assert_eq!(store.free_blocks(), 100);
        assert!((0..100).all(|a| store.is_free(a)));
    }

    #[test]
    fn test_mark_updates_is_free_and_counter() {
        let mut store = BlockStore::new(10);
        store.mark(3, FileId(7));

        assert!(!store.is_free(3));
        assert!(store.is_free(2));
        assert_eq!(store.free_blocks(), 9);
        assert_eq!(store.get(3), Some(&FileId(7)));
    }

    #[test]
    fn test_out_of_range_is_occupied() {
        let store: BlockStore<FileId> = BlockStore::new(10);
        assert!(!store.is_free(10));
        assert!(!store.is_free(u64::MAX));
        assert_eq!(store.count_free_from(10), 0);
    }

    #[test]
    fn test_count_free_from_stops_at_occupied() {
        let mut store = BlockStore::new(10);
        store.mark(4, FileId(1));

        assert_eq!(store.count_free_from(0), 4); // blocks 0..=3
        assert_eq!(store.count_free_from(4), 0); // occupied
        assert_eq!(store.count_free_from(5), 5); // blocks 5..=9
    }

    #[test]
    fn test_free_run_lengths_match_count_free_from() {
        let mut store = BlockStore::new(16);
        for addr in [0, 5, 6, 11] {
            store.mark(addr, FileId(1));
        }

        let runs = store.free_run_lengths();
        for addr in 0..16 {
            assert_eq!(runs[addr as usize], store.count_free_from(addr));
        }
    }

    #[test]
    fn test_free_suffix_counts_include_blocks_past_holes() {
        let mut store = BlockStore::new(8);
        store.mark(2, FileId(1));
        store.mark(5, FileId(1));

        let counts = store.free_suffix_counts();
        // Free blocks at 0, 1, 3, 4, 6, 7.
        assert_eq!(counts, vec![6, 5, 4, 4, 3, 2, 2, 1]);
        // Strictly decreasing across free addresses.
        for addr in 0..7u64 {
            if store.is_free(addr) {
                assert!(counts[addr as usize] > counts[addr as usize + 1]);
            }
        }
    }

    #[test]
    fn test_free_addresses_ascending_and_skips_occupied() {
        let mut store = BlockStore::new(6);
        store.mark(1, FileId(1));
        store.mark(4, FileId(2));

        let free: Vec<_> = store.free_addresses().collect();
        assert_eq!(free, vec![0, 2, 3, 5]);
    }

    #[test]
    fn test_fragmentation_score_increases_with_scatter() {
        let mut store = BlockStore::new(100);
        let empty = store.fragmentation_score();

        store.mark(10, FileId(1));
        store.mark(20, FileId(1));
        store.mark(30, FileId(1));
        assert!(store.fragmentation_score() > empty);
    }
}
