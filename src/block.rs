//! Core block-device constants and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical block size in bytes (always 4096)
pub const BLOCK_SIZE: usize = 4096;

/// Blocks per store: 100 MiB of simulated storage in 4KB blocks
pub const STORAGE_SIZE: usize = 100 * 1024 * 1024 / BLOCK_SIZE;

/// Address of a block within a store, in `[0, STORAGE_SIZE)`
pub type BlockAddr = u64;

/// Opaque identifier of the file an allocation belongs to
///
/// The allocator never reads the file's bytes; the identifier only marks
/// ownership of claimed blocks and keys the allocation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of blocks a file of `byte_size` bytes occupies (ceiling division)
pub fn blocks_for_size(byte_size: u64) -> usize {
    byte_size.div_ceil(BLOCK_SIZE as u64) as usize
}
