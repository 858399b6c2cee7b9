use crate::block::FileId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("out of space: requested {requested} blocks, {available} free")]
    InsufficientSpace { requested: usize, available: usize },

    #[error("invalid request: file size must occupy at least one block")]
    InvalidBlockCount,

    #[error("file {0} already has an allocation attempt on record")]
    DuplicateFile(FileId),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AllocError>;
