//! Runtime error type.
//!
//! Only contract errors and reader failures surface as `Err`; ill-formed
//! input is represented in-tree as `ERROR` nodes.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no language set on document")]
    MissingLanguage,
    #[error("no input set on document")]
    MissingInput,
    #[error("invalid parse tables: {0}")]
    InvalidTables(#[from] canopy_tables::ValidateError),
    #[error("edit at {position} deleting {deleted} bytes exceeds document size {size}")]
    EditOutOfRange {
        position: usize,
        deleted: usize,
        size: usize,
    },
    #[error("input read failed: {0}")]
    Input(#[from] io::Error),
}
