//! Error types for the row store.
//!
//! Errors are split by how the command loop treats them: [`RowError`] and
//! [`ExecuteError::TableFull`] are reported and the loop continues, while a
//! [`StorageError`] is systemic and ends the session.

use std::io;

use thiserror::Error;

/// Failures of the storage layer. None of these are recovered locally.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("unable to open database file {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("unable to get file info: {0}")]
    Stat(#[source] io::Error),

    #[error("error seeking to page {page_num}: {source}")]
    Seek { page_num: usize, source: io::Error },

    #[error("error reading page {page_num}: {source}")]
    Read { page_num: usize, source: io::Error },

    #[error("error writing page {page_num}: {source}")]
    Write { page_num: usize, source: io::Error },

    #[error("error closing db file: {0}")]
    Close(#[source] io::Error),

    #[error("tried to fetch page number out of bounds: {page_num} (max: {max})")]
    PageOutOfBounds { page_num: usize, max: usize },

    #[error("tried to flush absent page {0}")]
    FlushAbsentPage(usize),

    #[error("flush of page {page_num} requested {byte_count} bytes (max: {max})")]
    FlushTooLarge {
        page_num: usize,
        byte_count: usize,
        max: usize,
    },

    #[error("invalid row slot {slot} (max: {max})")]
    InvalidSlot { slot: usize, max: usize },
}

/// Failures building or decoding a single row.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    #[error("{field} is too long: {len} bytes (max: {max})")]
    StringTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("row needs {expected} bytes, got {actual}")]
    Decode { expected: usize, actual: usize },
}

/// Outcomes of executing a statement that are not success.
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("table full")]
    TableFull,

    #[error("could not decode row {row_index}: {source}")]
    DecodeFailed { row_index: usize, source: RowError },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StorageResult<T> = Result<T, StorageError>;
