use std::fmt;

use crate::error::{StorageError, StorageResult};
use crate::row::Row;
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE};

/// A `PAGE_SIZE` buffer of packed rows. Bytes past the last slot are padding.
pub struct Page {
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    pub fn row_slot(&self, slot: usize) -> StorageResult<&[u8]> {
        let start = Self::slot_offset(slot)?;
        Ok(&self.data[start..start + ROW_SIZE])
    }

    pub fn row_slot_mut(&mut self, slot: usize) -> StorageResult<&mut [u8]> {
        let start = Self::slot_offset(slot)?;
        Ok(&mut self.data[start..start + ROW_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// Decodes every slot, occupied or not.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.data
            .chunks_exact(ROW_SIZE)
            .take(ROWS_PER_PAGE)
            .filter_map(|chunk| Row::decode(chunk).ok())
    }

    fn slot_offset(slot: usize) -> StorageResult<usize> {
        if slot >= ROWS_PER_PAGE {
            return Err(StorageError::InvalidSlot {
                slot,
                max: ROWS_PER_PAGE - 1,
            });
        }
        Ok(slot * ROW_SIZE)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rows().map(|row| row.to_string()))
            .finish()
    }
}
