use std::fs::File;
use std::path::Path;

use clap::ValueEnum;
use log::{info, warn};

use crate::error::{ExecuteError, StorageResult};
use crate::page::Page;
use crate::pager::{DbFile, Pager};
use crate::row::Row;
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_ROWS};

/// What `select_all` does with a row it cannot decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DecodePolicy {
    /// Fail the whole select.
    #[default]
    Abort,
    /// Leave the row out and keep going.
    Skip,
}

/// A single table of rows stored back to back in pages.
///
/// Row `i` lives in page `i / ROWS_PER_PAGE` at slot `i % ROWS_PER_PAGE`.
/// Closing consumes the table; nothing reaches the file until then.
pub struct Table<F = File> {
    pager: Pager<F>,
    num_rows: usize,
}

impl Table<File> {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::from_pager(Pager::open(path)?))
    }
}

impl<F: DbFile> Table<F> {
    pub fn with_file(file: F) -> StorageResult<Self> {
        Ok(Self::from_pager(Pager::with_file(file)?))
    }

    fn from_pager(pager: Pager<F>) -> Self {
        // Full pages carry padding, so this overcounts once enough of them are on disk.
        let num_rows = (pager.file_length() / ROW_SIZE as u64) as usize;
        info!("table has {num_rows} rows");
        Self { pager, num_rows }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn pager(&self) -> &Pager<F> {
        &self.pager
    }

    fn row_slot(&mut self, row_index: usize) -> StorageResult<(&mut Page, usize)> {
        let page_num = row_index / ROWS_PER_PAGE;
        let page = self.pager.get_page(page_num)?;
        Ok((page, row_index % ROWS_PER_PAGE))
    }

    /// Appends `row`. A full table is left unchanged.
    pub fn insert(&mut self, row: &Row) -> Result<(), ExecuteError> {
        if self.num_rows >= TABLE_MAX_ROWS {
            return Err(ExecuteError::TableFull);
        }

        let (page, slot) = self.row_slot(self.num_rows)?;
        page.row_slot_mut(slot)?.copy_from_slice(&row.encode());
        self.num_rows += 1;
        Ok(())
    }

    /// Reads one row, touching only the page that holds it.
    pub fn row(&mut self, row_index: usize) -> Result<Option<Row>, ExecuteError> {
        if row_index >= self.num_rows {
            return Ok(None);
        }
        let (page, slot) = self.row_slot(row_index)?;
        Row::decode(page.row_slot(slot)?)
            .map(Some)
            .map_err(|source| ExecuteError::DecodeFailed { row_index, source })
    }

    /// All rows in insertion order.
    pub fn select_all(&mut self, policy: DecodePolicy) -> Result<Vec<Row>, ExecuteError> {
        let mut rows = Vec::with_capacity(self.num_rows);
        for row_index in 0..self.num_rows {
            match self.row(row_index) {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break,
                // unreachable through the pager today; kept so the policy has a defined meaning
                Err(ExecuteError::DecodeFailed { row_index, source })
                    if policy == DecodePolicy::Skip =>
                {
                    warn!("skipping row {row_index}: {source}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(rows)
    }

    /// Flushes every resident page and releases the file.
    ///
    /// Full pages are written whole, padding included; the last partial page is
    /// written only up to its final row. Pages never touched this session are
    /// left as they are on disk.
    pub fn close(mut self) -> StorageResult<()> {
        let num_full_pages = self.num_rows / ROWS_PER_PAGE;
        for page_num in 0..num_full_pages {
            if self.pager.is_resident(page_num) {
                self.pager.flush(page_num, PAGE_SIZE)?;
            }
        }

        let num_additional_rows = self.num_rows % ROWS_PER_PAGE;
        if num_additional_rows > 0 && self.pager.is_resident(num_full_pages) {
            self.pager.flush(num_full_pages, num_additional_rows * ROW_SIZE)?;
        }

        self.pager.close()
    }
}
