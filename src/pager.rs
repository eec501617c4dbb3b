use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::page::Page;
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

/// Backing storage for a [`Pager`].
pub trait DbFile: Read + Write + Seek {
    /// Current length of the underlying storage in bytes.
    fn byte_len(&self) -> io::Result<u64>;

    /// Makes written bytes durable before the handle is released.
    fn close(&mut self) -> io::Result<()>;
}

impl DbFile for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

impl DbFile for Cursor<Vec<u8>> {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F: DbFile + ?Sized> DbFile for &mut F {
    fn byte_len(&self) -> io::Result<u64> {
        (**self).byte_len()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Page cache over a single database file.
///
/// Holds up to [`TABLE_MAX_PAGES`] pages. A page is read from the file the first
/// time it is requested and stays resident for the rest of the session; from then
/// on the in-memory copy is authoritative and only [`Pager::flush`] writes it back.
pub struct Pager<F = File> {
    file: F,
    file_length: u64,
    pages: Vec<Option<Page>>,
}

impl Pager<File> {
    /// Opens `path` for reading and writing, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.display().to_string(),
                source,
            })?;

        let pager = Self::with_file(file)?;
        info!(
            "opened {} ({} bytes on disk)",
            path.display(),
            pager.file_length
        );
        Ok(pager)
    }
}

impl<F: DbFile> Pager<F> {
    pub fn with_file(file: F) -> StorageResult<Self> {
        let file_length = file.byte_len().map_err(StorageError::Stat)?;
        Ok(Self {
            file,
            file_length,
            pages: std::iter::repeat_with(|| None).take(TABLE_MAX_PAGES).collect(),
        })
    }

    /// File length observed when the pager was opened.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    pub fn is_resident(&self, page_num: usize) -> bool {
        matches!(self.pages.get(page_num), Some(Some(_)))
    }

    /// Number of pages that had content on disk at open time.
    pub fn pages_on_disk(&self) -> usize {
        self.file_length.div_ceil(PAGE_SIZE as u64) as usize
    }

    pub fn get_page(&mut self, page_num: usize) -> StorageResult<&mut Page> {
        if page_num >= TABLE_MAX_PAGES {
            return Err(StorageError::PageOutOfBounds {
                page_num,
                max: TABLE_MAX_PAGES - 1,
            });
        }

        let pages_on_disk = self.pages_on_disk();
        match &mut self.pages[page_num] {
            Some(page) => Ok(page),
            slot @ None => {
                let page = load_page(&mut self.file, self.file_length, pages_on_disk, page_num)?;
                Ok(slot.insert(page))
            }
        }
    }

    /// Writes the first `byte_count` bytes of a resident page to its place in the file.
    pub fn flush(&mut self, page_num: usize, byte_count: usize) -> StorageResult<()> {
        if byte_count > PAGE_SIZE {
            return Err(StorageError::FlushTooLarge {
                page_num,
                byte_count,
                max: PAGE_SIZE,
            });
        }
        let Some(Some(page)) = self.pages.get(page_num) else {
            return Err(StorageError::FlushAbsentPage(page_num));
        };

        self.file
            .seek(SeekFrom::Start(page_offset(page_num)))
            .map_err(|source| StorageError::Seek { page_num, source })?;
        self.file
            .write_all(&page.as_bytes()[..byte_count])
            .map_err(|source| StorageError::Write { page_num, source })?;

        debug!("flushed page {page_num} ({byte_count} bytes)");
        Ok(())
    }

    /// Releases the file. Resident pages are not flushed here.
    pub fn close(mut self) -> StorageResult<()> {
        self.file.flush().map_err(StorageError::Close)?;
        self.file.close().map_err(StorageError::Close)?;
        info!("closed database file");
        Ok(())
    }
}

fn page_offset(page_num: usize) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}

fn load_page<F: DbFile>(
    file: &mut F,
    file_length: u64,
    pages_on_disk: usize,
    page_num: usize,
) -> StorageResult<Page> {
    let mut page = Page::new();
    if page_num >= pages_on_disk {
        debug!("allocated empty page {page_num}");
        return Ok(page);
    }

    let offset = page_offset(page_num);
    // the last page on disk may be partial
    let available = (file_length - offset).min(PAGE_SIZE as u64) as usize;

    file.seek(SeekFrom::Start(offset))
        .map_err(|source| StorageError::Seek { page_num, source })?;
    file.read_exact(&mut page.as_bytes_mut()[..available])
        .map_err(|source| StorageError::Read { page_num, source })?;

    debug!("materialized page {page_num} from disk ({available} bytes)");
    Ok(page)
}
