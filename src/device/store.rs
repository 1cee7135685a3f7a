//! Addressable persistent byte storage.
//!
//! [`ByteStore`] is the raw primitive: read and write bytes at an address.
//! [`StoreExt`] layers typed values on top of it:
//!
//! | type     | encoding                                     |
//! |----------|----------------------------------------------|
//! | `i32`    | 4 bytes, little-endian                       |
//! | `i64`    | 8 bytes, little-endian                       |
//! | `String` | `u16` little-endian byte length, then UTF-8  |

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Value of a never-written cell.
pub const ERASED: u8 = 0xFF;

const LEN_PREFIX: usize = 2;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("access of {len} bytes at {addr} exceeds store size {capacity}")]
    OutOfBounds {
        addr: usize,
        len: usize,
        capacity: usize,
    },
    #[error("stored string is {len} bytes, limit is {max}")]
    StringTooLong { len: usize, max: usize },
    #[error("stored string is not valid UTF-8")]
    InvalidString,
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),
}

pub trait ByteStore {
    fn capacity(&self) -> usize;

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), StoreError>;

    fn write(&mut self, addr: usize, bytes: &[u8]) -> Result<(), StoreError>;
}

fn check_bounds(addr: usize, len: usize, capacity: usize) -> Result<(), StoreError> {
    match addr.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StoreError::OutOfBounds {
            addr,
            len,
            capacity,
        }),
    }
}

/// Volatile store, handy for tests and for running without a backing file.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    cells: Vec<u8>,
}

impl MemoryStore {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![ERASED; size],
        }
    }
}

impl ByteStore for MemoryStore {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        check_bounds(addr, buf.len(), self.cells.len())?;
        buf.copy_from_slice(&self.cells[addr..addr + buf.len()]);
        Ok(())
    }

    fn write(&mut self, addr: usize, bytes: &[u8]) -> Result<(), StoreError> {
        check_bounds(addr, bytes.len(), self.cells.len())?;
        self.cells[addr..addr + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

/// Store backed by a fixed-size image file.
///
/// Each write touches only its own bytes on disk and is synced before
/// returning. The image is never truncated once open.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
    image: MemoryStore,
}

impl FileStore {
    /// Opens the image at `path`, creating an erased one when missing.
    ///
    /// An existing image of a different size is truncated or padded with
    /// erased cells.
    pub fn open(path: impl AsRef<Path>, size: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut existing = Vec::with_capacity(size);
        file.read_to_end(&mut existing)?;

        let mut image = MemoryStore::new(size);
        let n = existing.len().min(size);
        image.cells[..n].copy_from_slice(&existing[..n]);

        if existing.len() != size {
            if existing.is_empty() {
                tracing::info!(path = %path.display(), size, "creating store image");
            } else {
                tracing::warn!(
                    path = %path.display(),
                    found = existing.len(),
                    expected = size,
                    "store image size mismatch"
                );
            }
            file.set_len(size as u64)?;
            file.seek(SeekFrom::Start(n as u64))?;
            file.write_all(&image.cells[n..])?;
            file.sync_data()?;
        }

        Ok(Self { path, file, image })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStore for FileStore {
    fn capacity(&self) -> usize {
        self.image.capacity()
    }

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        self.image.read(addr, buf)
    }

    fn write(&mut self, addr: usize, bytes: &[u8]) -> Result<(), StoreError> {
        check_bounds(addr, bytes.len(), self.image.capacity())?;
        self.file.seek(SeekFrom::Start(addr as u64))?;
        self.file.write_all(bytes)?;
        self.file.sync_data()?;
        self.image.write(addr, bytes)
    }
}

impl<S: ByteStore + ?Sized> ByteStore for Box<S> {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        (**self).read(addr, buf)
    }

    fn write(&mut self, addr: usize, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write(addr, bytes)
    }
}

/// Typed values over a [`ByteStore`].
pub trait StoreExt: ByteStore {
    fn read_i32(&self, addr: usize) -> Result<i32, StoreError> {
        let mut buf = [0u8; 4];
        self.read(addr, &mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn write_i32(&mut self, addr: usize, value: i32) -> Result<(), StoreError> {
        self.write(addr, &value.to_le_bytes())
    }

    fn read_i64(&self, addr: usize) -> Result<i64, StoreError> {
        let mut buf = [0u8; 8];
        self.read(addr, &mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    fn write_i64(&mut self, addr: usize, value: i64) -> Result<(), StoreError> {
        self.write(addr, &value.to_le_bytes())
    }

    /// Reads a length-prefixed string of at most `max_len` bytes.
    fn read_string(&self, addr: usize, max_len: usize) -> Result<String, StoreError> {
        let mut prefix = [0u8; LEN_PREFIX];
        self.read(addr, &mut prefix)?;
        let len = usize::from(u16::from_le_bytes(prefix));
        if len > max_len {
            return Err(StoreError::StringTooLong { len, max: max_len });
        }

        let mut buf = vec![0u8; len];
        self.read(addr + LEN_PREFIX, &mut buf)?;
        String::from_utf8(buf).map_err(|_| StoreError::InvalidString)
    }

    /// Writes `value` with its length prefix. Occupies
    /// `2 + value.len()` bytes.
    fn write_string(&mut self, addr: usize, value: &str) -> Result<(), StoreError> {
        let len = u16::try_from(value.len()).map_err(|_| StoreError::StringTooLong {
            len: value.len(),
            max: usize::from(u16::MAX),
        })?;

        let mut encoded = Vec::with_capacity(LEN_PREFIX + value.len());
        encoded.extend_from_slice(&len.to_le_bytes());
        encoded.extend_from_slice(value.as_bytes());
        self.write(addr, &encoded)
    }
}

impl<S: ByteStore + ?Sized> StoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_erased() {
        let store = MemoryStore::new(8);
        let mut buf = [0u8; 8];
        store.read(0, &mut buf).unwrap();
        assert_eq!(buf, [ERASED; 8]);
    }

    #[test]
    fn out_of_bounds_access_is_rejected() {
        let mut store = MemoryStore::new(8);
        assert!(matches!(
            store.write(6, &[1, 2, 3]),
            Err(StoreError::OutOfBounds { addr: 6, len: 3, capacity: 8 })
        ));
        assert!(matches!(
            store.read_i64(usize::MAX),
            Err(StoreError::OutOfBounds { .. })
        ));
    }
}
