//! Lazily-decompressed view over a bundle's block storage.

use crate::compress::decompress;
use std::io::{self, Read, Seek, SeekFrom};

/// One entry from the bundle directory's block list.
#[derive(Debug, Clone, Copy)]
pub struct BlockInfo {
    pub u_size: u32,
    pub c_size: u32,
    pub flags: u16,
}

/// Presents the concatenated decompressed blocks as one seekable stream.
///
/// Blocks decompress on demand and only the block containing the cursor is
/// kept in memory. Block positions are found by scanning the block list
/// from the front; lists are short enough that nothing fancier pays off.
pub struct BlockStorage<R> {
    blocks: Vec<BlockInfo>,
    reader: R,
    /// Position of the first compressed block in the underlying reader.
    base: u64,
    pos: u64,
    cache_start: u64,
    cache: Vec<u8>,
}

impl<R: Read + Seek> BlockStorage<R> {
    /// The reader must be positioned at the start of the block data.
    pub fn new(blocks: Vec<BlockInfo>, mut reader: R) -> io::Result<Self> {
        let base = reader.stream_position()?;
        Ok(BlockStorage {
            blocks,
            reader,
            base,
            pos: 0,
            cache_start: 0,
            cache: Vec::new(),
        })
    }

    pub fn total_size(&self) -> u64 {
        self.blocks.iter().map(|b| u64::from(b.u_size)).sum()
    }

    /// Loads the block containing `self.pos` into the cache. Returns false
    /// when the position is past the last block.
    fn load_current_block(&mut self) -> io::Result<bool> {
        let mut start = 0u64;
        let mut compressed_ofs = 0u64;
        for block in &self.blocks {
            let end = start + u64::from(block.u_size);
            if self.pos < end {
                self.reader
                    .seek(SeekFrom::Start(self.base + compressed_ofs))?;
                let mut packed = vec![0u8; block.c_size as usize];
                self.reader.read_exact(&mut packed)?;
                self.cache =
                    decompress(&packed, block.u_size as usize, u32::from(block.flags) & 0x3f)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                self.cache_start = start;
                return Ok(true);
            }
            start = end;
            compressed_ofs += u64::from(block.c_size);
        }
        Ok(false)
    }
}

impl<R: Read + Seek> Read for BlockStorage<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let cache_end = self.cache_start + self.cache.len() as u64;
            if self.pos >= self.cache_start && self.pos < cache_end && !self.cache.is_empty() {
                let ofs = (self.pos - self.cache_start) as usize;
                let n = (buf.len() - filled).min(self.cache.len() - ofs);
                buf[filled..filled + n].copy_from_slice(&self.cache[ofs..ofs + n]);
                self.pos += n as u64;
                filled += n;
                continue;
            }
            if !self.load_current_block()? {
                break;
            }
        }
        Ok(filled)
    }
}

impl<R: Read + Seek> Seek for BlockStorage<R> {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let target = match from {
            SeekFrom::Start(ofs) => Some(ofs),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.total_size().checked_add_signed(delta),
        };
        self.pos = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of storage")
        })?;
        Ok(self.pos)
    }
}

/// A bounded window into a stream, with its own cursor.
///
/// Used for the parts of a bundle: each part is an `(offset, size)` span
/// of the decompressed block storage.
pub struct StreamPart<S> {
    inner: S,
    base: u64,
    size: u64,
    pos: u64,
}

impl<S> StreamPart<S> {
    pub fn new(inner: S, base: u64, size: u64) -> Self {
        StreamPart {
            inner,
            base,
            size,
            pos: 0,
        }
    }
}

impl<S: Read + Seek> Read for StreamPart<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.size {
            return Ok(0);
        }
        let limit = ((self.size - self.pos) as usize).min(buf.len());
        self.inner.seek(SeekFrom::Start(self.base + self.pos))?;
        let n = self.inner.read(&mut buf[..limit])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<S: Read + Seek> Seek for StreamPart<S> {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let target = match from {
            SeekFrom::Start(ofs) => Some(ofs),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.size.checked_add_signed(delta),
        };
        self.pos = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of part")
        })?;
        Ok(self.pos)
    }
}
