//! The [`ByteStream`] trait is the one abstraction every source, transformer, and adapter
//! in this crate implements. It is deliberately narrower than `std::io::{Read, Seek}`:
//! seekability is a runtime property ([`ByteStream::is_seekable`]) rather than a type-level
//! guarantee, because [`crate::Encryptor`]/[`crate::Decryptor`] wrapping a CBC method must be
//! able to report "no" without forcing every caller through a fallible adapter.

use std::io::{Read, Seek, SeekFrom};

use crate::aesstream::error::{Error, Result};

/// A readable, optionally-seekable byte source.
///
/// Implementors never need to buffer more than a handful of blocks; [`Encryptor`](crate::Encryptor),
/// [`Decryptor`](crate::Decryptor), and [`HashingStream`](crate::HashingStream) all wrap an
/// inner `ByteStream` and are themselves one, so they nest.
pub trait ByteStream {
    /// Read up to `buf.len()` bytes, returning the number actually read. `0` means EOF.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Whether the stream has been exhausted. The default reads one byte to find out and
    /// is O(1) only if the implementor overrides it; [`IoStream`] and the transformers do.
    fn eof(&mut self) -> Result<bool>;

    /// Reposition the stream. `SeekFrom::Start`/`Current`/`End` mirror `std::io::Seek`.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Current position from the start of the stream.
    fn tell(&mut self) -> Result<u64>;

    /// Total size in bytes, if knowable. `None` when the size cannot be determined without
    /// consuming the stream (e.g. a CBC [`Encryptor`](crate::Encryptor) wrapping a non-seekable source).
    fn size(&mut self) -> Result<Option<u64>>;

    /// Whether `seek`/`tell`/`size` are meaningful for this stream.
    fn is_seekable(&self) -> bool;

    /// Whether this stream accepts writes. Always `false`: this crate models read-side
    /// transformation only.
    fn is_writable(&self) -> bool {
        false
    }

    /// Rewind to the start of the stream. The default implementation is `seek(Start(0))`.
    fn rewind(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Read the stream to completion and return everything read, starting from the
    /// current position.
    fn get_contents(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        Ok(buf)
    }
}

/// Wraps any `Read + Seek` (a file, a `Cursor`, ...) as a seekable [`ByteStream`].
pub struct IoStream<T> {
    inner: T,
}

impl<T: Read + Seek> IoStream<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Unwrap back to the underlying reader.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Seek> ByteStream for IoStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.inner.read(buf)?)
    }

    fn eof(&mut self) -> Result<bool> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(pos >= end)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.inner.seek(pos)?)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    fn size(&mut self) -> Result<Option<u64>> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(Some(end))
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// Wraps any `Read` (a network socket, a pipe, ...) as a forward-only [`ByteStream`].
/// `seek`, `tell`, and `size` all return [`Error::UnsupportedSeek`].
pub struct NonSeekableStream<T> {
    inner: T,
}

impl<T: Read> NonSeekableStream<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> ByteStream for NonSeekableStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.inner.read(buf)?)
    }

    fn eof(&mut self) -> Result<bool> {
        let mut probe = [0u8; 1];
        Ok(self.inner.read(&mut probe)? == 0)
    }

    fn seek(&mut self, _pos: SeekFrom) -> Result<u64> {
        Err(Error::UnsupportedSeek {
            detail: "source is not seekable",
        })
    }

    fn tell(&mut self) -> Result<u64> {
        Err(Error::UnsupportedSeek {
            detail: "source is not seekable",
        })
    }

    fn size(&mut self) -> Result<Option<u64>> {
        Ok(None)
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
