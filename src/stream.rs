use std::convert::TryFrom;
use std::io::ErrorKind;

use crate::error::{Result, StreamError};

/// Number of bytes requested per call by the drain loops
/// ([`ByteStream::get_contents`] and [`copy`]).
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Reference point of a [`ByteStream::seek`] offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl TryFrom<i32> for Whence {
    type Error = StreamError;

    /// Accepts the C `SEEK_SET`, `SEEK_CUR` and `SEEK_END` codes.
    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(StreamError::invalid(format!("invalid whence {}", value))),
        }
    }
}

/// Capability-tagged sequential container of bytes.
///
/// Each capability (readable, writable, seekable) may independently be
/// missing; operations against a missing capability fail with
/// [`StreamError::NotReadable`], [`StreamError::NotWritable`] or
/// [`StreamError::NotSeekable`] instead of silently doing nothing. Once a
/// stream is closed (or detached) every operation fails with
/// [`StreamError::Detached`].
///
/// Decorators implement this trait themselves, so they can wrap each other.
pub trait ByteStream {
    fn is_readable(&self) -> bool;
    fn is_writable(&self) -> bool;
    fn is_seekable(&self) -> bool;

    /// Reads up to `length` bytes. An empty result means end of stream
    /// (or `length == 0`).
    fn read(&mut self, length: usize) -> Result<Vec<u8>>;

    /// Writes `data` and returns how many bytes were actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<()>;

    fn tell(&mut self) -> Result<u64>;

    fn eof(&mut self) -> Result<bool>;

    /// Total length of the stream, if it can be determined.
    fn size(&mut self) -> Result<Option<u64>>;

    /// Releases the underlying resources. Closing twice is not an error.
    fn close(&mut self) -> Result<()>;

    fn rewind(&mut self) -> Result<()> {
        self.seek(0, Whence::Start)
    }

    /// Reads everything from the current position up to the end of the stream.
    fn get_contents(&mut self) -> Result<Vec<u8>> {
        let mut contents = Vec::new();
        while !self.eof()? {
            let chunk = self.read(DEFAULT_CHUNK_SIZE)?;
            if chunk.is_empty() {
                break;
            }
            contents.extend_from_slice(&chunk);
        }
        Ok(contents)
    }

    /// Copies the whole content of `source` into this stream, see [`copy`].
    fn copy_from(&mut self, source: &mut dyn ByteStream) -> Result<u64>
    where
        Self: Sized,
    {
        copy(source, self)
    }
}

impl<S> ByteStream for Box<S>
where
    S: ByteStream + ?Sized,
{
    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        (**self).read(length)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        (**self).seek(offset, whence)
    }

    fn tell(&mut self) -> Result<u64> {
        (**self).tell()
    }

    fn eof(&mut self) -> Result<bool> {
        (**self).eof()
    }

    fn size(&mut self) -> Result<Option<u64>> {
        (**self).size()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn rewind(&mut self) -> Result<()> {
        (**self).rewind()
    }

    fn get_contents(&mut self) -> Result<Vec<u8>> {
        (**self).get_contents()
    }
}

/// Streams which can hand their underlying storage back to the caller.
pub trait Detach {
    type Handle;

    /// Releases the underlying handle without closing it. The stream is
    /// unusable afterwards; `None` means it was already closed or detached.
    fn detach(&mut self) -> Result<Option<Self::Handle>>;
}

/// Copies the whole content of `source` into `target`.
///
/// A seekable source is rewound first and put back to its previous position
/// afterwards; a forward-only source is copied from wherever it currently is.
/// Returns the number of bytes written into `target`.
pub fn copy(source: &mut dyn ByteStream, target: &mut dyn ByteStream) -> Result<u64> {
    if !source.is_readable() {
        return Err(StreamError::NotReadable);
    }
    if !target.is_writable() {
        return Err(StreamError::NotWritable);
    }

    let position = if source.is_seekable() {
        let position = source.tell()?;
        source.rewind()?;
        Some(position)
    } else {
        None
    };

    let mut copied = 0;
    while !source.eof()? {
        let chunk = source.read(DEFAULT_CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }
        write_all(target, &chunk)?;
        copied += chunk.len() as u64;
    }

    if let Some(position) = position {
        source.seek(to_offset(position)?, Whence::Start)?;
    }
    log::trace!("copied {} bytes between streams", copied);
    Ok(copied)
}

pub(crate) fn write_all(target: &mut dyn ByteStream, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        let written = target.write(data)?;
        if written == 0 {
            return Err(
                std::io::Error::new(ErrorKind::WriteZero, "failed to write whole buffer").into(),
            );
        }
        data = &data[written..];
    }
    Ok(())
}

/// Resolves `offset` relative to `base` into an absolute position.
pub(crate) fn resolve(base: u64, offset: i64) -> Result<u64> {
    let target = i128::from(base) + i128::from(offset);
    if target < 0 {
        return Err(StreamError::invalid(format!(
            "cannot seek to negative position {}",
            target
        )));
    }
    u64::try_from(target).map_err(|_| StreamError::invalid("seek position out of range"))
}

pub(crate) fn to_offset(position: u64) -> Result<i64> {
    i64::try_from(position).map_err(|_| StreamError::invalid("seek position out of range"))
}
