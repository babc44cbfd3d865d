use std::convert::TryFrom;

use tempfile::SpooledTempFile;

use crate::decorator::forward_stream;
use crate::error::Result;
use crate::handle::{TempStream, DEFAULT_SPOOL_LIMIT};
use crate::stream::{resolve, to_offset, ByteStream, Detach, Whence, DEFAULT_CHUNK_SIZE};

/// Readable, writable and seekable view of a source which may be read only
/// once.
///
/// Reads and writes go to an internal buffer; bytes missing in the buffer are
/// pulled from the source on demand. A write that reaches beyond what has
/// been pulled from the source so far makes the corresponding source bytes
/// stale: they are counted in `skip_bytes` and thrown away when the source
/// delivers them later, so they never overwrite the written content.
pub struct CachingStream<S>
where
    S: ByteStream,
{
    source: S,
    buffer: TempStream,
    skip_bytes: u64,
}

impl<S> CachingStream<S>
where
    S: ByteStream,
{
    /// Creates a new CachingStream which wraps `source`.
    pub fn new(source: S) -> Self {
        Self::with_spool_limit(source, DEFAULT_SPOOL_LIMIT)
    }

    /// Like [`CachingStream::new`], but keeps at most `max_in_memory` bytes of
    /// the buffer in memory before moving it to a temporary file.
    pub fn with_spool_limit(source: S, max_in_memory: usize) -> Self {
        Self {
            source,
            buffer: TempStream::temp_with_limit(max_in_memory),
            skip_bytes: 0,
        }
    }

    /// Number of source bytes that will be discarded by upcoming reads.
    pub fn skip_bytes(&self) -> u64 {
        self.skip_bytes
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    fn buffered(&mut self) -> Result<u64> {
        Ok(self.buffer.size()?.unwrap_or(0))
    }

    /// Reads up to `length` fresh bytes from the source, dropping stale ones.
    fn read_source(&mut self, length: usize) -> Result<Vec<u8>> {
        loop {
            let skip = usize::try_from(self.skip_bytes).unwrap_or(usize::MAX);
            let mut data = self.source.read(length.saturating_add(skip))?;
            let fetched = data.len();

            if self.skip_bytes > 0 {
                let discarded = skip.min(fetched);
                data.drain(..discarded);
                self.skip_bytes -= discarded as u64;
                log::debug!(
                    "discarded {} stale source bytes, {} pending",
                    discarded,
                    self.skip_bytes
                );
            }

            // a fetch made only of stale bytes says nothing about the end
            if !data.is_empty() || fetched == 0 {
                return Ok(data);
            }
        }
    }

    /// pulls the source until the buffer holds `target` bytes
    fn seek_until_position(&mut self, target: u64) -> Result<()> {
        self.buffer.seek(0, Whence::End)?;
        let mut buffered = self.buffered()?;
        log::debug!("materializing {} bytes to reach offset {}", target - buffered, target);

        while buffered < target && !self.source.eof()? {
            let before = self.source.tell()?;
            let missing = usize::try_from(target - buffered).unwrap_or(usize::MAX);
            self.read(missing)?;
            if self.source.tell()? == before {
                break;
            }
            buffered = self.buffered()?;
        }
        Ok(())
    }

    /// copies what is left in the source to the end of the buffer
    fn drain_source(&mut self) -> Result<u64> {
        self.buffer.seek(0, Whence::End)?;
        while !self.source.eof()? {
            let before = self.source.tell()?;
            self.read(DEFAULT_CHUNK_SIZE)?;
            if self.source.tell()? == before {
                break;
            }
        }
        let size = self.buffered()?;
        log::debug!("drained source, {} bytes buffered", size);
        Ok(size)
    }
}

impl<S> ByteStream for CachingStream<S>
where
    S: ByteStream,
{
    forward_stream!(buffer => is_readable, is_writable, is_seekable, tell, rewind);

    fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut data = self.buffer.read(length)?;
        let remaining = length - data.len();

        if remaining > 0 {
            let source_data = self.read_source(remaining)?;
            self.buffer.write(&source_data)?;
            data.extend_from_slice(&source_data);
        }
        Ok(data)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let overflow =
            data.len() as i128 + i128::from(self.buffer.tell()?) - i128::from(self.source.tell()?);
        if overflow > 0 {
            self.skip_bytes += overflow as u64;
            log::trace!(
                "write ends {} bytes past the source, {} to skip",
                overflow,
                self.skip_bytes
            );
        }
        self.buffer.write(data)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        let target = match whence {
            Whence::Start => resolve(0, offset)?,
            Whence::Current => resolve(self.tell()?, offset)?,
            Whence::End => {
                let size = match self.source.size()? {
                    Some(size) => size,
                    None => self.drain_source()?,
                };
                resolve(size, offset)?
            }
        };

        if target > self.buffered()? {
            self.seek_until_position(target)
        } else {
            self.buffer.seek(to_offset(target)?, Whence::Start)
        }
    }

    fn eof(&mut self) -> Result<bool> {
        Ok(self.buffer.eof()? && self.source.eof()?)
    }

    fn size(&mut self) -> Result<Option<u64>> {
        match self.source.size()? {
            Some(size) => Ok(Some(size.max(self.buffered()?))),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<()> {
        let source = self.source.close();
        let buffer = self.buffer.close();
        source.and(buffer)
    }
}

impl<S> Detach for CachingStream<S>
where
    S: ByteStream,
{
    type Handle = SpooledTempFile;

    /// Hands back the buffer's storage as it is; the source is closed.
    fn detach(&mut self) -> Result<Option<SpooledTempFile>> {
        let handle = self.buffer.detach()?;
        self.source.close()?;
        Ok(handle)
    }
}
