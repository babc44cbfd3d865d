use std::convert::TryFrom;

use tempfile::SpooledTempFile;

use crate::decorator::forward_stream;
use crate::error::{Result, StreamError};
use crate::handle::{TempStream, DEFAULT_SPOOL_LIMIT};
use crate::stream::{resolve, to_offset, ByteStream, Detach, Whence};

/// Read-only, fully seekable view of a source which may be read only once.
///
/// Every byte pulled from the source is mirrored into an internal temporary
/// buffer, so seeking backward never touches the source again. Seeking
/// forward beyond what has been read so far pulls the missing bytes from the
/// source (and keeps them).
pub struct BufferedStream<S>
where
    S: ByteStream,
{
    source: S,
    buffer: TempStream,
    written: u64,
}

impl<S> BufferedStream<S>
where
    S: ByteStream,
{
    /// Creates a new BufferedStream which wraps `source`.
    pub fn new(source: S) -> Self {
        Self::with_spool_limit(source, DEFAULT_SPOOL_LIMIT)
    }

    /// Creates a new BufferedStream with a specified spool limit.
    ///
    ///  - `source` - Stream which has to be wrapped
    ///  - `max_in_memory` - Number of buffered bytes kept in memory. Once the buffer grows beyond that, it is moved into a temporary file.
    pub fn with_spool_limit(source: S, max_in_memory: usize) -> Self {
        Self {
            source,
            buffer: TempStream::temp_with_limit(max_in_memory),
            written: 0,
        }
    }

    /// Returns the number of bytes pulled from the source so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// reads from the source and appends everything to the buffer
    fn read_source(&mut self, length: usize) -> Result<Vec<u8>> {
        let data = self.source.read(length)?;
        let appended = self.buffer.write(&data)?;
        self.written += appended as u64;
        Ok(data)
    }

    /// pull bytes from the source until `target` is buffered (or the source
    /// has nothing more to give)
    fn seek_until_position(&mut self, target: u64) -> Result<()> {
        log::debug!(
            "materializing {} bytes to reach offset {}",
            target - self.written,
            target
        );
        self.buffer.seek(to_offset(self.written)?, Whence::Start)?;
        while self.written < target {
            let missing = usize::try_from(target - self.written).unwrap_or(usize::MAX);
            if self.read(missing)?.is_empty() {
                log::debug!("source ended at offset {} before {}", self.written, target);
                break;
            }
        }
        Ok(())
    }
}

impl<S> ByteStream for BufferedStream<S>
where
    S: ByteStream,
{
    forward_stream!(buffer => is_readable, is_seekable, tell, rewind);

    fn is_writable(&self) -> bool {
        false
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        if self.buffer.tell()? != self.written {
            data = self.buffer.read(length)?;
        }

        if data.len() < length {
            let source_data = self.read_source(length - data.len())?;
            data.extend_from_slice(&source_data);
        }
        log::trace!("read {} of {} bytes, {} buffered", data.len(), length, self.written);
        Ok(data)
    }

    fn write(&mut self, _data: &[u8]) -> Result<usize> {
        Err(StreamError::NotWritable)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        let target = match whence {
            Whence::Start => resolve(0, offset)?,
            Whence::Current => resolve(self.tell()?, offset)?,
            Whence::End => resolve(self.size()?.unwrap_or(0), offset)?,
        };

        if target > self.written {
            self.seek_until_position(target)
        } else {
            self.buffer.seek(to_offset(target)?, Whence::Start)
        }
    }

    fn eof(&mut self) -> Result<bool> {
        Ok(self.source.eof()? && self.buffer.tell()? == self.written)
    }

    fn size(&mut self) -> Result<Option<u64>> {
        let size = self.source.size()?;
        if size.is_none() && self.source.eof()? {
            return Ok(Some(self.written));
        }
        Ok(size)
    }

    fn close(&mut self) -> Result<()> {
        let source = self.source.close();
        let buffer = self.buffer.close();
        source.and(buffer)
    }

    fn copy_from(&mut self, _source: &mut dyn ByteStream) -> Result<u64>
    where
        Self: Sized,
    {
        Err(StreamError::NotWritable)
    }
}

impl<S> Detach for BufferedStream<S>
where
    S: ByteStream,
{
    type Handle = SpooledTempFile;

    /// Pulls everything left in the source into the buffer, closes the
    /// source and returns the buffer's storage.
    fn detach(&mut self) -> Result<Option<SpooledTempFile>> {
        if self.buffer.get_ref().is_none() {
            return Ok(None);
        }
        self.get_contents()?;
        self.source.close()?;
        log::debug!("detaching buffer holding {} bytes", self.written);
        self.buffer.detach()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ForwardStream, Stream};
    use std::io::{self, Read, Seek, SeekFrom};

    /// hands out its data, then fails every further read
    struct FailAfter<'a>(&'a [u8]);

    impl Read for FailAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"));
            }
            let len = buf.len().min(self.0.len());
            buf[..len].copy_from_slice(&self.0[..len]);
            self.0 = &self.0[len..];
            Ok(len)
        }
    }

    /// counts how often the wrapped source is asked for data
    struct CountingSource<S> {
        inner: S,
        reads: usize,
    }

    impl<S> ByteStream for CountingSource<S>
    where
        S: ByteStream,
    {
        forward_stream!(inner =>
            is_readable, is_writable, is_seekable,
            write, seek, tell, eof, size, close,
        );

        fn read(&mut self, length: usize) -> Result<Vec<u8>> {
            self.reads += 1;
            self.inner.read(length)
        }
    }

    fn counting(data: &'static [u8]) -> CountingSource<ForwardStream<&'static [u8]>> {
        CountingSource {
            inner: ForwardStream::new(data),
            reads: 0,
        }
    }

    #[test]
    fn buffered_reads_do_not_touch_the_source() {
        let mut stream = BufferedStream::new(counting(b"abcdefgh"));
        assert_eq!(stream.read(4).unwrap(), b"abcd");
        assert_eq!(stream.get_ref().reads, 1);

        stream.rewind().unwrap();
        assert_eq!(stream.read(4).unwrap(), b"abcd");
        stream.seek(1, Whence::Start).unwrap();
        assert_eq!(stream.read(2).unwrap(), b"bc");
        assert_eq!(stream.get_ref().reads, 1);
    }

    #[test]
    fn read_across_the_frontier_combines_buffer_and_source() {
        let mut stream = BufferedStream::new(counting(b"abcdefgh"));
        stream.read(3).unwrap();
        stream.seek(1, Whence::Start).unwrap();

        assert_eq!(stream.read(4).unwrap(), b"bcde");
        assert_eq!(stream.written(), 5);
        assert_eq!(stream.tell().unwrap(), 5);
        assert_eq!(stream.get_ref().reads, 2);
    }

    #[test]
    fn forward_seek_from_behind_the_frontier() {
        let mut stream = BufferedStream::new(ForwardStream::new(&b"testing"[..]));
        stream.seek(3, Whence::Start).unwrap();
        stream.seek(0, Whence::Start).unwrap();

        stream.seek(5, Whence::Start).unwrap();
        assert_eq!(stream.tell().unwrap(), 5);
        assert_eq!(stream.read(1).unwrap(), b"n");
    }

    #[test]
    fn seek_current_is_relative_to_the_cursor() {
        let mut stream = BufferedStream::new(ForwardStream::new(&b"abcdef"[..]));
        stream.read(2).unwrap();
        stream.seek(2, Whence::Current).unwrap();
        assert_eq!(stream.read(1).unwrap(), b"e");
        stream.seek(-3, Whence::Current).unwrap();
        assert_eq!(stream.read(1).unwrap(), b"c");
        assert!(matches!(
            stream.seek(-10, Whence::Current),
            Err(StreamError::InvalidArgument(_))
        ));
        assert_eq!(stream.tell().unwrap(), 3);
    }

    #[test]
    fn written_never_decreases() {
        let mut stream = BufferedStream::new(ForwardStream::new(&b"abcdefghij"[..]));
        let mut last = 0;
        let steps: [(i64, Whence); 5] = [
            (4, Whence::Start),
            (0, Whence::Start),
            (2, Whence::Current),
            (8, Whence::Start),
            (-1, Whence::Current),
        ];
        for (offset, whence) in steps.iter() {
            stream.seek(*offset, *whence).unwrap();
            stream.read(1).unwrap();
            assert!(stream.written() >= last);
            assert!(stream.written() >= stream.tell().unwrap());
            last = stream.written();
        }
        assert_eq!(last, 9);
    }

    #[test]
    fn size_of_unknown_source_is_known_once_drained() {
        let mut stream = BufferedStream::new(ForwardStream::new(&b"abc"[..]));
        assert_eq!(stream.size().unwrap(), None);
        assert_eq!(stream.get_contents().unwrap(), b"abc");
        assert_eq!(stream.size().unwrap(), Some(3));
        assert!(stream.eof().unwrap());

        stream.seek(1, Whence::Start).unwrap();
        assert!(!stream.eof().unwrap());
    }

    #[test]
    fn seek_end_with_unknown_size_is_relative_to_zero() {
        let mut stream = BufferedStream::new(ForwardStream::new(&b"abcdef"[..]));
        stream.seek(2, Whence::End).unwrap();
        assert_eq!(stream.read(1).unwrap(), b"c");
    }

    #[test]
    fn never_writable() {
        let mut stream = BufferedStream::new(Stream::from_bytes("abc"));
        assert!(!stream.is_writable());
        assert!(stream.is_readable() && stream.is_seekable());
        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));

        let mut other = Stream::from_bytes("xyz");
        assert!(matches!(
            stream.copy_from(&mut other),
            Err(StreamError::NotWritable)
        ));
    }

    #[test]
    fn detach_materializes_everything() {
        let mut stream = BufferedStream::with_spool_limit(ForwardStream::new(&b"abcdef"[..]), 2);
        stream.read(2).unwrap();

        let mut buffer = stream.detach().unwrap().unwrap();
        assert!(buffer.is_rolled());
        buffer.seek(SeekFrom::Start(0)).unwrap();
        let mut contents = Vec::new();
        buffer.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"abcdef");

        assert!(!stream.get_ref().is_readable());
        assert!(matches!(stream.read(1), Err(StreamError::Detached)));
        assert!(stream.detach().unwrap().is_none());
    }

    #[test]
    fn close_releases_source_and_buffer() {
        let mut stream = BufferedStream::new(ForwardStream::new(&b"abc"[..]));
        stream.read(1).unwrap();
        stream.close().unwrap();
        stream.close().unwrap();

        assert!(!stream.is_readable());
        assert!(!stream.get_ref().is_readable());
        assert!(matches!(stream.tell(), Err(StreamError::Detached)));
        assert!(matches!(stream.eof(), Err(StreamError::Detached)));
    }

    #[test]
    fn failing_source_keeps_what_was_pulled() {
        let mut stream = BufferedStream::new(ForwardStream::new(FailAfter(b"abcde")));
        assert!(matches!(stream.seek(8, Whence::Start), Err(StreamError::Io(_))));

        assert_eq!(stream.written(), 5);
        assert_eq!(stream.tell().unwrap(), 5);
        assert!(!stream.eof().unwrap());

        stream.rewind().unwrap();
        assert_eq!(stream.read(5).unwrap(), b"abcde");
    }
}
