use std::io::{ErrorKind, Read};

use crate::error::{Result, StreamError};
use crate::stream::{ByteStream, Detach, Whence};

/// Upper bound for a single read from the wrapped reader, so that a huge
/// `length` does not allocate a huge buffer up front.
const MAX_READ: usize = 64 * 1024;

/// Single-pass, read-only source such as a network body or a pipe.
///
/// The stream cannot seek or write; it only counts how many bytes have been
/// consumed. A size can be declared up front (e.g. a `Content-Length`),
/// otherwise it stays unknown.
#[derive(Debug)]
pub struct ForwardStream<R> {
    inner: Option<R>,
    position: u64,
    size: Option<u64>,
    exhausted: bool,
}

impl<R> ForwardStream<R>
where
    R: Read,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner: Some(inner),
            position: 0,
            size: None,
            exhausted: false,
        }
    }

    pub fn with_size(inner: R, size: u64) -> Self {
        Self {
            size: Some(size),
            ..Self::new(inner)
        }
    }

    pub fn get_ref(&self) -> Option<&R> {
        self.inner.as_ref()
    }

    fn inner(&mut self) -> Result<&mut R> {
        self.inner.as_mut().ok_or(StreamError::Detached)
    }
}

impl<R> ByteStream for ForwardStream<R>
where
    R: Read,
{
    fn is_readable(&self) -> bool {
        self.inner.is_some()
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        let inner = self.inner()?;
        if length == 0 {
            return Ok(Vec::new());
        }

        let mut data = vec![0; length.min(MAX_READ)];
        let bytes = loop {
            match inner.read(&mut data) {
                Ok(bytes) => break bytes,
                Err(why) if why.kind() == ErrorKind::Interrupted => continue,
                Err(why) => return Err(why.into()),
            }
        };
        data.truncate(bytes);

        self.position += bytes as u64;
        if bytes == 0 {
            self.exhausted = true;
        }
        Ok(data)
    }

    fn write(&mut self, _data: &[u8]) -> Result<usize> {
        self.inner()?;
        Err(StreamError::NotWritable)
    }

    fn seek(&mut self, _offset: i64, _whence: Whence) -> Result<()> {
        self.inner()?;
        Err(StreamError::NotSeekable)
    }

    fn tell(&mut self) -> Result<u64> {
        self.inner()?;
        Ok(self.position)
    }

    fn eof(&mut self) -> Result<bool> {
        self.inner()?;
        Ok(self.exhausted || self.size.map_or(false, |size| self.position >= size))
    }

    fn size(&mut self) -> Result<Option<u64>> {
        self.inner()?;
        Ok(self.size)
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        Ok(())
    }
}

impl<R> Detach for ForwardStream<R>
where
    R: Read,
{
    type Handle = R;

    fn detach(&mut self) -> Result<Option<R>> {
        Ok(self.inner.take())
    }
}
