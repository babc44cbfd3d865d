use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::stream::{to_offset, ByteStream, Whence};

/// Exposes a [`ByteStream`] through the [`std::io`] traits.
///
/// Together with [`BufferedStream`](crate::BufferedStream) this turns any
/// [`Read`] into a [`Read`] + [`Seek`], which can be handed to binary parsers
/// expecting seekable input.
#[derive(Debug)]
pub struct Compat<S> {
    stream: S,
}

impl<S> Compat<S>
where
    S: ByteStream,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> Read for Compat<S>
where
    S: ByteStream,
{
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let data = self.stream.read(dst.len())?;
        dst[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

impl<S> Write for Compat<S>
where
    S: ByteStream,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.stream.write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S> Seek for Compat<S>
where
    S: ByteStream,
{
    fn seek(&mut self, seek_from: SeekFrom) -> io::Result<u64> {
        match seek_from {
            SeekFrom::Start(pos) => self.stream.seek(to_offset(pos)?, Whence::Start)?,
            SeekFrom::Current(pos) => self.stream.seek(pos, Whence::Current)?,
            SeekFrom::End(pos) => self.stream.seek(pos, Whence::End)?,
        }
        Ok(self.stream.tell()?)
    }
}
