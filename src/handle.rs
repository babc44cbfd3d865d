use std::fs::OpenOptions;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use tempfile::SpooledTempFile;

use crate::error::{Result, StreamError};
use crate::stream::{copy, ByteStream, Detach, Whence};

/// Number of bytes a temporary stream keeps in memory before it spills over
/// into a file on disk.
pub const DEFAULT_SPOOL_LIMIT: usize = 2 * 1024 * 1024;

/// Temporary read/write stream, held in memory up to its spool limit.
pub type TempStream = Stream<SpooledTempFile>;

/// Access mode of a [`Stream`], parsed from an `fopen`-style mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    readable: bool,
    writable: bool,
    append: bool,
    truncate: bool,
    create: bool,
    create_new: bool,
}

impl Mode {
    /// Mode of memory and temporary streams (`"w+b"`).
    pub fn read_write() -> Self {
        Self {
            readable: true,
            writable: true,
            append: false,
            truncate: false,
            create: false,
            create_new: false,
        }
    }

    /// Parses modes such as `"r"`, `"rb+"`, `"w+"`, `"a"`, `"x+b"` or `"c+"`.
    pub fn parse(mode: &str) -> Result<Self> {
        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            Some('r') => Self {
                readable: true,
                writable: false,
                ..Self::read_write()
            },
            Some('w') => Self {
                readable: false,
                create: true,
                truncate: true,
                ..Self::read_write()
            },
            Some('a') => Self {
                readable: false,
                create: true,
                append: true,
                ..Self::read_write()
            },
            Some('x') => Self {
                readable: false,
                create_new: true,
                ..Self::read_write()
            },
            Some('c') => Self {
                readable: false,
                create: true,
                ..Self::read_write()
            },
            _ => return Err(StreamError::invalid(format!("invalid mode '{}'", mode))),
        };

        for c in chars {
            match c {
                '+' => {
                    parsed.readable = true;
                    parsed.writable = true;
                }
                'b' | 't' => {}
                _ => return Err(StreamError::invalid(format!("invalid mode '{}'", mode))),
            }
        }
        Ok(parsed)
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.readable)
            .write(self.writable && !self.append)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.create)
            .create_new(self.create_new);
        options
    }
}

/// Seekable stream over a handle such as a memory cursor, a spooled
/// temporary file or a file on disk.
///
/// The stream is usable until it is closed or detached; after that the
/// handle is gone and every operation fails with [`StreamError::Detached`].
#[derive(Debug)]
pub struct Stream<H> {
    handle: Option<H>,
    size: Option<u64>,
    mode: Mode,
}

impl<H> Stream<H>
where
    H: Read + Write + Seek,
{
    pub fn new(handle: H, mode: Mode) -> Self {
        Self {
            handle: Some(handle),
            size: None,
            mode,
        }
    }

    /// Creates a stream whose size is already known, which saves measuring
    /// it through the handle. The size is forgotten on the first write.
    pub fn with_size(handle: H, mode: Mode, size: u64) -> Self {
        Self {
            handle: Some(handle),
            size: Some(size),
            mode,
        }
    }

    pub fn get_ref(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    fn handle(&mut self) -> Result<&mut H> {
        self.handle.as_mut().ok_or(StreamError::Detached)
    }

    fn measure(&mut self) -> Result<u64> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let handle = self.handle()?;
        let position = handle.stream_position()?;
        let end = handle.seek(SeekFrom::End(0))?;
        if position != end {
            handle.seek(SeekFrom::Start(position))?;
        }
        Ok(end)
    }
}

impl Stream<Cursor<Vec<u8>>> {
    /// In-memory stream holding `bytes`, positioned at the start.
    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        let bytes = bytes.into();
        let size = bytes.len() as u64;
        Self::with_size(Cursor::new(bytes), Mode::read_write(), size)
    }
}

impl Stream<SpooledTempFile> {
    /// Empty temporary stream with the default spool limit.
    pub fn temp() -> Self {
        Self::temp_with_limit(DEFAULT_SPOOL_LIMIT)
    }

    pub fn temp_with_limit(max_in_memory: usize) -> Self {
        Self::new(SpooledTempFile::new(max_in_memory), Mode::read_write())
    }

    /// Temporary stream holding a copy of `source`, positioned at the start.
    pub fn temp_from(source: &mut dyn ByteStream) -> Result<Self> {
        let mut stream = Self::temp();
        copy(source, &mut stream)?;
        stream.rewind()?;
        Ok(stream)
    }
}

impl<H> ByteStream for Stream<H>
where
    H: Read + Write + Seek,
{
    fn is_readable(&self) -> bool {
        self.handle.is_some() && self.mode.readable
    }

    fn is_writable(&self) -> bool {
        self.handle.is_some() && self.mode.writable
    }

    fn is_seekable(&self) -> bool {
        self.handle.is_some()
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        let readable = self.mode.readable;
        let handle = self.handle()?;
        if !readable {
            return Err(StreamError::NotReadable);
        }
        let mut data = Vec::new();
        if length > 0 {
            Read::take(&mut *handle, length as u64).read_to_end(&mut data)?;
        }
        Ok(data)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let writable = self.mode.writable;
        let handle = self.handle()?;
        if !writable {
            return Err(StreamError::NotWritable);
        }
        handle.write_all(data)?;
        self.size = None;
        Ok(data.len())
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        let handle = self.handle()?;
        let target = match whence {
            Whence::Start if offset < 0 => {
                return Err(StreamError::invalid(format!(
                    "cannot seek to negative position {}",
                    offset
                )))
            }
            Whence::Start => SeekFrom::Start(offset as u64),
            Whence::Current => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };
        handle.seek(target)?;
        Ok(())
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.handle()?.stream_position()?)
    }

    fn eof(&mut self) -> Result<bool> {
        let position = self.tell()?;
        Ok(position >= self.measure()?)
    }

    fn size(&mut self) -> Result<Option<u64>> {
        Ok(Some(self.measure()?))
    }

    fn close(&mut self) -> Result<()> {
        self.size = None;
        if let Some(mut handle) = self.handle.take() {
            if self.mode.writable {
                handle.flush()?;
            }
        }
        Ok(())
    }
}

impl<H> Detach for Stream<H>
where
    H: Read + Write + Seek,
{
    type Handle = H;

    fn detach(&mut self) -> Result<Option<H>> {
        self.size = None;
        Ok(self.handle.take())
    }
}
