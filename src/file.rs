use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};

use crate::decorator::forward_stream;
use crate::error::Result;
use crate::handle::{Mode, Stream};
use crate::stream::{copy, ByteStream, Detach};

/// Stream over a file on disk.
#[derive(Debug)]
pub struct FileStream {
    stream: Stream<fs::File>,
    path: PathBuf,
    temp: Option<TempPath>,
}

impl FileStream {
    /// Opens `path` with an `fopen`-style `mode` (see [`Mode::parse`]).
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self> {
        let path = path.as_ref();
        let mode = Mode::parse(mode)?;
        let file = mode.open_options().open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            stream: Stream::with_size(file, mode, size),
            path: path.to_path_buf(),
            temp: None,
        })
    }

    /// Creates an empty temporary file. The file is removed when the stream
    /// is deleted or dropped.
    pub fn temp() -> Result<Self> {
        let (file, temp) = NamedTempFile::new()?.into_parts();
        log::trace!("created temporary file {}", temp.display());

        Ok(Self {
            stream: Stream::with_size(file, Mode::read_write(), 0),
            path: temp.to_path_buf(),
            temp: Some(temp),
        })
    }

    /// Temporary file holding a copy of `source`, positioned at the start.
    pub fn temp_from(source: &mut dyn ByteStream) -> Result<Self> {
        let mut file = Self::temp()?;
        let copied = copy(source, &mut file)?;
        file.rewind()?;
        log::debug!("spooled {} bytes into {}", copied, file.path.display());
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the stream and removes the file from disk.
    pub fn delete(mut self) -> Result<()> {
        self.stream.close()?;
        match self.temp.take() {
            Some(temp) => temp.close()?,
            None => fs::remove_file(&self.path)?,
        }
        log::debug!("deleted {}", self.path.display());
        Ok(())
    }
}

impl ByteStream for FileStream {
    forward_stream!(stream =>
        is_readable, is_writable, is_seekable,
        read, write, seek, tell, eof, size, close,
    );
}

impl Detach for FileStream {
    type Handle = fs::File;

    fn detach(&mut self) -> Result<Option<fs::File>> {
        self.stream.detach()
    }
}
