use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamError>;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Stream is not readable")]
    NotReadable,
    #[error("Stream is not writable")]
    NotWritable,
    #[error("Stream is not seekable")]
    NotSeekable,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Stream is detached")]
    Detached,
}

impl StreamError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(why) => why,
            StreamError::NotReadable
            | StreamError::NotWritable
            | StreamError::NotSeekable => {
                io::Error::new(io::ErrorKind::Unsupported, err)
            }
            StreamError::InvalidArgument(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            StreamError::Detached => {
                io::Error::new(io::ErrorKind::NotConnected, err)
            }
        }
    }
}
