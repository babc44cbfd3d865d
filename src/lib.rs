//! This crate provides stream decorators which add random access to byte
//! sources that can only be read once and only forward, such as network
//! bodies or pipes. In other words, [`BufferedStream`] turns a forward-only
//! source into a fully seekable one, and [`CachingStream`] additionally
//! accepts writes on top of it.
//!
//! Both decorators implement the same [`ByteStream`] contract as the streams
//! they wrap, so they can be nested. [`Compat`] exposes any [`ByteStream`]
//! through [`Read`](std::io::Read), [`Write`](std::io::Write) and
//! [`Seek`](std::io::Seek).
//!
//! Every byte pulled from the source is kept in an internal temporary buffer
//! which lives in memory up to [`DEFAULT_SPOOL_LIMIT`] bytes and moves into a
//! temporary file beyond that.
//!
//! # Seeking backward never touches the source again
//! ```rust
//! use buf_stream::{BufferedStream, ByteStream, ForwardStream, Whence};
//! # let mut arr: [u8; 256] = [0; 256];
//! # for (elem, val) in arr.iter_mut().zip(0..=255) { *elem = val; }
//! let source = ForwardStream::new(&arr[..]); // yields values from \x00 .. \xff, once
//! let mut stream = BufferedStream::new(source);
//!
//! /* straightly reading 7 bytes works */
//! assert_eq!(stream.read(7).unwrap(), &arr[0..7]);
//!
//! /* seeking backwards is served from the buffer */
//! stream.seek(-4, Whence::Current).unwrap();
//! assert_eq!(stream.read(7).unwrap(), &arr[3..10]);
//!
//! /* even back to the very beginning */
//! stream.seek(0, Whence::Start).unwrap();
//! assert_eq!(stream.read(2).unwrap(), &arr[0..2]);
//! ```
//!
//! # Seeking forward pulls (and keeps) the bytes in between
//! ```rust
//! # use buf_stream::{BufferedStream, ByteStream, ForwardStream, Whence};
//! # let mut arr: [u8; 256] = [0; 256];
//! # for (elem, val) in arr.iter_mut().zip(0..=255) { *elem = val; }
//! let source = ForwardStream::new(&arr[..]);
//! let mut stream = BufferedStream::new(source);
//!
//! stream.seek(139, Whence::Start).unwrap();
//! assert_eq!(stream.read(7).unwrap(), &arr[139..146]);
//! assert_eq!(stream.written(), 146);
//!
//! stream.seek(10, Whence::Start).unwrap();
//! assert_eq!(stream.read(7).unwrap(), &arr[10..17]);
//! ```
//!
//! # Writing on top of a source which has not been read yet
//! ```rust
//! use buf_stream::{ByteStream, CachingStream, ForwardStream};
//!
//! let source = ForwardStream::new(&b"hello world"[..]);
//! let mut stream = CachingStream::new(source);
//!
//! stream.write(b"HELLO").unwrap();
//! assert_eq!(stream.read(6).unwrap(), b" world");
//!
//! stream.rewind().unwrap();
//! assert_eq!(stream.get_contents().unwrap(), b"HELLO world");
//! ```
//!
//! # Using the decorators through `std::io`
//! ```rust
//! use std::io::{Read, Seek, SeekFrom};
//! use buf_stream::{BufferedStream, Compat, ForwardStream};
//!
//! // the size must be declared for seeking relative to the end
//! let source = ForwardStream::with_size(&b"abcdefghijklmnopqrstuvwxyz"[..], 26);
//! let mut reader = Compat::new(BufferedStream::new(source));
//!
//! let mut buffer = [0; 3];
//! reader.seek(SeekFrom::End(-3)).unwrap();
//! reader.read_exact(&mut buffer).unwrap();
//! assert_eq!(&buffer, b"xyz");
//!
//! reader.seek(SeekFrom::Start(0)).unwrap();
//! reader.read_exact(&mut buffer).unwrap();
//! assert_eq!(&buffer, b"abc");
//! ```
mod buffered;
mod caching;
mod compat;
mod decorator;
mod error;
mod file;
mod forward;
mod handle;
mod stream;

pub use crate::buffered::BufferedStream;
pub use crate::caching::CachingStream;
pub use crate::compat::Compat;
pub use crate::decorator::StreamDecorator;
pub use crate::error::{Result, StreamError};
pub use crate::file::FileStream;
pub use crate::forward::ForwardStream;
pub use crate::handle::{Mode, Stream, TempStream, DEFAULT_SPOOL_LIMIT};
pub use crate::stream::{copy, ByteStream, Detach, Whence, DEFAULT_CHUNK_SIZE};
