use crate::error::Result;
use crate::stream::{ByteStream, Detach};

/// Expands to [`ByteStream`] methods which hand the call over to a field.
///
/// ```ignore
/// impl ByteStream for Wrapper {
///     forward_stream!(inner => is_readable, is_writable, tell, eof);
///     // remaining methods written by hand
/// }
/// ```
macro_rules! forward_stream {
    ($field:ident => $($method:ident),+ $(,)?) => {
        $( $crate::decorator::forward_stream!(@method $field $method); )+
    };
    (@method $field:ident is_readable) => {
        fn is_readable(&self) -> bool {
            $crate::stream::ByteStream::is_readable(&self.$field)
        }
    };
    (@method $field:ident is_writable) => {
        fn is_writable(&self) -> bool {
            $crate::stream::ByteStream::is_writable(&self.$field)
        }
    };
    (@method $field:ident is_seekable) => {
        fn is_seekable(&self) -> bool {
            $crate::stream::ByteStream::is_seekable(&self.$field)
        }
    };
    (@method $field:ident read) => {
        fn read(&mut self, length: usize) -> $crate::error::Result<Vec<u8>> {
            $crate::stream::ByteStream::read(&mut self.$field, length)
        }
    };
    (@method $field:ident write) => {
        fn write(&mut self, data: &[u8]) -> $crate::error::Result<usize> {
            $crate::stream::ByteStream::write(&mut self.$field, data)
        }
    };
    (@method $field:ident seek) => {
        fn seek(&mut self, offset: i64, whence: $crate::stream::Whence) -> $crate::error::Result<()> {
            $crate::stream::ByteStream::seek(&mut self.$field, offset, whence)
        }
    };
    (@method $field:ident tell) => {
        fn tell(&mut self) -> $crate::error::Result<u64> {
            $crate::stream::ByteStream::tell(&mut self.$field)
        }
    };
    (@method $field:ident eof) => {
        fn eof(&mut self) -> $crate::error::Result<bool> {
            $crate::stream::ByteStream::eof(&mut self.$field)
        }
    };
    (@method $field:ident size) => {
        fn size(&mut self) -> $crate::error::Result<Option<u64>> {
            $crate::stream::ByteStream::size(&mut self.$field)
        }
    };
    (@method $field:ident close) => {
        fn close(&mut self) -> $crate::error::Result<()> {
            $crate::stream::ByteStream::close(&mut self.$field)
        }
    };
    (@method $field:ident rewind) => {
        fn rewind(&mut self) -> $crate::error::Result<()> {
            $crate::stream::ByteStream::rewind(&mut self.$field)
        }
    };
    (@method $field:ident get_contents) => {
        fn get_contents(&mut self) -> $crate::error::Result<Vec<u8>> {
            $crate::stream::ByteStream::get_contents(&mut self.$field)
        }
    };
}

pub(crate) use forward_stream;

/// Pass-through decorator: every operation goes straight to the wrapped
/// stream. Useful as a starting point for decorators that only need to
/// change a few operations.
#[derive(Debug)]
pub struct StreamDecorator<S> {
    stream: S,
}

impl<S> StreamDecorator<S>
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

impl<S> ByteStream for StreamDecorator<S>
where
    S: ByteStream,
{
    forward_stream!(stream =>
        is_readable, is_writable, is_seekable,
        read, write, seek, tell, eof, size, close,
        rewind, get_contents,
    );
}

impl<S> Detach for StreamDecorator<S>
where
    S: ByteStream + Detach,
{
    type Handle = S::Handle;

    fn detach(&mut self) -> Result<Option<S::Handle>> {
        self.stream.detach()
    }
}
