use buf_stream::{ForwardStream, Stream};
use std::io::Cursor;

pub fn initialize() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn alphabet() -> Vec<u8> {
    (b'a'..=b'z').collect()
}

/// seekable in-memory source with a known size
#[allow(dead_code)]
pub fn memory(data: &[u8]) -> Stream<Cursor<Vec<u8>>> {
    Stream::from_bytes(data.to_vec())
}

/// forward-only source without a known size
#[allow(dead_code)]
pub fn forward(data: &[u8]) -> ForwardStream<Cursor<Vec<u8>>> {
    ForwardStream::new(Cursor::new(data.to_vec()))
}
