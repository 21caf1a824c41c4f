use super::ByteStream;
use std::io::{Error, Read, Write};

/// Stream that produces nothing and discards everything written to it.
/// Used to drain hash observers for samples whose bytes are not collected
#[derive(Default)]
pub struct DevNullStream {
    discarded: u64,
}

impl DevNullStream {
    pub fn new() -> Self {
        DevNullStream::default()
    }
}

impl Read for DevNullStream {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Error> {
        Ok(0)
    }
}

impl Write for DevNullStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        self.discarded += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl ByteStream for DevNullStream {
    fn size(&self) -> u64 {
        0
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
