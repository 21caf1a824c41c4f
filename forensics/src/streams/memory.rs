use super::ByteStream;
use std::io::{Cursor, Error, Read};

/// Stream over an in-memory buffer
pub struct MemoryStream {
    data: Cursor<Vec<u8>>,
}

impl MemoryStream {
    pub fn new(data: Vec<u8>) -> Self {
        MemoryStream {
            data: Cursor::new(data),
        }
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.data.read(buf)
    }
}

impl ByteStream for MemoryStream {
    fn size(&self) -> u64 {
        self.data.get_ref().len() as u64
    }

    fn close(&mut self) -> Result<(), Error> {
        self.data.get_mut().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStream;
    use crate::streams::ByteStream;
    use std::io::Read;

    #[test]
    fn test_memory_stream() {
        let mut stream = MemoryStream::new(vec![10, 20, 30]);
        assert_eq!(stream.size(), 3);

        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        assert_eq!(data, vec![10, 20, 30]);
    }

    #[test]
    fn test_close() {
        let mut stream = MemoryStream::new(vec![10, 20, 30]);
        stream.close().unwrap();
        assert_eq!(stream.size(), 0);
    }
}
