use super::ByteStream;
use log::error;
use std::{
    fs::File,
    io::{Error, ErrorKind, Read},
};

/// Stream over a file on the local filesystem
pub struct FileStream {
    file: Option<File>,
    size: u64,
}

impl FileStream {
    /// Open a file for streaming
    pub fn open(path: &str) -> Result<Self, Error> {
        let file_result = File::open(path);
        let file = match file_result {
            Ok(result) => result,
            Err(err) => {
                error!("[streams] Failed to open file {path}: {err:?}");
                return Err(err);
            }
        };

        let size = file.metadata()?.len();
        Ok(FileStream {
            file: Some(file),
            size,
        })
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Err(Error::new(ErrorKind::NotConnected, "stream closed")),
        }
    }
}

impl ByteStream for FileStream {
    fn size(&self) -> u64 {
        self.size
    }

    fn close(&mut self) -> Result<(), Error> {
        self.file = None;
        Ok(())
    }
}
