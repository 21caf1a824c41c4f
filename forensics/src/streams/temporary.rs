use super::ByteStream;
use log::warn;
use std::{
    fs::{File, OpenOptions, remove_file},
    io::{Error, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

/// Default in-memory threshold before spilling to the backing file
pub(crate) const MEMORY_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Write-then-read staging stream. Content stays in memory until it grows past
/// the threshold, then spills into a backing file that is removed on close
pub struct TemporaryStream {
    memory: Vec<u8>,
    backing: Option<File>,
    backing_path: PathBuf,
    threshold: u64,
    size: u64,
    position: u64,
}

impl TemporaryStream {
    /// Create a staging stream. `name` is the backing filename used if the
    /// content spills past `threshold` bytes
    pub fn open(directory: &Path, name: &str, threshold: u64) -> Self {
        TemporaryStream {
            memory: Vec::new(),
            backing: None,
            backing_path: directory.join(name),
            threshold,
            size: 0,
            position: 0,
        }
    }

    /// Rewind to the start so staged content can be read back
    pub fn rewind(&mut self) -> Result<(), Error> {
        self.position = 0;
        if let Some(file) = self.backing.as_mut() {
            file.seek(SeekFrom::Start(0))?;
        }
        Ok(())
    }

    /// Whether the stream spilled to its backing file
    pub(crate) fn is_spilled(&self) -> bool {
        self.backing.is_some()
    }

    fn spill(&mut self) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.backing_path)?;
        file.write_all(&self.memory)?;
        self.memory = Vec::new();
        self.backing = Some(file);
        Ok(())
    }
}

impl Write for TemporaryStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if self.backing.is_none() && self.size + buf.len() as u64 > self.threshold {
            self.spill()?;
        }

        match self.backing.as_mut() {
            Some(file) => file.write_all(buf)?,
            None => self.memory.extend_from_slice(buf),
        }
        self.size += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Error> {
        if let Some(file) = self.backing.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

impl Read for TemporaryStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        match self.backing.as_mut() {
            Some(file) => {
                let bytes = file.read(buf)?;
                self.position += bytes as u64;
                Ok(bytes)
            }
            None => {
                let remaining = &self.memory[self.position as usize..];
                let bytes = remaining.len().min(buf.len());
                buf[0..bytes].copy_from_slice(&remaining[0..bytes]);
                self.position += bytes as u64;
                Ok(bytes)
            }
        }
    }
}

impl ByteStream for TemporaryStream {
    fn size(&self) -> u64 {
        self.size
    }

    fn close(&mut self) -> Result<(), Error> {
        self.memory = Vec::new();
        if self.backing.take().is_some() {
            let status = remove_file(&self.backing_path);
            if let Err(err) = status {
                warn!(
                    "[streams] Could not remove staging file {}: {err:?}",
                    self.backing_path.display()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MEMORY_THRESHOLD, TemporaryStream};
    use crate::streams::ByteStream;
    use std::{
        fs::create_dir_all,
        io::{Read, Write},
        path::PathBuf,
    };

    fn staging_dir() -> PathBuf {
        let dir = PathBuf::from("./tmp/staging_test");
        create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_memory_roundtrip() {
        let mut stream = TemporaryStream::open(&staging_dir(), "memory.tmp", MEMORY_THRESHOLD);
        stream.write_all(b"row one\nrow two\n").unwrap();
        assert_eq!(stream.is_spilled(), false);
        assert_eq!(stream.size(), 16);

        stream.rewind().unwrap();
        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"row one\nrow two\n");
    }

    #[test]
    fn test_spill_roundtrip() {
        let threshold = 8;
        let mut stream = TemporaryStream::open(&staging_dir(), "spilled.tmp", threshold);
        stream.write_all(b"0123456789abcdef").unwrap();
        assert_eq!(stream.is_spilled(), true);
        assert_eq!(stream.size(), 16);

        stream.rewind().unwrap();
        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"0123456789abcdef");

        stream.close().unwrap();
        assert_eq!(staging_dir().join("spilled.tmp").exists(), false);
    }
}
