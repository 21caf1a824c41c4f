use std::io::{Error, Read, Write};

pub mod crypto;
pub mod devnull;
pub mod file;
pub mod fuzzy;
pub mod memory;
pub mod strings;
pub mod temporary;

/// Readable byte stream with a known size. Content transforms and hash
/// observers wrap another `ByteStream` so chains compose
pub trait ByteStream: Read {
    /// Total number of bytes the stream produces from the start
    fn size(&self) -> u64;

    /// Release underlying resources. Reading after close is an error
    fn close(&mut self) -> Result<(), Error>;
}

/// Copy a stream into a writer. Returns bytes written
pub(crate) fn copy_stream(src: &mut dyn ByteStream, dest: &mut dyn Write) -> Result<u64, Error> {
    let chunk_size = 65536;
    let mut written = 0;
    loop {
        let mut chunk = vec![0u8; chunk_size];
        let bytes = src.read(&mut chunk)?;

        let finished = 0;
        if bytes == finished {
            dest.flush()?;
            return Ok(written);
        }

        dest.write_all(&chunk[0..bytes])?;
        written += bytes as u64;
    }
}

/// Read a stream to the end. Returns all produced bytes
pub(crate) fn read_to_end(src: &mut dyn ByteStream) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    copy_stream(src, &mut data)?;
    Ok(data)
}
