use super::{ByteStream, memory::MemoryStream, read_to_end};
use log::error;
use std::io::{Error, Read};

/// Content transform that reduces a stream to its printable ASCII strings.
/// Runs shorter than `min_chars` are dropped, runs are capped at `max_chars`,
/// each emitted string is newline terminated
pub struct StringsStream {
    extracted: MemoryStream,
}

impl StringsStream {
    /// Read the upstream to the end and extract its strings
    pub fn open(mut inner: Box<dyn ByteStream>, min_chars: u32, max_chars: u32) -> Result<Self, Error> {
        let data_result = read_to_end(inner.as_mut());
        let data = match data_result {
            Ok(result) => result,
            Err(err) => {
                error!("[streams] Failed to read stream for strings extraction: {err:?}");
                return Err(err);
            }
        };
        let _ = inner.close();

        Ok(StringsStream {
            extracted: MemoryStream::new(extract_strings(&data, min_chars, max_chars)),
        })
    }
}

/// Pull printable ASCII runs out of raw bytes
fn extract_strings(data: &[u8], min_chars: u32, max_chars: u32) -> Vec<u8> {
    let mut output = Vec::new();
    let mut run: Vec<u8> = Vec::new();

    let printable_start = 0x20;
    let printable_end = 0x7e;

    for value in data {
        if (printable_start..=printable_end).contains(value) {
            run.push(*value);
            // Cap the run, the remainder starts a new string
            if run.len() as u32 == max_chars {
                output.append(&mut run);
                output.push(b'\n');
            }
            continue;
        }

        if run.len() as u32 >= min_chars {
            output.append(&mut run);
            output.push(b'\n');
        }
        run.clear();
    }

    if run.len() as u32 >= min_chars {
        output.append(&mut run);
        output.push(b'\n');
    }

    output
}

impl Read for StringsStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.extracted.read(buf)
    }
}

impl ByteStream for StringsStream {
    fn size(&self) -> u64 {
        self.extracted.size()
    }

    fn close(&mut self) -> Result<(), Error> {
        self.extracted.close()
    }
}
