use super::ByteStream;
use common::files::FuzzyHashes;
use fuzzyhash::FuzzyHash;
use std::{
    cell::RefCell,
    io::{Error, Read},
    rc::Rc,
};
use tlsh2::TlshDefaultBuilder;

/// Fuzzy hash state shared between a `FuzzyHashStream` and the sample that
/// owns the results. Both algorithms need the complete input, so observed
/// bytes are buffered until finalization
pub struct FuzzyHasher {
    ssdeep: bool,
    tlsh: bool,
    data: Vec<u8>,
}

/// Finalized fuzzy hash values. Unselected or uncomputable hashes are empty
#[derive(Debug, Default, Clone)]
pub struct FuzzyHashValues {
    pub ssdeep: String,
    pub tlsh: String,
}

impl FuzzyHasher {
    pub fn new(fuzzy: &FuzzyHashes) -> Self {
        FuzzyHasher {
            ssdeep: fuzzy.ssdeep,
            tlsh: fuzzy.tlsh,
            data: Vec::new(),
        }
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    /// Consume the buffered bytes and compute the selected fuzzy hashes.
    /// TLSH has a minimum input size, short inputs produce an empty value
    pub fn finalize(&mut self) -> FuzzyHashValues {
        let data = std::mem::take(&mut self.data);

        let mut values = FuzzyHashValues::default();
        if self.ssdeep {
            values.ssdeep = FuzzyHash::new(&data).to_string();
        }
        if self.tlsh {
            let mut builder = TlshDefaultBuilder::new();
            builder.update(&data);
            if let Some(tlsh) = builder.build() {
                values.tlsh = String::from_utf8_lossy(&tlsh.hash()).to_string();
            }
        }
        values
    }
}

/// Fuzzy hash observer stream. Reads pass through unchanged
pub struct FuzzyHashStream {
    inner: Box<dyn ByteStream>,
    hasher: Rc<RefCell<FuzzyHasher>>,
}

impl FuzzyHashStream {
    pub fn open(inner: Box<dyn ByteStream>, hasher: Rc<RefCell<FuzzyHasher>>) -> Self {
        FuzzyHashStream { inner, hasher }
    }
}

impl Read for FuzzyHashStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let bytes = self.inner.read(buf)?;
        let finished = 0;
        if bytes != finished {
            self.hasher.borrow_mut().update(&buf[0..bytes]);
        }
        Ok(bytes)
    }
}

impl ByteStream for FuzzyHashStream {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn close(&mut self) -> Result<(), Error> {
        self.inner.close()
    }
}
