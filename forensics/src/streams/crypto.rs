use super::ByteStream;
use common::files::Hashes;
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;
use std::{
    cell::RefCell,
    io::{Error, Read},
    rc::Rc,
};

/// Digest contexts shared between a `CryptoHashStream` and the sample that
/// owns the results
pub struct CryptoHasher {
    md5: Option<Md5>,
    sha1: Option<Sha1>,
    sha256: Option<Sha256>,
}

/// Finalized hash values as lowercase hex. Unselected algorithms are empty
#[derive(Debug, Default, Clone)]
pub struct HashValues {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

impl CryptoHasher {
    pub fn new(hashes: &Hashes) -> Self {
        CryptoHasher {
            md5: hashes.md5.then(Md5::new),
            sha1: hashes.sha1.then(Sha1::new),
            sha256: hashes.sha256.then(Sha256::new),
        }
    }

    /// Feed observed bytes into every selected digest
    pub(crate) fn update(&mut self, data: &[u8]) {
        if let Some(md5) = self.md5.as_mut() {
            md5.update(data);
        }
        if let Some(sha1) = self.sha1.as_mut() {
            sha1.update(data);
        }
        if let Some(sha256) = self.sha256.as_mut() {
            sha256.update(data);
        }
    }

    /// Consume the digest contexts and return hex values
    pub fn finalize(&mut self) -> HashValues {
        let mut values = HashValues::default();
        if let Some(md5) = self.md5.take() {
            let hash = md5.finalize();
            values.md5 = format!("{hash:x}");
        }
        if let Some(sha1) = self.sha1.take() {
            let hash = sha1.finalize();
            values.sha1 = format!("{hash:x}");
        }
        if let Some(sha256) = self.sha256.take() {
            let hash = sha256.finalize();
            values.sha256 = format!("{hash:x}");
        }
        values
    }
}

/// Hash observer stream. Reads pass through unchanged while every selected
/// digest sees the same bytes
pub struct CryptoHashStream {
    inner: Box<dyn ByteStream>,
    hasher: Rc<RefCell<CryptoHasher>>,
}

impl CryptoHashStream {
    pub fn open(inner: Box<dyn ByteStream>, hasher: Rc<RefCell<CryptoHasher>>) -> Self {
        CryptoHashStream { inner, hasher }
    }
}

impl Read for CryptoHashStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let bytes = self.inner.read(buf)?;
        let finished = 0;
        if bytes != finished {
            self.hasher.borrow_mut().update(&buf[0..bytes]);
        }
        Ok(bytes)
    }
}

impl ByteStream for CryptoHashStream {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn close(&mut self) -> Result<(), Error> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::{CryptoHashStream, CryptoHasher};
    use crate::streams::{ByteStream, memory::MemoryStream};
    use common::files::Hashes;
    use std::{cell::RefCell, io::Read, rc::Rc};

    #[test]
    fn test_hash_observer_passthrough() {
        let inner = Box::new(MemoryStream::new(b"abc".to_vec()));
        let hasher = Rc::new(RefCell::new(CryptoHasher::new(&Hashes::default())));
        let mut stream = CryptoHashStream::open(inner, Rc::clone(&hasher));
        assert_eq!(stream.size(), 3);

        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"abc");

        let values = hasher.borrow_mut().finalize();
        assert_eq!(values.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(values.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            values.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_unselected_algorithms_empty() {
        let hashes = Hashes {
            md5: true,
            sha1: false,
            sha256: false,
        };
        let mut hasher = CryptoHasher::new(&hashes);
        hasher.update(b"");

        let values = hasher.finalize();
        assert_eq!(values.md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(values.sha1.is_empty(), true);
        assert_eq!(values.sha256.is_empty(), true);
    }
}
