use std::io::{Error, ErrorKind, Read, Seek, SeekFrom};

/// Raw volume handles only allow reads that start and end on sector
/// boundaries. `SectorReader` aligns every read so the NTFS parser can seek
/// freely over a live volume or an image copy
pub(crate) struct SectorReader<R>
where
    R: Read + Seek,
{
    inner: R,
    sector_size: usize,
    /// Logical position requested by the caller
    position: u64,
    /// Position of the underlying handle, always sector aligned
    inner_position: u64,
}

impl<R> SectorReader<R>
where
    R: Read + Seek,
{
    pub(crate) fn new(inner: R, sector_size: usize) -> Result<Self, Error> {
        if !sector_size.is_power_of_two() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "sector size must be a power of two",
            ));
        }

        Ok(SectorReader {
            inner,
            sector_size,
            position: 0,
            inner_position: 0,
        })
    }

    fn align_down(&self, value: u64) -> u64 {
        value / self.sector_size as u64 * self.sector_size as u64
    }

    fn align_up(&self, value: u64) -> u64 {
        self.align_down(value + self.sector_size as u64 - 1)
    }
}

impl<R> Read for SectorReader<R>
where
    R: Read + Seek,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let aligned_start = self.align_down(self.position);
        let offset = (self.position - aligned_start) as usize;
        let aligned_len = self.align_up((offset + buf.len()) as u64) as usize;

        if self.inner_position != aligned_start {
            self.inner.seek(SeekFrom::Start(aligned_start))?;
            self.inner_position = aligned_start;
        }

        let mut aligned = vec![0u8; aligned_len];
        let mut filled = 0;
        while filled < aligned.len() {
            let bytes = self.inner.read(&mut aligned[filled..])?;
            if bytes == 0 {
                break;
            }
            filled += bytes;
        }
        self.inner_position = aligned_start + filled as u64;

        if filled <= offset {
            return Ok(0);
        }
        let available = filled - offset;
        let bytes = available.min(buf.len());
        buf[0..bytes].copy_from_slice(&aligned[offset..offset + bytes]);
        self.position += bytes as u64;

        // Next read starts aligned again
        self.inner.seek(SeekFrom::Start(self.align_down(self.position)))?;
        self.inner_position = self.align_down(self.position);

        Ok(bytes)
    }
}

impl<R> Seek for SectorReader<R>
where
    R: Read + Seek,
{
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Error> {
        let target = match pos {
            SeekFrom::Start(value) => value,
            SeekFrom::Current(value) => {
                let base = self.position as i64 + value;
                if base < 0 {
                    return Err(Error::new(ErrorKind::InvalidInput, "seek before start"));
                }
                base as u64
            }
            SeekFrom::End(_) => {
                return Err(Error::new(
                    ErrorKind::Unsupported,
                    "seek from end not supported on sector reader",
                ));
            }
        };

        self.position = target;
        Ok(self.position)
    }
}
