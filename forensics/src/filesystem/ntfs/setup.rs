use super::sector_reader::SectorReader;
use crate::filesystem::error::FileSystemError;
use log::error;
use ntfs::Ntfs;
use std::{fs::File, io::BufReader};

pub(crate) struct NtfsParser {
    pub(crate) ntfs: Ntfs,
    pub(crate) fs: BufReader<SectorReader<File>>,
}

/// Setup an NTFS parser over a location. A single letter is treated as a live
/// drive (Windows only), anything else as the path to an NTFS image
pub(crate) fn setup_ntfs_parser(location: &str) -> Result<NtfsParser, FileSystemError> {
    let source = if location.len() == 1 && location.chars().all(|value| value.is_ascii_alphabetic())
    {
        if cfg!(target_os = "windows") {
            format!("\\\\.\\{location}:")
        } else {
            error!("[ntfs] Live volume {location} requires Windows");
            return Err(FileSystemError::UnsupportedLocation);
        }
    } else {
        location.to_string()
    };

    let fs_result = File::open(&source);
    let fs = match fs_result {
        Ok(result) => result,
        Err(err) => {
            error!("[ntfs] Failed to open location {source}, error: {err:?}");
            return Err(FileSystemError::OpenFile);
        }
    };

    // Size used for reader setup
    let reader_size = 4096;
    let sector_reader_result = SectorReader::new(fs, reader_size);
    let sector_reader = match sector_reader_result {
        Ok(result) => result,
        Err(err) => {
            error!("[ntfs] Failed to setup sector reader, error: {err:?}");
            return Err(FileSystemError::NtfsSectorReader);
        }
    };

    let mut fs = BufReader::new(sector_reader);

    let ntfs = get_ntfs(&mut fs)?;

    let ntfs_parser = NtfsParser { ntfs, fs };
    Ok(ntfs_parser)
}

/// Create NTFS object
fn get_ntfs(fs: &mut BufReader<SectorReader<File>>) -> Result<Ntfs, FileSystemError> {
    let ntfs_result = Ntfs::new(fs);
    match ntfs_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[ntfs] Failed to start NTFS parser, error: {err:?}");
            Err(FileSystemError::NtfsNew)
        }
    }
}
