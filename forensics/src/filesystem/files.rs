use super::error::FileSystemError;
use log::error;
use std::fs::{File, read};

/// Read a whole file into memory. Files larger than 2GB are rejected
pub(crate) fn read_file(path: &str) -> Result<Vec<u8>, FileSystemError> {
    // 2GB limit
    let max_size = 2147483648;
    read_file_custom(path, max_size)
}

/// Read a whole file into memory with a caller provided size limit
pub(crate) fn read_file_custom(path: &str, max_size: u64) -> Result<Vec<u8>, FileSystemError> {
    let reader = file_reader(path)?;
    let meta_result = reader.metadata();
    let meta = match meta_result {
        Ok(result) => result,
        Err(err) => {
            error!("[filesystem] Failed to get metadata for {path}: {err:?}");
            return Err(FileSystemError::ReadFile);
        }
    };

    if !meta.is_file() {
        return Err(FileSystemError::NotFile);
    }
    if meta.len() > max_size {
        error!(
            "[filesystem] File {path} larger than max size. Size: {}",
            meta.len()
        );
        return Err(FileSystemError::LargeFile);
    }

    let read_result = read(path);
    match read_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[filesystem] Failed to read file {path}: {err:?}");
            Err(FileSystemError::ReadFile)
        }
    }
}

/// Open a file handle for reading
pub(crate) fn file_reader(path: &str) -> Result<File, FileSystemError> {
    let reader_result = File::open(path);
    match reader_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[filesystem] Failed to open file {path}: {err:?}");
            Err(FileSystemError::OpenFile)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{file_reader, read_file, read_file_custom};

    #[test]
    fn test_read_file() {
        let path = format!("{}/Cargo.toml", env!("CARGO_MANIFEST_DIR"));
        let data = read_file(&path).unwrap();
        assert_eq!(data.is_empty(), false);
    }

    #[test]
    #[should_panic(expected = "LargeFile")]
    fn test_read_file_custom_too_large() {
        let path = format!("{}/Cargo.toml", env!("CARGO_MANIFEST_DIR"));
        let _ = read_file_custom(&path, 2).unwrap();
    }

    #[test]
    fn test_file_reader() {
        let path = format!("{}/Cargo.toml", env!("CARGO_MANIFEST_DIR"));
        let reader = file_reader(&path).unwrap();
        assert!(reader.metadata().unwrap().len() > 10);
    }
}
