use std::fmt;

#[derive(Debug)]
pub enum FileSystemError {
    OpenFile,
    ReadFile,
    NotFile,
    LargeFile,
    NtfsSectorReader,
    NtfsNew,
    RootDirectory,
    IndexDirectory,
    NoFilenameAttr,
    UnsupportedLocation,
    Regex,
    YaraRules,
}

impl std::error::Error for FileSystemError {}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::OpenFile => write!(f, "Failed to open file"),
            FileSystemError::ReadFile => write!(f, "Failed to read file"),
            FileSystemError::NotFile => write!(f, "Not a file"),
            FileSystemError::LargeFile => write!(f, "File larger than supported size"),
            FileSystemError::NtfsSectorReader => write!(f, "Failed to setup sector reader"),
            FileSystemError::NtfsNew => write!(f, "Failed to start NTFS parser"),
            FileSystemError::RootDirectory => write!(f, "Failed to get NTFS root directory"),
            FileSystemError::IndexDirectory => write!(f, "Failed to get NTFS index directory"),
            FileSystemError::NoFilenameAttr => write!(f, "Failed to get FILENAME attribute"),
            FileSystemError::UnsupportedLocation => write!(f, "Location not supported on this platform"),
            FileSystemError::Regex => write!(f, "Failed to compile term regex"),
            FileSystemError::YaraRules => write!(f, "Failed to compile yara rules"),
        }
    }
}
