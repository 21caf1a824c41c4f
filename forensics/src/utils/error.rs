use std::fmt;

#[derive(Debug)]
pub(crate) enum UtilsError {
    CreateDirectory,
    LogFile,
    Encoding,
    Regex,
    YaraRule,
    YaraScan,
}

impl std::error::Error for UtilsError {}

impl fmt::Display for UtilsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilsError::CreateDirectory => write!(f, "Failed to create directory"),
            UtilsError::LogFile => write!(f, "Failed to create log file"),
            UtilsError::Encoding => write!(f, "Failed to decode base64 data"),
            UtilsError::Regex => write!(f, "Failed to compile regex"),
            UtilsError::YaraRule => write!(f, "Failed to compile yara rule"),
            UtilsError::YaraScan => write!(f, "Failed to run yara scan"),
        }
    }
}
