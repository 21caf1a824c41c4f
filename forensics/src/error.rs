use std::fmt;

#[derive(Debug)]
pub enum TomlError {
    NoFile,
    BadToml,
    Collection,
}

impl std::error::Error for TomlError {}

impl fmt::Display for TomlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomlError::NoFile => write!(f, "Could not read TOML collection file"),
            TomlError::BadToml => write!(f, "Failed to parse TOML collection data"),
            TomlError::Collection => write!(f, "Collection run failed"),
        }
    }
}
