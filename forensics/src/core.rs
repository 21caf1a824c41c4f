use crate::collector::run::run_collection;
use crate::error::TomlError;
use crate::filesystem::files::read_file;
use crate::structs::toml::GetThisToml;
use crate::utils::logging::{LogBuffer, create_log_file, log_level};
use log::{error, info};
use simplelog::{Config, WriteLogger};

/// Parse a TOML collection file at provided path and run it
pub fn parse_toml_file(path: &str) -> Result<(), TomlError> {
    let buffer_results = read_file(path);
    let buffer = match buffer_results {
        Ok(results) => results,
        Err(_) => {
            return Err(TomlError::NoFile);
        }
    };

    let collection = GetThisToml::parse_getthis_toml(&buffer)?;
    getthis_collection(&collection)
}

/// Parse an already read TOML collection file and run it
pub fn parse_toml_data(data: &[u8]) -> Result<(), TomlError> {
    let collection = GetThisToml::parse_getthis_toml(data)?;
    getthis_collection(&collection)
}

/// Run a parsed collection. Archive output captures the run log in memory so
/// it can be appended to the archive, directory output logs next to the
/// collected samples
pub fn getthis_collection(collection: &GetThisToml) -> Result<(), TomlError> {
    let mut log_capture = None;
    if collection.output.format.to_lowercase() == "archive" {
        let capture = LogBuffer::new();
        let _ = WriteLogger::init(
            log_level(&collection.output),
            Config::default(),
            capture.clone(),
        );
        log_capture = Some(capture);
    } else if let Ok((log_file, level)) = create_log_file(&collection.output) {
        let _ = WriteLogger::init(level, Config::default(), log_file);
    }

    let result = run_collection(collection, log_capture);
    match result {
        Ok(_) => info!("[forensics] Collection complete"),
        Err(err) => {
            error!("[forensics] Collection failed: {err:?}");
            return Err(TomlError::Collection);
        }
    }
    Ok(())
}
