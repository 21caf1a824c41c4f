use super::error::UtilsError;
use crate::structs::toml::Output;
use log::{LevelFilter, error};
use std::{
    fs::{File, create_dir_all},
    io::Write,
    sync::{Arc, Mutex},
};

/// Create log output file and logging level based on TOML `Output` configuration
pub(crate) fn create_log_file(output: &Output) -> Result<(File, LevelFilter), UtilsError> {
    let path = &output.path;
    let result = create_dir_all(path);
    match result {
        Ok(_) => {}
        Err(err) => {
            error!("[logging] Failed to create logging output directory for {path}. Error: {err:?}");
            return Err(UtilsError::CreateDirectory);
        }
    }

    let output_result = File::create(format!("{path}/GetThis.log"));
    let log_file = match output_result {
        Ok(result) => result,
        Err(err) => {
            error!("[logging] Failed to create log file at {path}. Error: {err:?}");
            return Err(UtilsError::LogFile);
        }
    };

    Ok((log_file, log_level(output)))
}

/// Determine log level from the TOML `Output` configuration
pub(crate) fn log_level(output: &Output) -> LevelFilter {
    if let Some(level) = &output.logging {
        match level.to_lowercase().as_str() {
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            _ => LevelFilter::Info,
        }
    } else {
        LevelFilter::Info
    }
}

#[derive(Clone, Default)]
/// In-memory capture of the run log. Archive output appends the captured bytes as `GetThis.log`
pub struct LogBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        LogBuffer::default()
    }

    /// Take all bytes logged so far
    pub(crate) fn drain(&self) -> Vec<u8> {
        match self.buffer.lock() {
            Ok(mut data) => std::mem::take(&mut *data),
            Err(_) => Vec::new(),
        }
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut data) = self.buffer.lock() {
            data.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
