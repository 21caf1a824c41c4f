use super::super::{
    error::CollectorError,
    report::{CSV_HEADER, finalize_hashes, write_sample_rows},
    samples::Sample,
};
use crate::streams::{
    ByteStream, copy_stream,
    temporary::{MEMORY_THRESHOLD, TemporaryStream},
};
use crate::structs::toml::Output;
use crate::utils::logging::LogBuffer;
use crate::utils::uuid::generate_uuid;
use common::files::Hashes;
use csv::{Writer, WriterBuilder};
use log::{error, info, warn};
use std::{
    env::current_dir,
    fs::File,
    io::Write,
    path::PathBuf,
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};
use zip::unstable::write::FileOptionsExt;

/// Sink that appends every in-limits sample to a zip archive. The metadata
/// report is staged to a temporary stream and lands in the archive as
/// `GetThis.csv`, followed by the captured run log as `GetThis.log`
pub struct ArchiveSink {
    zip: ZipWriter<File>,
    csv: Writer<TemporaryStream>,
    log_capture: Option<LogBuffer>,
    computer_name: String,
    report_all: bool,
    hashes: Hashes,
    password: Option<String>,
    compression: Option<i64>,
}

impl ArchiveSink {
    pub(crate) fn init(
        output: &Output,
        computer_name: &str,
        report_all: bool,
        hashes: &Hashes,
        log_capture: Option<LogBuffer>,
    ) -> Result<Self, CollectorError> {
        let archive_path = PathBuf::from(&output.path);
        let mut staging_dir = match archive_path.parent() {
            Some(parent) if parent != PathBuf::new() => parent.to_path_buf(),
            _ => PathBuf::new(),
        };
        if staging_dir.as_os_str().is_empty() {
            let cwd_result = current_dir();
            staging_dir = match cwd_result {
                Ok(result) => result,
                Err(err) => {
                    warn!("[collector] Failed to resolve working directory: {err:?}");
                    PathBuf::from(".")
                }
            };
        }

        let file_result = File::create(&archive_path);
        let file = match file_result {
            Ok(result) => result,
            Err(err) => {
                error!(
                    "[collector] Failed to initialize archive {}: {err:?}",
                    output.path
                );
                return Err(CollectorError::OutputInit);
            }
        };

        let staging_name = format!("{}.csv.tmp", generate_uuid());
        let staging = TemporaryStream::open(&staging_dir, &staging_name, MEMORY_THRESHOLD);
        let mut csv = WriterBuilder::new().from_writer(staging);
        let header_result = csv.write_record(CSV_HEADER);
        if let Err(err) = header_result {
            error!("[collector] Failed to write metadata schema: {err:?}");
            return Err(CollectorError::OutputInit);
        }

        Ok(ArchiveSink {
            zip: ZipWriter::new(file),
            csv,
            log_capture,
            computer_name: computer_name.to_string(),
            report_all,
            hashes: *hashes,
            password: output.password.clone(),
            compression: output.compression,
        })
    }

    fn entry_options(&self) -> SimpleFileOptions {
        let mut options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(self.compression);
        if let Some(password) = &self.password {
            options = options.with_deprecated_encryption(password.as_bytes());
        }
        options
    }

    /// Append the sample to the archive, then finalize hashes and emit the
    /// metadata rows. Off-limits samples skip the archive entry but are still
    /// hashed (when report-all is set) and reported
    pub(crate) fn write_sample(&mut self, sample: &mut Sample) -> Result<(), CollectorError> {
        if !sample.off_limits {
            let entry_name = sample.sample_name.replace('\\', "/");
            let display_name = match sample.matches.first() {
                Some(file_match) => match file_match.matching_names.first() {
                    Some(name) => name.full_path.clone(),
                    None => sample.sample_name.clone(),
                },
                None => sample.sample_name.clone(),
            };

            let stream = match sample.copy_stream.as_mut() {
                Some(result) => result,
                None => {
                    error!(
                        "[collector] Sample {} has no stream to archive",
                        sample.sample_name
                    );
                    return Err(CollectorError::MissingStream);
                }
            };

            let start_result = self.zip.start_file(entry_name.as_str(), self.entry_options());
            if let Err(err) = start_result {
                error!("[collector] Failed to add sample {entry_name}: {err:?}");
                return Err(CollectorError::ArchiveWrite);
            }

            let copy_result = copy_stream(stream.as_mut(), &mut self.zip);
            if let Err(err) = copy_result {
                error!("[collector] Failed to add sample {entry_name}: {err:?}");
                return Err(CollectorError::ArchiveWrite);
            }

            info!("[collector] {display_name} archived as {entry_name}");
        }

        // The encoder consumed the stream, hashes are complete now
        finalize_hashes(sample, self.report_all, &self.hashes);

        let row_result = write_sample_rows(&mut self.csv, sample, &self.computer_name);
        if let Err(err) = row_result {
            error!(
                "[collector] Failed to add sample {} metadata to csv: {err:?}",
                sample.sample_name
            );
        }

        Ok(())
    }

    /// Append `GetThis.csv` then `GetThis.log` and complete the archive
    pub(crate) fn finalize(mut self) -> Result<(), CollectorError> {
        let flush_result = self.csv.flush();
        if let Err(err) = flush_result {
            error!("[collector] Failed to flush metadata writer: {err:?}");
        }

        let staging_result = self.csv.into_inner();
        let mut staging = match staging_result {
            Ok(result) => result,
            Err(err) => {
                error!("[collector] Failed to recover metadata stream: {err:?}");
                return Err(CollectorError::CsvFlush);
            }
        };

        if staging.size() > 0 {
            let rewind_result = staging.rewind();
            if let Err(err) = rewind_result {
                error!("[collector] Failed to rewind metadata stream: {err:?}");
            }

            let csv_options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            let start_result = self.zip.start_file("GetThis.csv", csv_options);
            match start_result {
                Ok(_) => {
                    let copy_result = copy_stream(&mut staging, &mut self.zip);
                    if let Err(err) = copy_result {
                        error!("[collector] Failed to add GetThis.csv: {err:?}");
                    }
                }
                Err(err) => error!("[collector] Failed to add GetThis.csv: {err:?}"),
            }
        }
        let _ = staging.close();

        if let Some(capture) = &self.log_capture {
            let log_bytes = capture.drain();
            if !log_bytes.is_empty() {
                let log_options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                let start_result = self.zip.start_file("GetThis.log", log_options);
                match start_result {
                    Ok(_) => {
                        let write_result = self.zip.write_all(&log_bytes);
                        if let Err(err) = write_result {
                            error!("[collector] Failed to add GetThis.log: {err:?}");
                        }
                    }
                    Err(err) => error!("[collector] Failed to add GetThis.log: {err:?}"),
                }
            }
        }

        let finish_result = self.zip.finish();
        if let Err(err) = finish_result {
            error!("[collector] Failed to complete archive: {err:?}");
            return Err(CollectorError::ArchiveWrite);
        }

        Ok(())
    }
}
