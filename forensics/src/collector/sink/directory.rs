use super::super::{
    error::CollectorError,
    report::{CSV_HEADER, finalize_hashes, write_sample_rows},
    samples::Sample,
};
use crate::streams::copy_stream;
use crate::structs::toml::Output;
use common::files::Hashes;
use csv::{Writer, WriterBuilder};
use log::{error, info, warn};
use std::{
    fs::{File, create_dir_all},
    path::PathBuf,
};

/// Sink that copies every in-limits sample into a directory tree, with the
/// metadata report at `<outdir>/GetThis.csv`
pub struct DirectorySink {
    out_dir: PathBuf,
    csv: Writer<File>,
    computer_name: String,
    report_all: bool,
    hashes: Hashes,
}

impl DirectorySink {
    pub(crate) fn init(
        output: &Output,
        computer_name: &str,
        report_all: bool,
        hashes: &Hashes,
    ) -> Result<Self, CollectorError> {
        let out_dir = PathBuf::from(&output.path);
        let dir_result = create_dir_all(&out_dir);
        if let Err(err) = dir_result {
            error!(
                "[collector] Failed to create output directory {}: {err:?}",
                output.path
            );
            return Err(CollectorError::OutputInit);
        }

        let csv_result = File::create(out_dir.join("GetThis.csv"));
        let csv_file = match csv_result {
            Ok(result) => result,
            Err(err) => {
                error!("[collector] Failed to create metadata report: {err:?}");
                return Err(CollectorError::OutputInit);
            }
        };

        let mut csv = WriterBuilder::new().from_writer(csv_file);
        let header_result = csv.write_record(CSV_HEADER);
        if let Err(err) = header_result {
            error!("[collector] Failed to write metadata schema: {err:?}");
            return Err(CollectorError::OutputInit);
        }

        Ok(DirectorySink {
            out_dir,
            csv,
            computer_name: computer_name.to_string(),
            report_all,
            hashes: *hashes,
        })
    }

    /// Stream the sample into `<outdir>/<sample name>`, then finalize hashes
    /// and emit the metadata rows. The source stream is closed after a
    /// successful copy, a close failure is only a warning
    pub(crate) fn write_sample(&mut self, sample: &mut Sample) -> Result<(), CollectorError> {
        if !sample.off_limits {
            let target = self.sample_path(&sample.sample_name);
            if let Some(parent) = target.parent() {
                let dir_result = create_dir_all(parent);
                if let Err(err) = dir_result {
                    error!("[collector] Failed to create sample directory: {err:?}");
                    return Err(CollectorError::SampleWrite);
                }
            }

            let stream = match sample.copy_stream.as_mut() {
                Some(result) => result,
                None => {
                    error!(
                        "[collector] Sample {} has no stream to copy",
                        sample.sample_name
                    );
                    return Err(CollectorError::MissingStream);
                }
            };

            let file_result = File::create(&target);
            let mut out_file = match file_result {
                Ok(result) => result,
                Err(err) => {
                    error!(
                        "[collector] Failed to create sample {}: {err:?}",
                        target.display()
                    );
                    return Err(CollectorError::SampleWrite);
                }
            };

            let copy_result = copy_stream(stream.as_mut(), &mut out_file);
            let written = match copy_result {
                Ok(result) => result,
                Err(err) => {
                    error!(
                        "[collector] Failed while writing sample {}: {err:?}",
                        target.display()
                    );
                    return Err(CollectorError::SampleWrite);
                }
            };

            let close_result = stream.close();
            if let Err(err) = close_result {
                warn!(
                    "[collector] Failed to close input stream for {}: {err:?}",
                    target.display()
                );
            }

            info!(
                "[collector] {} copied ({written} bytes)",
                sample.sample_name
            );
        }

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

    /// Flush and close the metadata report
    pub(crate) fn finalize(mut self) -> Result<(), CollectorError> {
        let flush_result = self.csv.flush();
        if let Err(err) = flush_result {
            error!("[collector] Failed to flush metadata report: {err:?}");
            return Err(CollectorError::CsvFlush);
        }
        Ok(())
    }

    /// Sample names use `\` separators regardless of platform
    fn sample_path(&self, sample_name: &str) -> PathBuf {
        let mut path = self.out_dir.clone();
        for part in sample_name.split('\\') {
            path.push(part);
        }
        path
    }
}
