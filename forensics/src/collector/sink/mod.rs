use super::{error::CollectorError, samples::Sample};
use crate::structs::toml::Output;
use crate::utils::logging::LogBuffer;
use common::files::Hashes;
use log::error;
use self::archive::ArchiveSink;
use self::directory::DirectorySink;

pub mod archive;
pub mod directory;

/// Uniform write + finalize contract over the two output kinds
pub enum OutputSink {
    Archive(ArchiveSink),
    Directory(DirectorySink),
}

impl OutputSink {
    pub fn init(
        output: &Output,
        computer_name: &str,
        report_all: bool,
        hashes: &Hashes,
        log_capture: Option<LogBuffer>,
    ) -> Result<Self, CollectorError> {
        match output.format.to_lowercase().as_str() {
            "archive" => {
                let sink = ArchiveSink::init(output, computer_name, report_all, hashes, log_capture)?;
                Ok(OutputSink::Archive(sink))
            }
            "directory" => {
                let sink = DirectorySink::init(output, computer_name, report_all, hashes)?;
                Ok(OutputSink::Directory(sink))
            }
            other => {
                error!("[collector] Unsupported output format: {other}");
                Err(CollectorError::UnsupportedOutput)
            }
        }
    }

    pub fn write_sample(&mut self, sample: &mut Sample) -> Result<(), CollectorError> {
        match self {
            OutputSink::Archive(sink) => sink.write_sample(sample),
            OutputSink::Directory(sink) => sink.write_sample(sample),
        }
    }

    pub fn finalize(self) -> Result<(), CollectorError> {
        match self {
            OutputSink::Archive(sink) => sink.finalize(),
            OutputSink::Directory(sink) => sink.finalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OutputSink;
    use crate::structs::toml::Output;
    use common::files::Hashes;

    #[test]
    #[should_panic(expected = "UnsupportedOutput")]
    fn test_unsupported_output() {
        let output = Output {
            name: String::from("bad"),
            path: String::from("./tmp/bad"),
            format: String::from("tape"),
            password: None,
            compression: None,
            logging: None,
        };

        let _ = OutputSink::init(&output, "HOST", false, &Hashes::default(), None).unwrap();
    }
}
