use std::fmt;

#[derive(Debug)]
pub enum CollectorError {
    MissingFileNameRecord,
    EmptySampleName,
    MissingStream,
    StringsStream,
    UnsupportedOutput,
    OutputInit,
    ArchiveWrite,
    SampleWrite,
    CsvRow,
    CsvFlush,
    Finder,
    Aborted,
}

impl std::error::Error for CollectorError {}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorError::MissingFileNameRecord => {
                write!(f, "No filename record to build a sample name from")
            }
            CollectorError::EmptySampleName => write!(f, "Sample has an empty name"),
            CollectorError::MissingStream => write!(f, "Sample has no usable stream"),
            CollectorError::StringsStream => write!(f, "Failed to initialize strings stream"),
            CollectorError::UnsupportedOutput => write!(f, "Unsupported output format"),
            CollectorError::OutputInit => write!(f, "Failed to initialize output"),
            CollectorError::ArchiveWrite => write!(f, "Failed to add sample to archive"),
            CollectorError::SampleWrite => write!(f, "Failed to write sample"),
            CollectorError::CsvRow => write!(f, "Failed to write metadata row"),
            CollectorError::CsvFlush => write!(f, "Failed to flush metadata writer"),
            CollectorError::Finder => write!(f, "Failed while searching locations"),
            CollectorError::Aborted => write!(f, "Collection aborted by unexpected failure"),
        }
    }
}
