use self::limits::Limits;

pub mod error;
pub mod ingest;
pub mod limits;
pub mod matches;
pub(crate) mod name;
pub mod report;
pub mod run;
pub mod samples;
pub mod sink;

/// Runtime form of one configured sample spec. `terms` holds the descriptions
/// of the finder rules this spec governs
pub struct SampleSpec {
    pub name: String,
    pub content: ContentSpec,
    pub per_sample_limits: Limits,
    pub terms: Vec<String>,
}

/// Which stream of a matching attribute is collected and how it is transformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Data,
    Strings,
    Raw,
}

#[derive(Debug, Clone, Copy)]
pub struct ContentSpec {
    pub content_type: ContentType,
    /// Strings-extraction bounds. Zero for both means use the global defaults
    pub min_chars: u32,
    pub max_chars: u32,
}

impl ContentSpec {
    pub fn data() -> Self {
        ContentSpec {
            content_type: ContentType::Data,
            min_chars: 0,
            max_chars: 0,
        }
    }

    /// Parse the configured content string. Unknown values collect the data stream
    pub(crate) fn from_options(content: Option<&String>, min_chars: u32, max_chars: u32) -> Self {
        let content_type = match content.map(|value| value.to_lowercase()) {
            Some(value) if value == "strings" => ContentType::Strings,
            Some(value) if value == "raw" => ContentType::Raw,
            _ => ContentType::Data,
        };

        ContentSpec {
            content_type,
            min_chars,
            max_chars,
        }
    }

    /// Tag appended to generated sample names
    pub(crate) fn name_tag(&self) -> &'static str {
        match self.content_type {
            ContentType::Data => "data",
            ContentType::Strings => "strings",
            ContentType::Raw => "raw",
        }
    }

    /// Tag reported in the metadata row. Raw content reports nothing
    pub(crate) fn report_tag(&self) -> &'static str {
        match self.content_type {
            ContentType::Data => "data",
            ContentType::Strings => "strings",
            ContentType::Raw => "",
        }
    }
}
