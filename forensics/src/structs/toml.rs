use crate::error::TomlError;
use crate::utils::strings::extract_utf8_string;
use log::error;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GetThisToml {
    pub output: Output,
    /// Fallback strings-extraction bounds for sample specs that set none
    pub content: Option<ContentOptions>,
    pub hashes: Option<HashOptions>,
    /// Global limits shared by every sample spec
    pub limits: Option<LimitsOptions>,
    /// Flush registry hives before collection starts
    pub flush_registry: Option<bool>,
    /// Hash off-limits samples even though their bytes are not collected
    pub report_all: Option<bool>,
    /// Paths to yara rule files compiled into the finder
    pub yara: Option<Vec<String>>,
    pub locations: Vec<LocationOptions>,
    pub samples: Vec<SampleOptions>,
}

impl GetThisToml {
    /// Parse raw bytes of a TOML collection file
    pub fn parse_getthis_toml(data: &[u8]) -> Result<GetThisToml, TomlError> {
        let toml_results = toml::from_str(&extract_utf8_string(data));
        match toml_results {
            Ok(results) => Ok(results),
            Err(err) => {
                error!("[forensics] Failed to parse TOML collection: {err:?}");
                Err(TomlError::BadToml)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Output {
    pub name: String,
    /// Archive file path or output directory depending on `format`
    pub path: String,
    /// `archive` or `directory`
    pub format: String,
    pub password: Option<String>,
    /// Deflate level for archive output
    pub compression: Option<i64>,
    pub logging: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContentOptions {
    #[serde(default = "default_min_chars")]
    pub min_chars: u32,
    #[serde(default = "default_max_chars")]
    pub max_chars: u32,
}

impl Default for ContentOptions {
    fn default() -> Self {
        ContentOptions {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_min_chars() -> u32 {
    5
}

fn default_max_chars() -> u32 {
    1024
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HashOptions {
    #[serde(default = "default_true")]
    pub md5: bool,
    #[serde(default = "default_true")]
    pub sha1: bool,
    #[serde(default = "default_true")]
    pub sha256: bool,
    #[serde(default)]
    pub ssdeep: bool,
    #[serde(default)]
    pub tlsh: bool,
}

impl Default for HashOptions {
    fn default() -> Self {
        HashOptions {
            md5: true,
            sha1: true,
            sha256: true,
            ssdeep: false,
            tlsh: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LimitsOptions {
    /// `None` means unlimited
    pub max_sample_count: Option<u64>,
    pub max_bytes_per_sample: Option<u64>,
    pub max_bytes_total: Option<u64>,
    #[serde(default)]
    pub ignore_limits: bool,
}

#[derive(Debug, Deserialize)]
pub struct SampleOptions {
    /// Optional spec name, prefixed to every sample name it collects
    pub name: Option<String>,
    /// `data`, `strings` or `raw`
    pub content: Option<String>,
    pub min_chars: Option<u32>,
    pub max_chars: Option<u32>,
    pub limits: Option<LimitsOptions>,
    pub terms: Vec<TermOptions>,
}

#[derive(Debug, Deserialize)]
pub struct TermOptions {
    /// Rule description reported for every match of this term
    pub description: String,
    pub path_regex: Option<String>,
    pub file_regex: Option<String>,
    /// Yara rule identifiers that must also match the file content
    pub yara: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LocationOptions {
    /// Drive letter (live volume) or path to an NTFS image
    pub path: String,
    /// Shadow copy GUID when the location is a mounted snapshot
    pub snapshot_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::GetThisToml;

    #[test]
    fn test_parse_getthis_toml() {
        let config = r#"
[output]
name = "evidence"
path = "./tmp/evidence.zip"
format = "archive"
compression = 5

[content]
min_chars = 4

[hashes]
ssdeep = true

[limits]
max_sample_count = 100
max_bytes_per_sample = 10485760

[[locations]]
path = "C"

[[samples]]
name = "hives"
content = "data"

[[samples.terms]]
description = "user registry hives"
file_regex = "(?i)(NTUSER|UsrClass)\\.DAT$"
"#;

        let result = GetThisToml::parse_getthis_toml(config.as_bytes()).unwrap();
        assert_eq!(result.output.format, "archive");
        assert_eq!(result.output.compression, Some(5));
        assert_eq!(result.content.unwrap().min_chars, 4);
        assert_eq!(result.content.unwrap().max_chars, 1024);
        assert_eq!(result.hashes.unwrap().ssdeep, true);
        assert_eq!(result.hashes.unwrap().md5, true);
        assert_eq!(result.limits.unwrap().max_sample_count, Some(100));
        assert_eq!(result.limits.unwrap().max_bytes_total, None);
        assert_eq!(result.samples.len(), 1);
        assert_eq!(result.samples[0].terms[0].description, "user registry hives");
    }

    #[test]
    #[should_panic(expected = "BadToml")]
    fn test_parse_getthis_toml_bad() {
        let _ = GetThisToml::parse_getthis_toml(b"not toml at all [[[").unwrap();
    }
}
