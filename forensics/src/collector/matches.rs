use crate::streams::ByteStream;
use common::windows::AttributeType;
use std::cell::RefCell;

/// Timestamps from `$STANDARD_INFORMATION`, as Windows FILETIME values
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardInfo {
    pub created: u64,
    pub modified: u64,
    pub accessed: u64,
    pub changed: u64,
}

/// Timestamps carried inside a `$FILE_NAME` attribute
#[derive(Debug, Clone, Copy, Default)]
pub struct NameTimes {
    pub created: u64,
    pub modified: u64,
    pub accessed: u64,
    pub changed: u64,
}

/// One `$FILE_NAME` record of a matching file. Hard linked files carry one
/// entry per link
#[derive(Debug, Clone)]
pub struct MatchingName {
    pub full_path: String,
    pub name: String,
    /// Number of characters recorded for the name
    pub name_length: u16,
    pub parent_sequence: u16,
    pub parent_segment_high: u16,
    pub parent_segment_low: u32,
    pub times: NameTimes,
}

impl MatchingName {
    /// Parent directory reference packed the way the MFT stores it
    pub fn parent_reference(&self) -> u64 {
        ((self.parent_sequence as u64) << 48)
            | ((self.parent_segment_high as u64) << 32)
            | self.parent_segment_low as u64
    }
}

/// One matching attribute of a file record. The stream handles are taken by
/// the pipeline when the sample is ingested
pub struct MatchingAttribute {
    pub attr_type: AttributeType,
    pub name: String,
    pub instance_id: u16,
    pub data_size: u64,
    pub data_stream: RefCell<Option<Box<dyn ByteStream>>>,
    pub raw_stream: RefCell<Option<Box<dyn ByteStream>>>,
    /// Yara rule identifiers that matched the attribute content
    pub yara_rules: Option<Vec<String>>,
}

/// A file reported by the finder. Shared between the finder and every sample
/// that references it
pub struct FileMatch {
    pub frn: u64,
    pub volume_serial: u64,
    /// Shadow copy GUID when matched through a snapshot reader
    pub snapshot_id: Option<String>,
    pub standard_info: StandardInfo,
    pub matching_names: Vec<MatchingName>,
    pub matching_attributes: Vec<MatchingAttribute>,
    /// Description of the rule that produced the match
    pub term: String,
}

#[cfg(test)]
mod tests {
    use super::MatchingName;

    #[test]
    fn test_parent_reference() {
        let name = MatchingName {
            full_path: String::from("C:\\Windows\\notepad.exe"),
            name: String::from("notepad.exe"),
            name_length: 11,
            parent_sequence: 0x1,
            parent_segment_high: 0x2,
            parent_segment_low: 0x3039,
            times: Default::default(),
        };

        assert_eq!(name.parent_reference(), 0x0001000200003039);
    }
}
