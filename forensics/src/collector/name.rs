use super::{ContentSpec, error::CollectorError, matches::MatchingName};

/// Build a deterministic sample name from a `$FILE_NAME` record.
///
/// The name starts with the parent directory reference rendered as three
/// fixed-width hex fields (sequence, segment-high, segment-low), followed by
/// the file name, the attribute name when the stream is named, a collision
/// index when `idx` is non-zero and the content tag. Whitespace, `:` and `#`
/// are remapped to `_` so the result is safe as an archive entry or filename
pub(crate) fn create_sample_name(
    content: &ContentSpec,
    file_name: Option<&MatchingName>,
    data_name: &str,
    idx: u32,
) -> Result<String, CollectorError> {
    let name_record = match file_name {
        Some(result) => result,
        None => return Err(CollectorError::MissingFileNameRecord),
    };

    let parent = format!(
        "{:04X}{:04X}{:08X}",
        name_record.parent_sequence, name_record.parent_segment_high, name_record.parent_segment_low
    );
    let file: String = name_record
        .name
        .chars()
        .take(name_record.name_length as usize)
        .collect();
    let tag = content.name_tag();

    let sample_name = if idx != 0 {
        if !data_name.is_empty() {
            format!("{parent}_{file}_{data_name}_{idx}_{tag}")
        } else {
            format!("{parent}__{file}_{idx}_{tag}")
        }
    } else if !data_name.is_empty() {
        format!("{parent}__{file}_{data_name}_{tag}")
    } else {
        format!("{parent}_{file}_{tag}")
    };

    Ok(sanitize_sample_name(&sample_name))
}

/// Remap characters that collide with path or archive syntax
pub(crate) fn sanitize_sample_name(name: &str) -> String {
    name.chars()
        .map(|value| {
            if value.is_whitespace() || value == ':' || value == '#' {
                '_'
            } else {
                value
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{create_sample_name, sanitize_sample_name};
    use crate::collector::{ContentSpec, matches::MatchingName};

    fn name_record(name: &str) -> MatchingName {
        MatchingName {
            full_path: format!("C:\\{name}"),
            name: name.to_string(),
            name_length: name.chars().count() as u16,
            parent_sequence: 0x4,
            parent_segment_high: 0x0,
            parent_segment_low: 0x5f2e,
            times: Default::default(),
        }
    }

    #[test]
    fn test_create_sample_name_plain() {
        let record = name_record("ntuser.dat");
        let result = create_sample_name(&ContentSpec::data(), Some(&record), "", 0).unwrap();
        assert_eq!(result, "0004000000005F2E_ntuser.dat_data");
    }

    #[test]
    fn test_create_sample_name_with_data_name() {
        let record = name_record("places.sqlite");
        let result = create_sample_name(&ContentSpec::data(), Some(&record), "Zone.Identifier", 0)
            .unwrap();
        assert_eq!(
            result,
            "0004000000005F2E__places.sqlite_Zone.Identifier_data"
        );
    }

    #[test]
    fn test_create_sample_name_with_index() {
        let record = name_record("ntuser.dat");
        let result = create_sample_name(&ContentSpec::data(), Some(&record), "", 2).unwrap();
        assert_eq!(result, "0004000000005F2E__ntuser.dat_2_data");
    }

    #[test]
    fn test_create_sample_name_with_data_name_and_index() {
        let record = name_record("ntuser.dat");
        let result = create_sample_name(&ContentSpec::data(), Some(&record), "Stream", 3).unwrap();
        assert_eq!(result, "0004000000005F2E_ntuser.dat_Stream_3_data");
    }

    #[test]
    fn test_create_sample_name_truncates_to_name_length() {
        let mut record = name_record("verylongname.bin");
        record.name_length = 4;
        let result = create_sample_name(&ContentSpec::data(), Some(&record), "", 0).unwrap();
        assert_eq!(result, "0004000000005F2E_very_data");
    }

    #[test]
    #[should_panic(expected = "MissingFileNameRecord")]
    fn test_create_sample_name_no_record() {
        let _ = create_sample_name(&ContentSpec::data(), None, "", 0).unwrap();
    }

    #[test]
    fn test_sanitize_sample_name() {
        let result = sanitize_sample_name("ads stream:name #4");
        assert_eq!(result, "ads_stream_name__4");
    }

    #[test]
    fn test_sanitize_sample_name_idempotent() {
        let once = sanitize_sample_name("a b:c#d");
        let twice = sanitize_sample_name(&once);
        assert_eq!(once, twice);
    }
}
