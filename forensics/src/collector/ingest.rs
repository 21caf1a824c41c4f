use super::{
    ContentType, SampleSpec,
    error::CollectorError,
    limits::LimitStatus,
    matches::{FileMatch, MatchingAttribute},
    name::create_sample_name,
    samples::{Sample, SampleKey, SampleRegistry},
};
use crate::streams::{
    ByteStream,
    crypto::{CryptoHashStream, CryptoHasher},
    fuzzy::{FuzzyHashStream, FuzzyHasher},
    strings::StringsStream,
};
use crate::structs::toml::ContentOptions;
use crate::utils::uuid::NULL_GUID;
use common::files::{FuzzyHashes, Hashes};
use log::{error, info};
use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    Added,
    /// At least one attribute of the match was already registered
    AlreadyPresent,
}

/// Turn one finder match into registry samples, one per matching attribute.
///
/// Each attribute gets a collision-free name derived from the matching file
/// names and its stream pipeline assembled. Attributes whose key is already
/// registered are skipped and reported as `AlreadyPresent`. A failed pipeline
/// is logged but the sample is still registered so it shows up in the report
pub fn add_samples_for_match(
    registry: &mut SampleRegistry,
    status: LimitStatus,
    spec: &SampleSpec,
    file_match: &Rc<FileMatch>,
    collection_date: u64,
    content_defaults: &ContentOptions,
    hashes: &Hashes,
    fuzzy: &FuzzyHashes,
) -> Result<IngestStatus, CollectorError> {
    let mut duplicate = false;

    for (index, attr) in file_match.matching_attributes.iter().enumerate() {
        let key = SampleKey {
            volume_serial: file_match.volume_serial,
            frn: file_match.frn,
            instance_id: attr.instance_id,
        };

        if registry.contains(&key) {
            info!(
                "[collector] Not adding duplicate sample {} to output",
                first_full_path(file_match)
            );
            duplicate = true;
            continue;
        }

        let mut sample = Sample {
            matches: vec![Rc::clone(file_match)],
            attribute_index: index,
            snapshot_id: match &file_match.snapshot_id {
                Some(id) => id.clone(),
                None => NULL_GUID.to_string(),
            },
            content: spec.content,
            sample_name: String::new(),
            collection_date,
            off_limits: status.off_limits(),
            size: 0,
            copy_stream: None,
            hasher: None,
            fuzzy: None,
            md5: String::new(),
            sha1: String::new(),
            sha256: String::new(),
            ssdeep: String::new(),
            tlsh: String::new(),
        };

        // Each matching name regenerates the sample name. The last name wins
        // and earlier reservations stay in the used set
        for name in &file_match.matching_names {
            info!("[collector] Adding sample {} to output", name.full_path);

            let mut idx = 0;
            loop {
                let candidate_result =
                    create_sample_name(&sample.content, Some(name), &attr.name, idx);
                let mut candidate = match candidate_result {
                    Ok(result) => result,
                    Err(err) => {
                        error!(
                            "[collector] Failed to create sample name for {}: {err:?}",
                            name.full_path
                        );
                        break;
                    }
                };
                if !spec.name.is_empty() {
                    candidate = format!("{}\\{candidate}", spec.name);
                }
                idx += 1;

                if !registry.is_name_used(&candidate) {
                    registry.reserve_name(candidate.clone());
                    sample.sample_name = candidate;
                    break;
                }
            }
        }

        let streams_result =
            configure_sample_streams(&mut sample, attr, content_defaults, hashes, fuzzy);
        if let Err(err) = streams_result {
            error!(
                "[collector] Failed to configure sample streams for {}: {err:?}",
                sample.sample_name
            );
        }
        registry.insert(key, sample);
    }

    if duplicate {
        return Ok(IngestStatus::AlreadyPresent);
    }
    Ok(IngestStatus::Added)
}

/// Assemble the sample's stream chain: content transform, then crypto hash
/// observer, then fuzzy hash observer. The final handle becomes the copy
/// stream the sink reads
pub(crate) fn configure_sample_streams(
    sample: &mut Sample,
    attr: &MatchingAttribute,
    content_defaults: &ContentOptions,
    hashes: &Hashes,
    fuzzy: &FuzzyHashes,
) -> Result<(), CollectorError> {
    if sample.sample_name.is_empty() {
        return Err(CollectorError::EmptySampleName);
    }

    let base: Box<dyn ByteStream> = match sample.content.content_type {
        ContentType::Data => take_stream(&attr.data_stream)?,
        ContentType::Raw => take_stream(&attr.raw_stream)?,
        ContentType::Strings => {
            let inner = take_stream(&attr.data_stream)?;
            let (min_chars, max_chars) =
                if sample.content.min_chars == 0 && sample.content.max_chars == 0 {
                    (content_defaults.min_chars, content_defaults.max_chars)
                } else {
                    (sample.content.min_chars, sample.content.max_chars)
                };

            let strings_result = StringsStream::open(inner, min_chars, max_chars);
            let strings = match strings_result {
                Ok(result) => result,
                Err(err) => {
                    error!("[collector] Failed to initialize strings stream: {err:?}");
                    return Err(CollectorError::StringsStream);
                }
            };
            Box::new(strings)
        }
    };

    let mut upstream = base;

    if hashes.any() {
        let hasher = Rc::new(RefCell::new(CryptoHasher::new(hashes)));
        sample.hasher = Some(Rc::clone(&hasher));
        upstream = Box::new(CryptoHashStream::open(upstream, hasher));
    }

    if fuzzy.any() {
        let state = Rc::new(RefCell::new(FuzzyHasher::new(fuzzy)));
        sample.fuzzy = Some(Rc::clone(&state));
        upstream = Box::new(FuzzyHashStream::open(upstream, state));
    }

    sample.size = upstream.size();
    sample.copy_stream = Some(upstream);
    Ok(())
}

fn take_stream(
    handle: &RefCell<Option<Box<dyn ByteStream>>>,
) -> Result<Box<dyn ByteStream>, CollectorError> {
    match handle.borrow_mut().take() {
        Some(stream) => Ok(stream),
        None => Err(CollectorError::MissingStream),
    }
}

fn first_full_path(file_match: &FileMatch) -> String {
    match file_match.matching_names.first() {
        Some(name) => name.full_path.clone(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{IngestStatus, add_samples_for_match, configure_sample_streams};
    use crate::collector::{
        ContentSpec, SampleSpec,
        limits::{LimitStatus, Limits},
        matches::{FileMatch, MatchingAttribute, MatchingName, StandardInfo},
        samples::SampleRegistry,
    };
    use crate::streams::{memory::MemoryStream, read_to_end};
    use crate::structs::toml::ContentOptions;
    use common::files::{FuzzyHashes, Hashes};
    use common::windows::AttributeType;
    use std::{cell::RefCell, rc::Rc};

    pub(crate) fn test_match(frn: u64, names: &[&str], content: &[u8]) -> Rc<FileMatch> {
        let matching_names = names
            .iter()
            .map(|name| MatchingName {
                full_path: format!("C:\\files\\{name}"),
                name: name.to_string(),
                name_length: name.chars().count() as u16,
                parent_sequence: 0x1,
                parent_segment_high: 0x0,
                parent_segment_low: 0x20,
                times: Default::default(),
            })
            .collect();

        Rc::new(FileMatch {
            frn,
            volume_serial: 0xAABB,
            snapshot_id: None,
            standard_info: StandardInfo::default(),
            matching_names,
            matching_attributes: vec![MatchingAttribute {
                attr_type: AttributeType::Data,
                name: String::new(),
                instance_id: 2,
                data_size: content.len() as u64,
                data_stream: RefCell::new(Some(Box::new(MemoryStream::new(content.to_vec())))),
                raw_stream: RefCell::new(Some(Box::new(MemoryStream::new(content.to_vec())))),
                yara_rules: None,
            }],
            term: String::from("test rule"),
        })
    }

    fn test_spec() -> SampleSpec {
        SampleSpec {
            name: String::new(),
            content: ContentSpec::data(),
            per_sample_limits: Limits::default(),
            terms: vec![String::from("test rule")],
        }
    }

    #[test]
    fn test_add_samples_for_match() {
        let mut registry = SampleRegistry::new();
        let file_match = test_match(10, &["report.docx"], b"file content");

        let status = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &test_spec(),
            &file_match,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        assert_eq!(status, IngestStatus::Added);
        assert_eq!(registry.len(), 1);

        let (key, sample) = registry.iter().next().unwrap();
        assert_eq!(key.frn, 10);
        assert_eq!(key.instance_id, 2);
        assert_eq!(sample.sample_name, "0001000000000020_report.docx_data");
        assert_eq!(sample.size, 12);
        assert_eq!(sample.off_limits, false);
    }

    #[test]
    fn test_duplicate_match_already_present() {
        let mut registry = SampleRegistry::new();
        let first = test_match(10, &["report.docx"], b"file content");
        let second = test_match(10, &["report.docx"], b"file content");

        let _ = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &test_spec(),
            &first,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();
        let status = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &test_spec(),
            &second,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        assert_eq!(status, IngestStatus::AlreadyPresent);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_matching_name_wins() {
        let mut registry = SampleRegistry::new();
        let file_match = test_match(10, &["original.txt", "hardlink.txt"], b"linked");

        let _ = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &test_spec(),
            &file_match,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        let (_, sample) = registry.iter().next().unwrap();
        assert_eq!(sample.sample_name, "0001000000000020_hardlink.txt_data");
        // The first name's reservation stays behind
        assert_eq!(
            registry.is_name_used("0001000000000020_original.txt_data"),
            true
        );
    }

    #[test]
    fn test_name_collision_appends_index() {
        let mut registry = SampleRegistry::new();
        registry.reserve_name(String::from("0001000000000020_report.docx_data"));

        let file_match = test_match(11, &["report.docx"], b"other content");
        let _ = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &test_spec(),
            &file_match,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        let (_, sample) = registry.iter().next().unwrap();
        assert_eq!(sample.sample_name, "0001000000000020__report.docx_1_data");
    }

    #[test]
    fn test_spec_name_prefix() {
        let mut registry = SampleRegistry::new();
        let mut spec = test_spec();
        spec.name = String::from("hives");

        let file_match = test_match(12, &["ntuser.dat"], b"registry");
        let _ = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &spec,
            &file_match,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        let (_, sample) = registry.iter().next().unwrap();
        assert_eq!(sample.sample_name, "hives\\0001000000000020_ntuser.dat_data");
    }

    #[test]
    fn test_off_limits_sample_still_registered() {
        let mut registry = SampleRegistry::new();
        let file_match = test_match(13, &["big.bin"], b"0123456789x");

        let _ = add_samples_for_match(
            &mut registry,
            LimitStatus::GlobalMaxBytesPerSample,
            &test_spec(),
            &file_match,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        let (_, sample) = registry.iter().next().unwrap();
        assert_eq!(sample.off_limits, true);
        // Copy stream is still assembled for report-all hashing
        assert_eq!(sample.copy_stream.is_some(), true);
    }

    #[test]
    fn test_missing_stream_sample_still_registered() {
        let mut registry = SampleRegistry::new();
        let file_match = test_match(14, &["gone.bin"], b"");
        let _ = file_match.matching_attributes[0]
            .data_stream
            .borrow_mut()
            .take();

        let status = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &test_spec(),
            &file_match,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        assert_eq!(status, IngestStatus::Added);
        let (_, sample) = registry.iter().next().unwrap();
        assert_eq!(sample.copy_stream.is_none(), true);
    }

    #[test]
    fn test_strings_content_uses_global_fallback() {
        let mut registry = SampleRegistry::new();
        let mut spec = test_spec();
        spec.content = ContentSpec::from_options(Some(&String::from("strings")), 0, 0);

        let defaults = ContentOptions {
            min_chars: 4,
            max_chars: 16,
        };
        let file_match = test_match(15, &["blob.bin"], b"AB\0HELLO\0LONGSTRING");
        let _ = add_samples_for_match(
            &mut registry,
            LimitStatus::SampleWithinLimits,
            &spec,
            &file_match,
            0,
            &defaults,
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();

        let mut extracted = Vec::new();
        for (_, sample) in registry.iter_mut() {
            extracted = read_to_end(sample.copy_stream.as_mut().unwrap().as_mut()).unwrap();
        }
        assert_eq!(extracted, b"HELLO\nLONGSTRING\n");
    }

    #[test]
    fn test_pipeline_passthrough_with_hashes() {
        let mut sample_registry = SampleRegistry::new();
        let content = b"observed bytes are unchanged";
        let file_match = test_match(16, &["observed.bin"], content);

        let fuzzy = FuzzyHashes {
            ssdeep: true,
            tlsh: true,
        };
        let _ = add_samples_for_match(
            &mut sample_registry,
            LimitStatus::SampleWithinLimits,
            &test_spec(),
            &file_match,
            0,
            &ContentOptions::default(),
            &Hashes::default(),
            &fuzzy,
        )
        .unwrap();

        for (_, sample) in sample_registry.iter_mut() {
            assert_eq!(sample.size, content.len() as u64);
            let data = read_to_end(sample.copy_stream.as_mut().unwrap().as_mut()).unwrap();
            assert_eq!(data, content);
            assert_eq!(sample.hasher.is_some(), true);
            assert_eq!(sample.fuzzy.is_some(), true);
        }
    }

    #[test]
    #[should_panic(expected = "EmptySampleName")]
    fn test_configure_streams_empty_name() {
        use crate::collector::samples::Sample;

        let file_match = test_match(17, &["x.bin"], b"bytes");
        let mut sample = Sample {
            matches: vec![Rc::clone(&file_match)],
            attribute_index: 0,
            snapshot_id: String::new(),
            content: ContentSpec::data(),
            sample_name: String::new(),
            collection_date: 0,
            off_limits: false,
            size: 0,
            copy_stream: None,
            hasher: None,
            fuzzy: None,
            md5: String::new(),
            sha1: String::new(),
            sha256: String::new(),
            ssdeep: String::new(),
            tlsh: String::new(),
        };

        configure_sample_streams(
            &mut sample,
            &file_match.matching_attributes[0],
            &ContentOptions::default(),
            &Hashes::default(),
            &FuzzyHashes::default(),
        )
        .unwrap();
    }
}
