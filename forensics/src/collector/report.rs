use super::{error::CollectorError, samples::Sample};
use crate::streams::{copy_stream, devnull::DevNullStream};
use common::files::Hashes;
use csv::Writer;
use log::error;
use std::io::Write;

/// Column order of the metadata report. One row is written per
/// (sample, matching name) pair
pub(crate) const CSV_HEADER: [&str; 28] = [
    "ComputerName",
    "VolumeID",
    "ParentFRN",
    "FRN",
    "FullName",
    "SampleName",
    "SizeInBytes",
    "MD5",
    "SHA1",
    "FindMatch",
    "ContentType",
    "SampleCollectionDate",
    "CreationDate",
    "LastModificationDate",
    "LastAccessDate",
    "LastAttrChangeDate",
    "FileNameCreationDate",
    "FileNameLastModificationDate",
    "FileNameLastAccessDate",
    "FileNameLastAttrModificationDate",
    "AttributeType",
    "AttributeName",
    "AttributeInstanceID",
    "SnapshotID",
    "SHA256",
    "SSDeep",
    "TLSH",
    "YaraRules",
];

/// Emit the sample's metadata rows, one per matching name of every match.
/// Off-limits samples report an empty sample name
pub(crate) fn write_sample_rows<W: Write>(
    writer: &mut Writer<W>,
    sample: &Sample,
    computer_name: &str,
) -> Result<(), CollectorError> {
    for file_match in &sample.matches {
        let attr = &file_match.matching_attributes[sample.attribute_index];

        for name in &file_match.matching_names {
            let sample_name = if sample.off_limits {
                String::new()
            } else {
                sample.sample_name.clone()
            };
            let yara = match &attr.yara_rules {
                Some(rules) => rules.join("; "),
                None => String::new(),
            };

            let row = [
                computer_name.to_string(),
                file_match.volume_serial.to_string(),
                name.parent_reference().to_string(),
                file_match.frn.to_string(),
                name.full_path.clone(),
                sample_name,
                sample.size.to_string(),
                sample.md5.clone(),
                sample.sha1.clone(),
                file_match.term.clone(),
                sample.content.report_tag().to_string(),
                sample.collection_date.to_string(),
                file_match.standard_info.created.to_string(),
                file_match.standard_info.modified.to_string(),
                file_match.standard_info.accessed.to_string(),
                file_match.standard_info.changed.to_string(),
                name.times.created.to_string(),
                name.times.modified.to_string(),
                name.times.accessed.to_string(),
                name.times.changed.to_string(),
                attr.attr_type.as_ntfs_flag().to_string(),
                attr.name.clone(),
                attr.instance_id.to_string(),
                sample.snapshot_id.clone(),
                sample.sha256.clone(),
                sample.ssdeep.clone(),
                sample.tlsh.clone(),
                yara,
            ];

            let write_result = writer.write_record(&row);
            if let Err(err) = write_result {
                error!(
                    "[collector] Failed to write metadata row for {}: {err:?}",
                    name.full_path
                );
                return Err(CollectorError::CsvRow);
            }
        }
    }

    Ok(())
}

/// Extract final hash values out of the sample's observers. Off-limits
/// samples are only drained when report-all is configured, their bytes were
/// never read by a sink
pub(crate) fn finalize_hashes(sample: &mut Sample, report_all: bool, hashes: &Hashes) {
    if sample.hasher.is_none() {
        return;
    }

    if sample.off_limits && report_all && hashes.any() {
        if let Some(stream) = sample.copy_stream.as_mut() {
            let mut nullstream = DevNullStream::new();
            let drain_result = copy_stream(stream.as_mut(), &mut nullstream);
            if let Err(err) = drain_result {
                error!(
                    "[collector] Failed while computing hash of {}: {err:?}",
                    sample.sample_name
                );
            }
            let _ = stream.close();
        }
    }

    if let Some(hasher) = &sample.hasher {
        let values = hasher.borrow_mut().finalize();
        sample.md5 = values.md5;
        sample.sha1 = values.sha1;
        sample.sha256 = values.sha256;
    }

    if let Some(fuzzy) = &sample.fuzzy {
        let values = fuzzy.borrow_mut().finalize();
        sample.ssdeep = values.ssdeep;
        sample.tlsh = values.tlsh;
    }
}
