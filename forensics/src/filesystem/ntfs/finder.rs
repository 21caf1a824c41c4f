use super::{
    attributes::{get_filename_attribute, read_attribute_value},
    sector_reader::SectorReader,
    setup::{NtfsParser, setup_ntfs_parser},
};
use crate::collector::matches::{
    FileMatch, MatchingAttribute, MatchingName, NameTimes, StandardInfo,
};
use crate::filesystem::error::FileSystemError;
use crate::streams::memory::MemoryStream;
use crate::structs::toml::{LocationOptions, SampleOptions};
use crate::utils::regex_options::{create_regex, regex_check};
#[cfg(feature = "yarax")]
use crate::utils::yara::{compile_rules, scan_bytes};
use log::{error, info, warn};
use ntfs::{Ntfs, NtfsAttributeType, NtfsFile};
use regex::Regex;
use std::{cell::RefCell, fs::File, io::BufReader, rc::Rc};

/// How deep the directory index recursion goes before giving up
const MAX_DEPTH: usize = 64;

/// One compiled finder rule. A file matches when both regexes accept it and,
/// when yara identifiers are listed, the attribute content matches one of them
pub(crate) struct CompiledTerm {
    pub(crate) description: String,
    path_regex: Regex,
    file_regex: Regex,
    yara: Option<Vec<String>>,
}

/// Enumerates NTFS locations and reports every file matching a term. Matches
/// are shared values, the registry keeps references to them after the callback
/// returns
pub struct FileFinder {
    terms: Vec<CompiledTerm>,
    #[cfg(feature = "yarax")]
    rules: Option<yara_x::Rules>,
}

impl FileFinder {
    /// Compile the terms of every configured sample spec
    pub fn new(samples: &[SampleOptions]) -> Result<Self, FileSystemError> {
        let mut terms = Vec::new();
        for sample in samples {
            for term in &sample.terms {
                let path_pattern = term.path_regex.clone().unwrap_or_default();
                let file_pattern = term.file_regex.clone().unwrap_or_default();

                let path_regex = match create_regex(&path_pattern) {
                    Ok(result) => result,
                    Err(err) => {
                        error!(
                            "[finder] Bad path regex for term {}: {err:?}",
                            term.description
                        );
                        return Err(FileSystemError::Regex);
                    }
                };
                let file_regex = match create_regex(&file_pattern) {
                    Ok(result) => result,
                    Err(err) => {
                        error!(
                            "[finder] Bad file regex for term {}: {err:?}",
                            term.description
                        );
                        return Err(FileSystemError::Regex);
                    }
                };

                terms.push(CompiledTerm {
                    description: term.description.clone(),
                    path_regex,
                    file_regex,
                    yara: term.yara.clone(),
                });
            }
        }

        Ok(FileFinder {
            terms,
            #[cfg(feature = "yarax")]
            rules: None,
        })
    }

    /// Compile yara rule files into the finder. Rule failures are reported to
    /// the caller, which treats them as non-fatal
    pub fn initialize_yara(&mut self, sources: &Option<Vec<String>>) -> Result<(), FileSystemError> {
        let rule_files = match sources {
            Some(files) if !files.is_empty() => files,
            _ => return Ok(()),
        };

        #[cfg(not(feature = "yarax"))]
        {
            warn!(
                "[finder] {} yara rule file(s) configured but yara support is not compiled in",
                rule_files.len()
            );
            Ok(())
        }
        #[cfg(feature = "yarax")]
        {
            use crate::filesystem::files::read_file;
            use crate::utils::strings::extract_utf8_string;

            let mut rule_sources = Vec::new();
            for file in rule_files {
                let data = read_file(file)?;
                rule_sources.push(extract_utf8_string(&data));
            }

            let compile_result = compile_rules(&rule_sources);
            match compile_result {
                Ok(rules) => {
                    self.rules = Some(rules);
                    Ok(())
                }
                Err(err) => {
                    error!("[finder] Failed to compile yara rules: {err:?}");
                    Err(FileSystemError::YaraRules)
                }
            }
        }
    }

    /// Walk every location and invoke `on_match` for each matching file
    pub fn find(
        &self,
        locations: &[LocationOptions],
        on_match: &mut dyn FnMut(Rc<FileMatch>),
    ) -> Result<(), FileSystemError> {
        for location in locations {
            let parser_result = setup_ntfs_parser(&location.path);
            let NtfsParser { ntfs, mut fs } = match parser_result {
                Ok(result) => result,
                Err(err) => {
                    error!(
                        "[finder] Could not open location {}: {err:?}",
                        location.path
                    );
                    continue;
                }
            };

            let root_result = ntfs.root_directory(&mut fs);
            let root_dir = match root_result {
                Ok(result) => result,
                Err(err) => {
                    error!("[finder] Failed to get NTFS root directory, error: {err:?}");
                    continue;
                }
            };

            let volume_serial = ntfs.serial_number();
            let drive_root = if location.path.len() == 1 {
                format!("{}:", location.path.to_uppercase())
            } else {
                String::new()
            };

            info!("[finder] Searching location {}", location.path);
            let mut tracker = vec![drive_root];
            let _ = self.walk_directory(
                root_dir,
                &ntfs,
                &mut fs,
                &mut tracker,
                volume_serial,
                location.snapshot_id.as_deref(),
                on_match,
            );
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_directory(
        &self,
        dir: NtfsFile<'_>,
        ntfs: &Ntfs,
        fs: &mut BufReader<SectorReader<File>>,
        tracker: &mut Vec<String>,
        volume_serial: u64,
        snapshot_id: Option<&str>,
        on_match: &mut dyn FnMut(Rc<FileMatch>),
    ) -> Result<(), FileSystemError> {
        let index_result = dir.directory_index(fs);
        let index = match index_result {
            Ok(result) => result,
            Err(err) => {
                error!("[finder] Failed to get NTFS index directory, error: {err:?}");
                return Err(FileSystemError::IndexDirectory);
            }
        };

        let mut iter = index.entries();
        while let Some(entry) = iter.next(fs) {
            let entry_index = match entry {
                Ok(result) => result,
                Err(err) => {
                    error!("[finder] Failed to get NTFS entry index, error: {err:?}");
                    continue;
                }
            };

            let filename = match entry_index.key() {
                Some(result) => get_filename_attribute(&result)?,
                None => continue,
            };

            let name = filename.name().to_string_lossy();
            // Skip root directory loopback or DOS type names
            if name == "." || name.contains('~') {
                continue;
            }

            let ntfs_file_result = entry_index.file_reference().to_file(ntfs, fs);
            let ntfs_file = match ntfs_file_result {
                Ok(result) => result,
                Err(err) => {
                    error!("[finder] Failed to get NTFS file, error: {err:?}");
                    continue;
                }
            };

            let full_path = format!("{}\\{}", tracker.join("\\"), name);

            if !ntfs_file.is_directory() {
                let term = self.terms.iter().find(|term| {
                    regex_check(&term.path_regex, &full_path) && regex_check(&term.file_regex, &name)
                });
                if let Some(term) = term {
                    if let Some(file_match) = self.build_match(
                        &ntfs_file,
                        &full_path,
                        term,
                        fs,
                        volume_serial,
                        snapshot_id,
                    ) {
                        on_match(file_match);
                    }
                }
            } else if tracker.len() < MAX_DEPTH {
                tracker.push(name);
                self.walk_directory(
                    ntfs_file,
                    ntfs,
                    fs,
                    tracker,
                    volume_serial,
                    snapshot_id,
                    on_match,
                )?;
                tracker.pop();
            }
        }

        Ok(())
    }

    /// Assemble a `FileMatch` from the file record: standard information
    /// times, every `$FILE_NAME` record and every `$DATA` attribute with its
    /// content buffered into streams
    fn build_match(
        &self,
        ntfs_file: &NtfsFile<'_>,
        full_path: &str,
        term: &CompiledTerm,
        fs: &mut BufReader<SectorReader<File>>,
        volume_serial: u64,
        snapshot_id: Option<&str>,
    ) -> Option<Rc<FileMatch>> {
        let info_result = ntfs_file.info();
        let standard_info = match info_result {
            Ok(info) => StandardInfo {
                created: info.creation_time().nt_timestamp(),
                modified: info.modification_time().nt_timestamp(),
                accessed: info.access_time().nt_timestamp(),
                changed: info.mft_record_modification_time().nt_timestamp(),
            },
            Err(err) => {
                warn!("[finder] No standard information for {full_path}: {err:?}");
                StandardInfo::default()
            }
        };

        let parent_dir = match full_path.rfind('\\') {
            Some(position) => &full_path[0..position],
            None => "",
        };

        let mut matching_names = Vec::new();
        let mut matching_attributes = Vec::new();

        let attr_iter = ntfs_file.attributes_raw();
        for attr_result in attr_iter {
            let attr = match attr_result {
                Ok(result) => result,
                Err(err) => {
                    warn!("[finder] Failed to read attribute of {full_path}: {err:?}");
                    continue;
                }
            };
            let attr_type = match attr.ty() {
                Ok(result) => result,
                Err(err) => {
                    warn!("[finder] Failed to get attribute type of {full_path}: {err:?}");
                    continue;
                }
            };

            if attr_type == NtfsAttributeType::FileName {
                let filename_result = attr.structured_value::<_, ntfs::structured_values::NtfsFileName>(fs);
                let filename = match filename_result {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("[finder] Failed to read FILENAME record of {full_path}: {err:?}");
                        continue;
                    }
                };

                let name = filename.name().to_string_lossy();
                let parent_ref = filename.parent_directory_reference();
                let parent_record = parent_ref.file_record_number();
                matching_names.push(MatchingName {
                    full_path: format!("{parent_dir}\\{name}"),
                    name_length: name.chars().count() as u16,
                    name,
                    parent_sequence: parent_ref.sequence_number(),
                    parent_segment_high: ((parent_record >> 32) & 0xffff) as u16,
                    parent_segment_low: (parent_record & 0xffff_ffff) as u32,
                    times: NameTimes {
                        created: filename.creation_time().nt_timestamp(),
                        modified: filename.modification_time().nt_timestamp(),
                        accessed: filename.access_time().nt_timestamp(),
                        changed: filename.mft_record_modification_time().nt_timestamp(),
                    },
                });
            } else if attr_type == NtfsAttributeType::Data {
                let attr_name = match attr.name() {
                    Ok(result) => result.to_string_lossy(),
                    Err(err) => {
                        warn!("[finder] Failed to get attribute name of {full_path}: {err:?}");
                        continue;
                    }
                };

                let value_result = attr.value(fs);
                let mut value = match value_result {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("[finder] Failed to get attribute data of {full_path}: {err:?}");
                        continue;
                    }
                };

                let data_result = read_attribute_value(&mut value, fs);
                let data = match data_result {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("[finder] Could not read {full_path}: {err:?}");
                        continue;
                    }
                };

                let yara_rules = match self.match_yara(&data, term) {
                    Ok(result) => result,
                    Err(_) => continue,
                };

                matching_attributes.push(MatchingAttribute {
                    attr_type: common::windows::AttributeType::from_code(attr_type as u32),
                    name: attr_name,
                    instance_id: attr.instance(),
                    data_size: data.len() as u64,
                    raw_stream: RefCell::new(Some(Box::new(MemoryStream::new(data.clone())))),
                    data_stream: RefCell::new(Some(Box::new(MemoryStream::new(data)))),
                    yara_rules,
                });
            }
        }

        Some(Rc::new(FileMatch {
            frn: ntfs_file.file_record_number(),
            volume_serial,
            snapshot_id: snapshot_id.map(String::from),
            standard_info,
            matching_names,
            matching_attributes,
            term: term.description.clone(),
        }))
    }

    /// Evaluate a term's yara condition against attribute content. `Ok(None)`
    /// means the term has no yara condition, `Err` means the attribute is
    /// rejected
    #[allow(unused_variables)]
    fn match_yara(&self, data: &[u8], term: &CompiledTerm) -> Result<Option<Vec<String>>, ()> {
        let wanted = match &term.yara {
            Some(identifiers) => identifiers,
            None => return Ok(None),
        };

        #[cfg(not(feature = "yarax"))]
        {
            warn!(
                "[finder] Term {} needs yara but yara support is not compiled in",
                term.description
            );
            Err(())
        }
        #[cfg(feature = "yarax")]
        {
            let rules = match &self.rules {
                Some(result) => result,
                None => {
                    warn!(
                        "[finder] Term {} needs yara but no rules were initialized",
                        term.description
                    );
                    return Err(());
                }
            };

            let hits = match scan_bytes(data, rules) {
                Ok(result) => result,
                Err(err) => {
                    error!("[finder] Yara scan failed: {err:?}");
                    return Err(());
                }
            };

            let matched: Vec<String> = if wanted.is_empty() {
                hits
            } else {
                hits.into_iter()
                    .filter(|hit| wanted.contains(hit))
                    .collect()
            };

            if matched.is_empty() {
                return Err(());
            }
            Ok(Some(matched))
        }
    }
}
