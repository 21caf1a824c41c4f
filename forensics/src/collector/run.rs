use super::{
    ContentSpec, SampleSpec,
    error::CollectorError,
    ingest::{IngestStatus, add_samples_for_match},
    limits::{LimitStatus, Limits, sample_limit_status},
    matches::FileMatch,
    samples::SampleRegistry,
    sink::OutputSink,
};
use crate::filesystem::ntfs::finder::FileFinder;
use crate::structs::toml::{ContentOptions, GetThisToml, HashOptions};
use crate::utils::{logging::LogBuffer, time::filetime_now};
use common::files::{FuzzyHashes, Hashes};
use log::{error, info, warn};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

/// State of one collection run: the registry, the budgets and the runtime
/// form of every configured sample spec
pub struct CollectionSession {
    pub registry: SampleRegistry,
    pub global_limits: Limits,
    pub specs: Vec<SampleSpec>,
    pub computer_name: String,
    /// Collection timestamp as Windows FILETIME, captured at session start
    pub collection_date: u64,
    content_defaults: ContentOptions,
    hashes: Hashes,
    fuzzy: FuzzyHashes,
    report_all: bool,
}

impl CollectionSession {
    pub fn new(config: &GetThisToml) -> Self {
        let hash_options = config.hashes.unwrap_or_default();
        let specs = config
            .samples
            .iter()
            .map(|sample| SampleSpec {
                name: sample.name.clone().unwrap_or_default(),
                content: ContentSpec::from_options(
                    sample.content.as_ref(),
                    sample.min_chars.unwrap_or(0),
                    sample.max_chars.unwrap_or(0),
                ),
                per_sample_limits: Limits::from_options(&sample.limits),
                terms: sample
                    .terms
                    .iter()
                    .map(|term| term.description.clone())
                    .collect(),
            })
            .collect();

        CollectionSession {
            registry: SampleRegistry::new(),
            global_limits: Limits::from_options(&config.limits),
            specs,
            computer_name: computer_name(),
            collection_date: filetime_now(),
            content_defaults: config.content.unwrap_or_default(),
            hashes: crypto_hashes(&hash_options),
            fuzzy: fuzzy_hashes(&hash_options),
            report_all: config.report_all.unwrap_or(false),
        }
    }

    pub fn hashes(&self) -> &Hashes {
        &self.hashes
    }

    pub fn report_all(&self) -> bool {
        self.report_all
    }

    /// Callback invoked for every match the finder reports. Locates the
    /// governing sample spec, evaluates the budgets per attribute, ingests
    /// the match and updates accumulators or sticky flags
    pub fn handle_match(&mut self, file_match: &Rc<FileMatch>) {
        let display_name = match file_match.matching_names.first() {
            Some(name) => name.full_path.clone(),
            None => String::new(),
        };

        if file_match.matching_attributes.is_empty() {
            warn!(
                "[collector] {display_name} matched {} but no data related attribute was associated",
                file_match.term
            );
            return;
        }

        let spec_index = self
            .specs
            .iter()
            .position(|spec| spec.terms.contains(&file_match.term));
        let spec_index = match spec_index {
            Some(result) => result,
            None => {
                error!(
                    "[collector] Could not find sample spec for match {}",
                    file_match.term
                );
                return;
            }
        };

        for attr in &file_match.matching_attributes {
            let data_size = attr.data_size;
            let status = sample_limit_status(
                &self.global_limits,
                &self.specs[spec_index].per_sample_limits,
                data_size,
            );

            let ingest_result = add_samples_for_match(
                &mut self.registry,
                status,
                &self.specs[spec_index],
                file_match,
                self.collection_date,
                &self.content_defaults,
                &self.hashes,
                &self.fuzzy,
            );
            let ingest_status = match ingest_result {
                Ok(result) => result,
                Err(err) => {
                    error!("[collector] Failed to add {display_name}: {err:?}");
                    continue;
                }
            };

            let spec = &mut self.specs[spec_index];
            match status {
                LimitStatus::NoLimits | LimitStatus::SampleWithinLimits => {
                    if ingest_status == IngestStatus::AlreadyPresent {
                        info!("[collector] {display_name} is already collected");
                    } else {
                        info!("[collector] {display_name} matched ({data_size} bytes)");

                        spec.per_sample_limits.accumulated_bytes_total += data_size;
                        spec.per_sample_limits.accumulated_sample_count += 1;
                        self.global_limits.accumulated_bytes_total += data_size;
                        self.global_limits.accumulated_sample_count += 1;
                    }
                }
                LimitStatus::GlobalSampleCountReached => {
                    info!(
                        "[collector] {display_name}: global sample count reached ({:?})",
                        self.global_limits.max_sample_count
                    );
                    self.global_limits.max_sample_count_reached = true;
                }
                LimitStatus::GlobalMaxBytesPerSample => {
                    info!(
                        "[collector] {display_name}: exceeds global per sample size limit ({:?})",
                        self.global_limits.max_bytes_per_sample
                    );
                    self.global_limits.max_bytes_per_sample_reached = true;
                }
                LimitStatus::GlobalMaxBytesTotal => {
                    info!(
                        "[collector] {display_name}: global total sample size limit reached ({:?})",
                        self.global_limits.max_bytes_total
                    );
                    self.global_limits.max_bytes_total_reached = true;
                }
                LimitStatus::LocalSampleCountReached => {
                    info!(
                        "[collector] {display_name}: sample count reached ({:?})",
                        spec.per_sample_limits.max_sample_count
                    );
                    spec.per_sample_limits.max_sample_count_reached = true;
                }
                LimitStatus::LocalMaxBytesPerSample => {
                    info!(
                        "[collector] {display_name}: exceeds per sample size limit ({:?})",
                        spec.per_sample_limits.max_bytes_per_sample
                    );
                    spec.per_sample_limits.max_bytes_per_sample_reached = true;
                }
                LimitStatus::LocalMaxBytesTotal => {
                    info!(
                        "[collector] {display_name}: total sample size limit reached ({:?})",
                        spec.per_sample_limits.max_bytes_total
                    );
                    spec.per_sample_limits.max_bytes_total_reached = true;
                }
                LimitStatus::FailedToComputeLimits => {}
            }
        }
    }

    /// Run the finder over the configured locations, feeding every match
    /// through `handle_match`
    pub fn find_matching_samples(&mut self, config: &GetThisToml) -> Result<(), CollectorError> {
        let finder_result = FileFinder::new(&config.samples);
        let mut finder = match finder_result {
            Ok(result) => result,
            Err(err) => {
                error!("[collector] Failed to compile finder terms: {err:?}");
                return Err(CollectorError::Finder);
            }
        };

        let yara_result = finder.initialize_yara(&config.yara);
        if let Err(err) = yara_result {
            error!("[collector] Failed to initialize yara scan: {err:?}");
        }

        let find_result = finder.find(&config.locations, &mut |file_match| {
            self.handle_match(&file_match);
        });
        if let Err(err) = find_result {
            error!("[collector] Failed while parsing locations: {err:?}");
        }

        Ok(())
    }

    /// Write every registered sample to the sink in registry order. Failures
    /// are logged and the loop continues with the next sample
    pub fn collect_samples(&mut self, sink: &mut OutputSink) {
        info!("[collector] Writing matching samples to output");

        for (_, sample) in self.registry.iter_mut() {
            let write_result = sink.write_sample(sample);
            if let Err(err) = write_result {
                error!(
                    "[collector] Failed to write sample {}: {err:?}",
                    sample.sample_name
                );
                continue;
            }
        }
    }
}

/// Execute a full collection run against a parsed configuration
pub fn run_collection(
    config: &GetThisToml,
    log_capture: Option<LogBuffer>,
) -> Result<(), CollectorError> {
    if config.flush_registry.unwrap_or(false) {
        flush_registry_hives();
    }

    let mut session = CollectionSession::new(config);
    let mut sink = OutputSink::init(
        &config.output,
        &session.computer_name,
        session.report_all(),
        session.hashes(),
        log_capture,
    )?;

    let run_result = catch_unwind(AssertUnwindSafe(|| -> Result<(), CollectorError> {
        session.find_matching_samples(config)?;
        session.collect_samples(&mut sink);
        sink.finalize()?;
        Ok(())
    }));

    match run_result {
        Ok(result) => result,
        Err(_) => {
            error!("[collector] Collection failed unexpectedly, terminating output");
            Err(CollectorError::Aborted)
        }
    }
}

/// Name reported in the first column of every metadata row
fn computer_name() -> String {
    let name_result = std::env::var("COMPUTERNAME").or_else(|_| std::env::var("HOSTNAME"));
    match name_result {
        Ok(result) => result,
        Err(_) => String::from("[unknown]"),
    }
}

fn crypto_hashes(options: &HashOptions) -> Hashes {
    Hashes {
        md5: options.md5,
        sha1: options.sha1,
        sha256: options.sha256,
    }
}

fn fuzzy_hashes(options: &HashOptions) -> FuzzyHashes {
    FuzzyHashes {
        ssdeep: options.ssdeep,
        tlsh: options.tlsh,
    }
}

/// Ask the OS to flush registry hives so collected hive files are current.
/// Always best-effort, a failure never stops the run
fn flush_registry_hives() {
    if cfg!(target_os = "windows") {
        // Hives are flushed lazily by the OS. Without a handle-level flush
        // API the collected copy may trail the in-memory state slightly
        warn!("[collector] Registry hive flush requested, relying on OS lazy flusher");
    } else {
        warn!("[collector] Registry hive flush requested but target has no registry");
    }
}
