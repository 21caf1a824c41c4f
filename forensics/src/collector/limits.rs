use crate::structs::toml::LimitsOptions;

/// Resource budget with accumulators and sticky reached flags. `None` maxima
/// mean unlimited. One instance tracks the whole run, one instance tracks each
/// sample spec
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    pub max_sample_count: Option<u64>,
    pub max_bytes_per_sample: Option<u64>,
    pub max_bytes_total: Option<u64>,
    pub ignore_limits: bool,
    pub accumulated_sample_count: u64,
    pub accumulated_bytes_total: u64,
    pub max_sample_count_reached: bool,
    pub max_bytes_per_sample_reached: bool,
    pub max_bytes_total_reached: bool,
}

impl Limits {
    pub fn from_options(options: &Option<LimitsOptions>) -> Self {
        match options {
            Some(values) => Limits {
                max_sample_count: values.max_sample_count,
                max_bytes_per_sample: values.max_bytes_per_sample,
                max_bytes_total: values.max_bytes_total,
                ignore_limits: values.ignore_limits,
                ..Default::default()
            },
            None => Limits::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStatus {
    NoLimits,
    SampleWithinLimits,
    GlobalSampleCountReached,
    GlobalMaxBytesPerSample,
    GlobalMaxBytesTotal,
    LocalSampleCountReached,
    LocalMaxBytesPerSample,
    LocalMaxBytesTotal,
    FailedToComputeLimits,
}

impl LimitStatus {
    /// Whether a sample with this status is retained for reporting only
    pub fn off_limits(&self) -> bool {
        !matches!(self, LimitStatus::NoLimits | LimitStatus::SampleWithinLimits)
    }
}

/// Evaluate a candidate sample of `data_size` bytes against the run and spec
/// budgets. First trigger wins, counts are checked before byte budgets and
/// global budgets before local ones
pub fn sample_limit_status(global: &Limits, local: &Limits, data_size: u64) -> LimitStatus {
    if global.ignore_limits {
        return LimitStatus::NoLimits;
    }

    // Sample count reached?
    if let Some(max) = global.max_sample_count {
        if global.accumulated_sample_count >= max {
            return LimitStatus::GlobalSampleCountReached;
        }
    }

    if let Some(max) = local.max_sample_count {
        if local.accumulated_sample_count >= max {
            return LimitStatus::LocalSampleCountReached;
        }
    }

    // Global byte budgets
    if let Some(max) = global.max_bytes_per_sample {
        if data_size > max {
            return LimitStatus::GlobalMaxBytesPerSample;
        }
    }

    if let Some(max) = global.max_bytes_total {
        if data_size + global.accumulated_bytes_total > max {
            return LimitStatus::GlobalMaxBytesTotal;
        }
    }

    // Local byte budgets
    if let Some(max) = local.max_bytes_per_sample {
        if data_size > max {
            return LimitStatus::LocalMaxBytesPerSample;
        }
    }

    if let Some(max) = local.max_bytes_total {
        if data_size + local.accumulated_bytes_total > max {
            return LimitStatus::LocalMaxBytesTotal;
        }
    }

    LimitStatus::SampleWithinLimits
}

#[cfg(test)]
mod tests {
    use super::{LimitStatus, Limits, sample_limit_status};

    #[test]
    fn test_ignore_limits() {
        let global = Limits {
            ignore_limits: true,
            max_sample_count: Some(0),
            ..Default::default()
        };
        let local = Limits::default();

        let status = sample_limit_status(&global, &local, u64::MAX);
        assert_eq!(status, LimitStatus::NoLimits);
        assert_eq!(status.off_limits(), false);
    }

    #[test]
    fn test_all_unlimited_within_limits() {
        let global = Limits::default();
        let local = Limits::default();

        let status = sample_limit_status(&global, &local, u64::MAX);
        assert_eq!(status, LimitStatus::SampleWithinLimits);
        assert_eq!(status.off_limits(), false);
    }

    #[test]
    fn test_count_checked_before_bytes() {
        let global = Limits {
            max_sample_count: Some(1),
            max_bytes_per_sample: Some(10),
            accumulated_sample_count: 1,
            ..Default::default()
        };
        let local = Limits::default();

        // Both count and per-sample budget trigger, count wins
        let status = sample_limit_status(&global, &local, 11);
        assert_eq!(status, LimitStatus::GlobalSampleCountReached);
    }

    #[test]
    fn test_global_checked_before_local() {
        let global = Limits {
            max_bytes_per_sample: Some(10),
            ..Default::default()
        };
        let local = Limits {
            max_sample_count: Some(5),
            accumulated_sample_count: 5,
            ..Default::default()
        };

        let status = sample_limit_status(&global, &local, 11);
        assert_eq!(status, LimitStatus::LocalSampleCountReached);
    }

    #[test]
    fn test_bytes_per_sample() {
        let global = Limits {
            max_bytes_per_sample: Some(10),
            ..Default::default()
        };
        let local = Limits::default();

        assert_eq!(
            sample_limit_status(&global, &local, 10),
            LimitStatus::SampleWithinLimits
        );
        assert_eq!(
            sample_limit_status(&global, &local, 11),
            LimitStatus::GlobalMaxBytesPerSample
        );
    }

    #[test]
    fn test_bytes_total_includes_accumulated() {
        let global = Limits::default();
        let local = Limits {
            max_bytes_total: Some(100),
            accumulated_bytes_total: 95,
            ..Default::default()
        };

        assert_eq!(
            sample_limit_status(&global, &local, 5),
            LimitStatus::SampleWithinLimits
        );
        assert_eq!(
            sample_limit_status(&global, &local, 6),
            LimitStatus::LocalMaxBytesTotal
        );
    }

    #[test]
    fn test_off_limits_statuses() {
        assert_eq!(LimitStatus::GlobalMaxBytesTotal.off_limits(), true);
        assert_eq!(LimitStatus::LocalSampleCountReached.off_limits(), true);
        assert_eq!(LimitStatus::FailedToComputeLimits.off_limits(), true);
        assert_eq!(LimitStatus::SampleWithinLimits.off_limits(), false);
    }
}
