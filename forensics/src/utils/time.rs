use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Return time now in seconds or 0
pub(crate) fn time_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::new(0, 0))
        .as_secs()
}

/// Convert unixepoch seconds to a Windows FILETIME value
pub(crate) fn unixepoch_to_filetime(epoch: u64) -> u64 {
    let windows_nano = 10000000;
    let seconds_to_unix = 11644473600;

    (epoch + seconds_to_unix) * windows_nano
}

/// Return time now as a Windows FILETIME value
pub(crate) fn filetime_now() -> u64 {
    unixepoch_to_filetime(time_now())
}

/// Convert Windows filetime values to unixepoch
pub(crate) fn filetime_to_unixepoch(filetime: &u64) -> i64 {
    let windows_nano = 10000000;
    let seconds_to_unix: i64 = 11644473600;

    // We should not overflow because of the division.
    (filetime / windows_nano) as i64 - seconds_to_unix
}

#[cfg(test)]
mod tests {
    use super::{filetime_now, filetime_to_unixepoch, time_now, unixepoch_to_filetime};

    #[test]
    fn test_time_now() {
        let seconds_now = time_now();
        assert!(seconds_now > 100)
    }

    #[test]
    fn test_unixepoch_to_filetime() {
        let test_data = 1580003041;
        assert_eq!(unixepoch_to_filetime(test_data), 132244766410000000)
    }

    #[test]
    fn test_filetime_to_unixepoch() {
        let test_data = 132244766418940254;
        assert_eq!(filetime_to_unixepoch(&test_data), 1580003041)
    }

    #[test]
    fn test_filetime_now() {
        // Jan 1 2024 as FILETIME
        let recent = 133485408000000000;
        assert!(filetime_now() > recent)
    }
}
