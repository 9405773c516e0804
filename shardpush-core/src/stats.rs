use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inventory totals gathered once at startup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_files: u64,
    pub total_bytes: u64,
    pub already_processed_files: u64,
    pub already_processed_bytes: u64,
    pub estimated_archives: u64,
}

/// Work confirmed uploaded during this run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub archives_uploaded: u64,
    pub files_uploaded: u64,
    pub bytes_uploaded: u64,
    pub archive_bytes_uploaded: u64,
}

pub fn estimated_archives(total_bytes: u64, ceiling_bytes: u64) -> u64 {
    if ceiling_bytes == 0 {
        return 0;
    }
    total_bytes.div_ceil(ceiling_bytes)
}

pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub fn mib_per_sec(bytes: u64, d: Duration) -> f64 {
    let secs = d.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 / (1024.0 * 1024.0) / secs
    } else {
        0.0
    }
}

pub fn gib(bytes: u64) -> f64 {
    bytes as f64 / crate::config::GIB as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_hours_minutes_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(3723)), "1h 02m 03s");
        assert_eq!(format_elapsed(Duration::from_millis(999)), "0h 00m 00s");
    }

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimated_archives(50, 25), 2);
        assert_eq!(estimated_archives(51, 25), 3);
        assert_eq!(estimated_archives(0, 25), 0);
    }
}
